//! Request extractors. Every rejection is an [`ApiError`], so malformed
//! input answers with the JSON envelope and a 400 rather than axum's plain
//! text 422.

use super::error::ApiError;
use super::AppState;
use crate::model::{User, UserId};
use async_trait::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::{HeaderName, AUTHORIZATION};
use axum::http::request::Parts;
use axum::Json;
use resource_actor::ActorClient;
use serde::de::DeserializeOwned;

/// Forwarded by the identity proxy in front of the service.
pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// The authenticated caller, resolved against the user store.
#[derive(Debug, Clone)]
pub struct Session(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(&USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.parse::<UserId>().ok())
            .ok_or_else(ApiError::unauthorized)?;
        let user = state
            .users
            .get(user_id)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?
            .ok_or_else(ApiError::unauthorized)?;
        Ok(Session(user))
    }
}

/// Proof that the caller holds the cron secret.
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

#[async_trait]
impl FromRequestParts<AppState> for CronAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(secret) = state.cron_secret.as_deref() else {
            return Err(ApiError::unauthorized());
        };
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        match presented {
            Some(token) if token == secret => Ok(CronAuth),
            _ => Err(ApiError::unauthorized()),
        }
    }
}

/// `Json` with envelope rejections.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// `Query` with envelope rejections.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}
