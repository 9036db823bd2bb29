use axum::Json;
use serde::Serialize;

/// Success body: `{ "success": true, ...payload }`.
///
/// The payload must serialize as a JSON object.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(payload: T) -> Json<Self> {
        Json(Self {
            success: true,
            payload,
        })
    }
}
