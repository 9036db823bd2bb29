use crate::model::{UserId, VendorId};
use serde::{Deserialize, Serialize};

/// A registered user: customer, vendor staff or platform admin.
///
/// See [`impl ActorEntity for User`](#impl-ActorEntity-for-User) for the
/// creation and update payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// What a user may see and decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "vendorId")]
pub enum Role {
    Customer,
    /// Staff of the given vendor.
    Vendor(VendorId),
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn vendor_id(&self) -> Option<VendorId> {
        match self {
            Role::Vendor(vendor_id) => Some(*vendor_id),
            _ => None,
        }
    }
}

/// Payload for creating a new user.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserCreate {
    pub fn customer(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: Role::Customer,
        }
    }
}

/// Payload for updating an existing user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Case-insensitive, whitespace-trimmed email comparison.
pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_compare_trimmed_and_case_insensitive() {
        assert!(same_email(" Ana@Example.com", "ana@example.com "));
        assert!(!same_email("ana@example.com", "ana@example.org"));
    }
}
