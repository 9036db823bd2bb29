//! Type-safe identifiers for the numerically keyed stores.
//!
//! Each id wraps the counter value handed out by its store and displays with
//! a resource prefix (`user_3`, `product_12`) in logs and store errors. On the
//! wire they are plain numbers.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }

        /// Accepts both the bare number and the prefixed form.
        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let digits = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                digits.parse().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a registered user (customer, vendor staff or admin).
    UserId,
    "user"
);
numeric_id!(
    /// Identifier of a vendor (tenant).
    VendorId,
    "vendor"
);
numeric_id!(ProductId, "product");
numeric_id!(CartId, "cart");
