//! Pure data structures (DTOs) stored by the resource actors.

pub mod cart;
pub mod ids;
pub mod number;
pub mod order;
pub mod product;
pub mod refund;
pub mod report;
pub mod status;
pub mod user;
pub mod vendor;

pub use cart::*;
pub use ids::*;
pub use number::*;
pub use order::*;
pub use product::*;
pub use refund::*;
pub use report::*;
pub use status::*;
pub use user::*;
pub use vendor::*;
