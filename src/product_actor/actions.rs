//! Stock actions for the Product actor.
//!
//! Stock is only ever changed through these actions so that reservations made
//! at checkout and releases made on cancellation are serialized per product.

/// Custom actions for Product entities.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
    /// Takes units out of stock for an order.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` if the quantity exceeds available stock.
    ReserveStock(u32),
    /// Returns previously reserved units to stock.
    ReleaseStock(u32),
}

/// Results from ProductActions; variants match 1:1 with ProductAction.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    CheckStock(u32),
    /// Stock left after the reservation.
    ReserveStock(u32),
    /// Stock after the release.
    ReleaseStock(u32),
}
