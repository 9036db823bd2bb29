//! [`ActorEntity`] implementation for [`Product`], including the stock
//! actions.

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::model::{Product, ProductCreate, ProductFilter, ProductId, ProductUpdate};
use async_trait::async_trait;
use resource_actor::ActorEntity;
use rust_decimal::Decimal;

fn validate_price(price: Decimal) -> Result<Decimal, ProductError> {
    if price.is_sign_negative() {
        return Err(ProductError::ValidationError(format!(
            "price must not be negative: {price}"
        )));
    }
    Ok(price)
}

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Filter = ProductFilter;
    type Context = ();
    type Error = ProductError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(ProductError::ValidationError("name is required".into()));
        }
        Ok(Self {
            id,
            vendor_id: params.vendor_id,
            name: params.name,
            price: validate_price(params.price)?,
            stock: params.stock,
            low_stock_threshold: params.low_stock_threshold,
        })
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        filter.vendor_id.map_or(true, |vendor| self.vendor_id == vendor)
    }

    /// # Fields Updated
    /// - `name`
    /// - `price`: applies to future orders only
    /// - `low_stock_threshold`
    async fn on_update(&mut self, update: ProductUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(price) = update.price {
            self.price = validate_price(price)?;
        }
        if let Some(threshold) = update.low_stock_threshold {
            self.low_stock_threshold = Some(threshold);
        }
        Ok(())
    }

    /// # Actions
    /// - `CheckStock`: returns the current level
    /// - `ReserveStock`: decrements stock if enough is available
    /// - `ReleaseStock`: increments stock
    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &(),
    ) -> Result<ProductActionResult, Self::Error> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::ReserveStock(0) | ProductAction::ReleaseStock(0) => {
                Err(ProductError::InvalidQuantity(0))
            }
            ProductAction::ReserveStock(quantity) => {
                if quantity > self.stock {
                    return Err(ProductError::InsufficientStock {
                        requested: quantity,
                        available: self.stock,
                    });
                }
                self.stock -= quantity;
                Ok(ProductActionResult::ReserveStock(self.stock))
            }
            ProductAction::ReleaseStock(quantity) => {
                self.stock = self.stock.saturating_add(quantity);
                Ok(ProductActionResult::ReleaseStock(self.stock))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VendorId;

    fn widget(stock: u32) -> Product {
        Product::from_create_params(
            ProductId(1),
            ProductCreate {
                vendor_id: VendorId(1),
                name: "Widget".into(),
                price: Decimal::new(1999, 2),
                stock,
                low_stock_threshold: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reserve_fails_without_touching_stock_when_short() {
        let mut product = widget(3);
        let err = product
            .handle_action(ProductAction::ReserveStock(4), &())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProductError::InsufficientStock {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(product.stock, 3);
    }

    #[tokio::test]
    async fn reserve_then_release_round_trips_stock() {
        let mut product = widget(10);
        assert_eq!(
            product
                .handle_action(ProductAction::ReserveStock(4), &())
                .await
                .unwrap(),
            ProductActionResult::ReserveStock(6)
        );
        assert_eq!(
            product
                .handle_action(ProductAction::ReleaseStock(4), &())
                .await
                .unwrap(),
            ProductActionResult::ReleaseStock(10)
        );
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = Product::from_create_params(
            ProductId(2),
            ProductCreate {
                vendor_id: VendorId(1),
                name: "Broken".into(),
                price: Decimal::new(-1, 0),
                stock: 1,
                low_stock_threshold: None,
            },
        );
        assert!(matches!(result, Err(ProductError::ValidationError(_))));
    }
}
