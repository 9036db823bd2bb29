//! Demo catalog for local runs (`MARKETPLACE_SEED_DEMO=true`).
//!
//! Loads one vendor with staff, an admin, a customer with a paid order
//! `LM-2401-AB12` in processing, a paid guest order and an idle cart, so
//! every endpoint and job has something to act on.

use super::MarketplaceSystem;
use crate::model::{
    CartCreate, CartLine, CartOwner, Checkout, OrderLine, OrderNumber, OrderOwner, OrderStatus,
    ProductCreate, ProductId, Role, UserCreate, UserId, VendorCreate, VendorId,
};
use anyhow::Context;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::info;

pub const DEMO_ORDER_NUMBER: &str = "LM-2401-AB12";

/// Ids of the seeded records.
#[derive(Debug, Clone)]
pub struct DemoData {
    pub admin: UserId,
    pub vendor: VendorId,
    pub vendor_staff: UserId,
    pub customer: UserId,
    pub customer_email: String,
    pub products: Vec<ProductId>,
    pub order: OrderNumber,
    pub guest_email: String,
    pub guest_order: OrderNumber,
}

pub async fn seed_demo(system: &MarketplaceSystem) -> anyhow::Result<DemoData> {
    let vendor = system
        .vendors
        .create_vendor(VendorCreate {
            name: "Lumen Goods".into(),
            contact_email: "orders@lumen.example".into(),
        })
        .await?;
    let admin = system
        .users
        .create_user(UserCreate {
            name: "Platform Admin".into(),
            email: "admin@marketplace.example".into(),
            role: Role::Admin,
        })
        .await?;
    let vendor_staff = system
        .users
        .create_user(UserCreate {
            name: "Vera Lumen".into(),
            email: "vera@lumen.example".into(),
            role: Role::Vendor(vendor),
        })
        .await?;
    let customer_email = "ana@example.com".to_string();
    let customer = system
        .users
        .create_user(UserCreate::customer("Ana Ruiz", customer_email.clone()))
        .await?;

    let mut products = Vec::new();
    for (name, cents, stock, threshold) in [
        ("Desk Lamp", 4950, 20, None),
        ("LED Bulb", 499, 3, None),
        ("Lamp Shade", 1500, 8, Some(10)),
    ] {
        let id = system
            .products
            .create_product(ProductCreate {
                vendor_id: vendor,
                name: name.into(),
                price: Decimal::new(cents, 2),
                stock,
                low_stock_threshold: threshold,
            })
            .await?;
        products.push(id);
    }

    let number = OrderNumber::parse(DEMO_ORDER_NUMBER).context("demo order number")?;
    let placed_at = Utc
        .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
        .single()
        .context("demo order date")?;
    let order = system
        .manager
        .place_order(Checkout {
            owner: OrderOwner::Registered { user_id: customer },
            vendor_id: vendor,
            lines: vec![
                OrderLine {
                    product_id: products[0],
                    quantity: 2,
                },
                OrderLine {
                    product_id: products[2],
                    quantity: 2,
                },
            ],
            payment_reference: Some("pi_demo_ab12".into()),
            paid: true,
            cart_id: None,
            number: Some(number),
            placed_at: Some(placed_at),
        })
        .await?;
    let order = system
        .orders
        .advance(&order.number, OrderStatus::Processing, None, Utc::now())
        .await?;

    let guest_email = "guest@example.com".to_string();
    let guest_order = system
        .manager
        .place_order(Checkout {
            owner: OrderOwner::Guest {
                email: guest_email.clone(),
                name: "Sam Guest".into(),
            },
            vendor_id: vendor,
            lines: vec![OrderLine {
                product_id: products[1],
                quantity: 1,
            }],
            payment_reference: Some("pi_demo_guest".into()),
            paid: true,
            cart_id: None,
            number: None,
            placed_at: None,
        })
        .await?;

    system
        .carts
        .create_cart(CartCreate {
            owner: CartOwner::Registered { user_id: customer },
            lines: vec![CartLine {
                product_id: products[1],
                quantity: 4,
            }],
            at: Utc::now() - Duration::hours(48),
        })
        .await?;

    info!(
        order = %order.number,
        guest_order = %guest_order.number,
        products = products.len(),
        "Demo data loaded"
    );
    Ok(DemoData {
        admin,
        vendor,
        vendor_staff,
        customer,
        customer_email,
        products,
        order: order.number,
        guest_email,
        guest_order: guest_order.number,
    })
}
