//! Who may see and act on an order.
//!
//! An order the caller may not see is reported as missing, so callers cannot
//! guess order numbers. Once the order is visible, a disallowed operation
//! is `Forbidden`.

use crate::model::{same_email, Decider, DeciderRole, Order, Role, User};
use crate::order_actor::OrderError;

/// Owner, staff of the order's vendor, or an admin.
pub fn can_view(user: &User, order: &Order) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Vendor(vendor_id) => vendor_id == order.vendor_id || order.owned_by(user.id),
        Role::Customer => order.owned_by(user.id),
    }
}

pub fn ensure_visible(user: &User, order: &Order) -> Result<(), OrderError> {
    if can_view(user, order) {
        Ok(())
    } else {
        Err(OrderError::NotFound(order.number.to_string()))
    }
}

/// The capacity in which `user` decides on `order`: its vendor's staff or an
/// admin.
pub fn decider_for(user: &User, order: &Order) -> Result<Decider, OrderError> {
    ensure_visible(user, order)?;
    let role = match user.role {
        Role::Admin => DeciderRole::Admin,
        Role::Vendor(vendor_id) if vendor_id == order.vendor_id => DeciderRole::Vendor,
        _ => {
            return Err(OrderError::Forbidden(
                "only the order's vendor or an admin may do this".into(),
            ))
        }
    };
    Ok(Decider {
        user_id: user.id,
        role,
    })
}

/// The customer-side proof for guest operations: the email must be the one
/// the order was placed with.
pub fn guest_matches(order: &Order, email: &str, owner_email: Option<&str>) -> bool {
    match order.guest_email() {
        Some(guest) => same_email(guest, email),
        None => owner_email.is_some_and(|owner| same_email(owner, email)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        OrderNumber, OrderOwner, OrderStatus, PaymentStatus, UserId, VendorId,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn order(owner: OrderOwner) -> Order {
        Order {
            number: OrderNumber::parse("LM-2401-AB12").unwrap(),
            owner,
            vendor_id: VendorId(1),
            items: Vec::new(),
            total: Decimal::ZERO,
            status: OrderStatus::Processing,
            payment_status: PaymentStatus::Paid,
            payment_reference: None,
            shipment: None,
            refund: None,
            refund_history: Vec::new(),
            cancellation_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(id: u32, role: Role) -> User {
        User {
            id: UserId(id),
            name: format!("user {id}"),
            email: format!("user{id}@example.com"),
            role,
        }
    }

    #[test]
    fn strangers_see_nothing() {
        let order = order(OrderOwner::Registered { user_id: UserId(1) });
        assert!(can_view(&user(1, Role::Customer), &order));
        assert!(can_view(&user(9, Role::Vendor(VendorId(1))), &order));
        assert!(can_view(&user(8, Role::Admin), &order));
        assert!(!can_view(&user(2, Role::Customer), &order));
        assert!(!can_view(&user(3, Role::Vendor(VendorId(2))), &order));
    }

    #[test]
    fn owners_cannot_decide() {
        let order = order(OrderOwner::Registered { user_id: UserId(1) });
        assert!(matches!(
            decider_for(&user(1, Role::Customer), &order),
            Err(OrderError::Forbidden(_))
        ));
        assert!(matches!(
            decider_for(&user(2, Role::Customer), &order),
            Err(OrderError::NotFound(_))
        ));
        assert_eq!(
            decider_for(&user(9, Role::Vendor(VendorId(1))), &order)
                .unwrap()
                .role,
            DeciderRole::Vendor
        );
    }

    #[test]
    fn guest_proof_uses_the_order_email() {
        let guest = order(OrderOwner::Guest {
            email: "Guest@Example.com".into(),
            name: "Gus".into(),
        });
        assert!(guest_matches(&guest, " guest@example.com ", None));
        assert!(!guest_matches(&guest, "other@example.com", None));

        let registered = order(OrderOwner::Registered { user_id: UserId(1) });
        assert!(guest_matches(&registered, "user1@example.com", Some("user1@example.com")));
        assert!(!guest_matches(&registered, "user1@example.com", None));
    }
}
