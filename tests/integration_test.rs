//! End-to-end checks against a fully started system: real stores, the
//! sandbox gateway and an in-memory notifier.

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use marketplace_orders::config::AppConfig;
use marketplace_orders::gateway::{PaymentGateway, RefundCall, SandboxGateway};
use marketplace_orders::lifecycle::{seed_demo, DemoData, MarketplaceSystem};
use marketplace_orders::model::{
    Checkout, Decider, DeciderRole, OrderLine, OrderOwner, OrderStatus, PaymentStatus,
    RefundStatus, User, UserCreate,
};
use marketplace_orders::notify::{MemoryNotifier, Template};
use marketplace_orders::order_actor::{OrderError, ShipmentInfo};
use marketplace_orders::orders::OrderQuery;
use std::sync::Arc;
use std::time::Duration;

const ORDER: &str = "LM-2401-AB12";

struct Harness {
    system: MarketplaceSystem,
    gateway: Arc<SandboxGateway>,
    notifier: Arc<MemoryNotifier>,
    demo: DemoData,
}

impl Harness {
    async fn start() -> Self {
        Self::with_config(AppConfig {
            gateway_timeout: Duration::from_millis(100),
            ..AppConfig::default()
        })
        .await
    }

    async fn with_config(config: AppConfig) -> Self {
        let gateway = Arc::new(SandboxGateway::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let system = MarketplaceSystem::start(&config, gateway.clone(), notifier.clone());
        let demo = seed_demo(&system).await.expect("demo data");
        Self {
            system,
            gateway,
            notifier,
            demo,
        }
    }

    async fn user(&self, id: marketplace_orders::model::UserId) -> User {
        self.system.users.require(id).await.expect("user exists")
    }

    async fn customer(&self) -> User {
        self.user(self.demo.customer).await
    }

    async fn vendor_staff(&self) -> User {
        self.user(self.demo.vendor_staff).await
    }

    async fn admin(&self) -> User {
        self.user(self.demo.admin).await
    }
}

#[tokio::test]
async fn refund_request_and_approval_refund_the_order() {
    let h = Harness::start().await;
    let customer = h.customer().await;
    let staff = h.vendor_staff().await;

    let requested = h
        .system
        .refunds
        .request_refund(&customer, ORDER, "damaged")
        .await
        .expect("request accepted");
    assert_eq!(requested.status, OrderStatus::RefundRequested);
    let request = requested.refund.as_ref().expect("active request");
    assert_eq!(request.status, RefundStatus::Pending);
    assert_eq!(request.previous_status, OrderStatus::Processing);

    let refunded = h
        .system
        .refunds
        .approve_refund(&staff, ORDER, Some("confirmed damage"))
        .await
        .expect("approved");
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    assert!(refunded.refund.is_none());
    let decided = refunded.refund_history.last().expect("archived request");
    assert_eq!(decided.status, RefundStatus::Approved);
    assert!(decided.transaction_id.is_some());
    assert_eq!(decided.decision_notes.as_deref(), Some("confirmed damage"));
    assert_eq!(h.gateway.refunds_issued(), 1);

    let sent = h.notifier.wait_for(2, Duration::from_secs(1)).await;
    assert!(sent
        .iter()
        .any(|n| n.template == Template::RefundRequested && n.recipient == "orders@lumen.example"));
    assert!(sent
        .iter()
        .any(|n| n.template == Template::RefundApproved && n.recipient == h.demo.customer_email));
}

#[tokio::test]
async fn delivered_orders_cannot_be_refunded() {
    let h = Harness::start().await;
    let staff = h.vendor_staff().await;
    let customer = h.customer().await;

    h.system
        .manager
        .advance_status(
            &staff,
            ORDER,
            OrderStatus::Shipped,
            Some(ShipmentInfo {
                carrier: "DHL".into(),
                tracking_number: "JD014600003".into(),
            }),
        )
        .await
        .expect("shipped");
    let delivered = h
        .system
        .manager
        .advance_status(&staff, ORDER, OrderStatus::Delivered, None)
        .await
        .expect("delivered");
    assert!(delivered.shipment.unwrap().delivered_at.is_some());

    let result = h
        .system
        .refunds
        .request_refund(&customer, ORDER, "Changed my mind")
        .await;
    assert!(matches!(result, Err(OrderError::NotEligible(_))));
}

#[tokio::test]
async fn status_changes_follow_the_state_machine() {
    let h = Harness::start().await;
    let staff = h.vendor_staff().await;
    let customer = h.customer().await;

    let skipped = h
        .system
        .manager
        .advance_status(&staff, ORDER, OrderStatus::Delivered, None)
        .await;
    assert_eq!(
        skipped,
        Err(OrderError::InvalidTransition {
            from: OrderStatus::Processing,
            to: OrderStatus::Delivered,
        })
    );

    let by_customer = h
        .system
        .manager
        .advance_status(&customer, ORDER, OrderStatus::Cancelled, None)
        .await;
    assert!(matches!(by_customer, Err(OrderError::Forbidden(_))));
}

#[tokio::test]
async fn concurrent_refund_requests_open_exactly_one() {
    let h = Harness::start().await;
    let customer = h.customer().await;
    let admin = h.admin().await;

    let (first, second) = tokio::join!(
        h.system
            .refunds
            .request_refund(&customer, ORDER, "Wrong colour"),
        h.system.refunds.request_refund(&admin, ORDER, "Duplicate charge"),
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(OrderError::AlreadyRequested(_)))));
}

#[tokio::test]
async fn rejection_during_an_approval_loses_the_race() {
    let h = Harness::with_config(AppConfig {
        gateway_timeout: Duration::from_secs(2),
        ..AppConfig::default()
    })
    .await;
    let customer = h.customer().await;
    let staff = h.vendor_staff().await;
    let admin = h.admin().await;
    h.system
        .refunds
        .request_refund(&customer, ORDER, "Too dim")
        .await
        .unwrap();

    h.gateway.delay_next(Duration::from_millis(200));
    let refunds = h.system.refunds.clone();
    let approval =
        tokio::spawn(async move { refunds.approve_refund(&staff, ORDER, None).await });
    while h.gateway.calls() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let rejection = h
        .system
        .refunds
        .reject_refund(&admin, ORDER, "Not covered")
        .await;
    assert!(matches!(rejection, Err(OrderError::AlreadyDecided(_))));

    let approved = approval.await.unwrap().expect("approval completes");
    assert_eq!(approved.status, OrderStatus::Refunded);

    let again = h.system.refunds.approve_refund(&admin, ORDER, None).await;
    assert!(matches!(again, Err(OrderError::AlreadyDecided(_))));
}

#[tokio::test]
async fn rejection_cannot_take_over_an_approval_outliving_its_claim() {
    // Built directly: the environment loader refuses a claim this short.
    let h = Harness::with_config(AppConfig {
        refund_claim_ttl: Duration::from_secs(1),
        gateway_timeout: Duration::from_secs(3),
        ..AppConfig::default()
    })
    .await;
    let customer = h.customer().await;
    let staff = h.vendor_staff().await;
    let admin = h.admin().await;
    h.system
        .refunds
        .request_refund(&customer, ORDER, "Too dim")
        .await
        .unwrap();

    h.gateway.delay_next(Duration::from_millis(1800));
    let refunds = h.system.refunds.clone();
    let approval =
        tokio::spawn(async move { refunds.approve_refund(&staff, ORDER, None).await });
    tokio::time::sleep(Duration::from_millis(1300)).await;

    let rejection = h
        .system
        .refunds
        .reject_refund(&admin, ORDER, "Not covered")
        .await;
    assert!(matches!(rejection, Err(OrderError::AlreadyDecided(_))));

    let approved = approval.await.unwrap().expect("approval completes");
    assert_eq!(approved.status, OrderStatus::Refunded);
    assert_eq!(approved.payment_status, PaymentStatus::Refunded);
    assert_eq!(h.gateway.refunds_issued(), 1);
}

#[tokio::test]
async fn abandoned_claim_is_finished_by_the_next_approval() {
    let h = Harness::start().await;
    let customer = h.customer().await;
    let staff = h.vendor_staff().await;
    let admin = h.admin().await;
    h.system
        .refunds
        .request_refund(&customer, ORDER, "Too dim")
        .await
        .unwrap();

    // An approver claimed the request an hour ago, got the money back to the
    // customer and never recorded it.
    let claim_ttl = AppConfig::default().refund_settings().claim_ttl;
    let claimed = h
        .system
        .orders
        .begin_refund_decision(
            &h.demo.order,
            Decider {
                user_id: h.demo.vendor_staff,
                role: DeciderRole::Vendor,
            },
            Utc::now() - ChronoDuration::hours(1),
            claim_ttl,
        )
        .await
        .unwrap();
    let request = claimed.refund.clone().expect("claimed request");
    assert_eq!(request.status, RefundStatus::Approving);
    let earlier = h
        .gateway
        .refund(RefundCall {
            payment_reference: claimed.payment_reference.clone().unwrap(),
            amount: claimed.total,
            idempotency_key: request.id.to_string(),
        })
        .await
        .unwrap();

    let rejection = h
        .system
        .refunds
        .reject_refund(&staff, ORDER, "Not covered")
        .await;
    assert!(matches!(rejection, Err(OrderError::AlreadyDecided(_))));

    let refunded = h
        .system
        .refunds
        .approve_refund(&admin, ORDER, None)
        .await
        .expect("approval takes over the stale claim");
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    let decided = refunded.refund_history.last().unwrap();
    assert_eq!(decided.id, request.id);
    assert_eq!(decided.transaction_id.as_deref(), Some(earlier.transaction_id.as_str()));
    assert_eq!(h.gateway.calls(), 2);
    assert_eq!(h.gateway.refunds_issued(), 1);
}

#[tokio::test]
async fn rejection_restores_the_previous_status() {
    let h = Harness::start().await;
    let customer = h.customer().await;
    let staff = h.vendor_staff().await;
    h.system
        .refunds
        .request_refund(&customer, ORDER, "Too dim")
        .await
        .unwrap();

    let blank = h.system.refunds.reject_refund(&staff, ORDER, "  ").await;
    assert!(matches!(blank, Err(OrderError::ValidationError(_))));

    let rejected = h
        .system
        .refunds
        .reject_refund(&staff, ORDER, "Works as described")
        .await
        .unwrap();
    assert_eq!(rejected.status, OrderStatus::Processing);
    assert_eq!(rejected.payment_status, PaymentStatus::Paid);
    assert_eq!(
        rejected.refund_history.last().map(|r| r.status),
        Some(RefundStatus::Rejected)
    );
    assert_eq!(h.gateway.calls(), 0);

    // A new request may follow a rejection.
    h.system
        .refunds
        .request_refund(&customer, ORDER, "Still too dim")
        .await
        .expect("second request");
}

#[tokio::test]
async fn gateway_timeout_leaves_the_request_open_for_a_retry() {
    let h = Harness::start().await;
    let customer = h.customer().await;
    let staff = h.vendor_staff().await;
    h.system
        .refunds
        .request_refund(&customer, ORDER, "Flickers")
        .await
        .unwrap();

    h.gateway.delay_next(Duration::from_millis(500));
    let timed_out = h.system.refunds.approve_refund(&staff, ORDER, None).await;
    assert!(matches!(timed_out, Err(OrderError::GatewayError(_))));

    let detail = h
        .system
        .manager
        .get_order_by_number(ORDER, &staff)
        .await
        .unwrap();
    assert_eq!(detail.order.status, OrderStatus::RefundRequested);
    assert_eq!(
        detail.order.refund.as_ref().map(|r| r.status),
        Some(RefundStatus::Pending)
    );

    let refunded = h
        .system
        .refunds
        .approve_refund(&staff, ORDER, None)
        .await
        .expect("retry succeeds");
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert_eq!(h.gateway.refunds_issued(), 1);
}

#[tokio::test]
async fn orders_are_invisible_outside_their_owners() {
    let h = Harness::start().await;
    let stranger_id = h
        .system
        .users
        .create_user(UserCreate::customer("Eve", "eve@example.com"))
        .await
        .unwrap();
    let stranger = h.user(stranger_id).await;

    let result = h.system.manager.get_order_by_number(ORDER, &stranger).await;
    assert_eq!(result.unwrap_err(), OrderError::NotFound(ORDER.into()));

    let refund = h
        .system
        .refunds
        .request_refund(&stranger, ORDER, "Not mine")
        .await;
    assert_eq!(refund.unwrap_err(), OrderError::NotFound(ORDER.into()));

    let staff = h.vendor_staff().await;
    let detail = h
        .system
        .manager
        .get_order_by_number(ORDER, &staff)
        .await
        .unwrap();
    assert_eq!(detail.vendor.name, "Lumen Goods");
}

#[tokio::test]
async fn guest_proof_mismatch_looks_like_a_missing_order() {
    let h = Harness::start().await;
    let number = h.demo.guest_order.to_string();

    let found = h
        .system
        .manager
        .lookup_guest_order(" GUEST@example.com ", &number)
        .await
        .expect("email matches case-insensitively");
    assert_eq!(found.order.number, h.demo.guest_order);

    let wrong_email = h
        .system
        .manager
        .lookup_guest_order("someone@example.com", &number)
        .await;
    assert_eq!(wrong_email.unwrap_err(), OrderError::NotFound(number.clone()));

    let missing = h
        .system
        .manager
        .lookup_guest_order("guest@example.com", "LM-2401-ZZZZ")
        .await;
    assert_eq!(missing.unwrap_err(), OrderError::NotFound("LM-2401-ZZZZ".into()));

    // Registered orders answer to the email on the owner's account.
    let registered = h
        .system
        .manager
        .lookup_guest_order(&h.demo.customer_email, ORDER)
        .await
        .expect("owner email matches");
    assert_eq!(registered.order.number.as_str(), ORDER);

    let refund = h
        .system
        .refunds
        .guest_request_refund("guest@example.com", &number, "Never arrived")
        .await
        .expect("guest refund request");
    assert_eq!(refund.status, OrderStatus::RefundRequested);
}

#[tokio::test]
async fn order_listing_pages_newest_first() {
    let h = Harness::start().await;
    let buyer_id = h
        .system
        .users
        .create_user(UserCreate::customer("Bo", "bo@example.com"))
        .await
        .unwrap();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let mut numbers = Vec::new();
    for day in 0..12 {
        let order = h
            .system
            .manager
            .place_order(Checkout {
                owner: OrderOwner::Registered { user_id: buyer_id },
                vendor_id: h.demo.vendor,
                lines: vec![OrderLine {
                    product_id: h.demo.products[0],
                    quantity: 1,
                }],
                payment_reference: None,
                paid: false,
                cart_id: None,
                number: None,
                placed_at: Some(base + ChronoDuration::days(day)),
            })
            .await
            .unwrap();
        numbers.push(order.number);
    }

    let page = h
        .system
        .manager
        .list_orders(
            buyer_id,
            &OrderQuery {
                page: Some("2".into()),
                limit: Some("5".into()),
                ..OrderQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.orders.len(), 5);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.total, 12);
    assert_eq!(page.pagination.total_pages, 3);
    // Newest first: page two holds the 6th to 10th newest.
    assert_eq!(page.orders[0].number, numbers[6]);
    assert_eq!(page.orders[4].number, numbers[2]);

    let bad = h
        .system
        .manager
        .list_orders(
            buyer_id,
            &OrderQuery {
                status: Some("lost".into()),
                ..OrderQuery::default()
            },
        )
        .await;
    assert!(matches!(bad, Err(OrderError::ValidationError(_))));
}

#[tokio::test]
async fn vendor_listing_is_scoped_to_the_vendor() {
    let h = Harness::start().await;
    let staff = h.vendor_staff().await;
    let admin = h.admin().await;
    let customer = h.customer().await;

    let own = h
        .system
        .manager
        .list_vendor_orders(&staff, &OrderQuery::default())
        .await
        .unwrap();
    assert_eq!(own.pagination.total, 2);

    let other_vendor = OrderQuery {
        vendor_id: Some("99".into()),
        ..OrderQuery::default()
    };
    assert!(matches!(
        h.system.manager.list_vendor_orders(&staff, &other_vendor).await,
        Err(OrderError::Forbidden(_))
    ));
    assert!(matches!(
        h.system
            .manager
            .list_vendor_orders(&admin, &OrderQuery::default())
            .await,
        Err(OrderError::ValidationError(_))
    ));
    assert!(matches!(
        h.system
            .manager
            .list_vendor_orders(&customer, &OrderQuery::default())
            .await,
        Err(OrderError::Forbidden(_))
    ));
}

#[tokio::test]
async fn unpaid_orders_cancel_and_return_stock() {
    let h = Harness::start().await;
    let customer = h.customer().await;
    let lamp = h.demo.products[0];
    let before = h.system.products.check_stock(lamp).await.unwrap();

    let order = h
        .system
        .manager
        .place_order(Checkout {
            owner: OrderOwner::Registered {
                user_id: h.demo.customer,
            },
            vendor_id: h.demo.vendor,
            lines: vec![OrderLine {
                product_id: lamp,
                quantity: 3,
            }],
            payment_reference: None,
            paid: false,
            cart_id: None,
            number: None,
            placed_at: None,
        })
        .await
        .unwrap();
    assert_eq!(h.system.products.check_stock(lamp).await.unwrap(), before - 3);

    let cancelled = h
        .system
        .refunds
        .cancel_order(&customer, order.number.as_str(), "Ordered by mistake")
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(h.system.products.check_stock(lamp).await.unwrap(), before);

    // Paid orders go through the refund workflow instead.
    let paid = h.system.refunds.cancel_order(&customer, ORDER, "Too late").await;
    assert!(matches!(paid, Err(OrderError::NotEligible(_))));
}

#[tokio::test]
async fn jobs_are_idempotent_per_period() {
    let h = Harness::start().await;
    let today = Utc::now().date_naive();

    let first = h.system.jobs.inventory_check(today).await.unwrap();
    assert_eq!(first.written, 2);
    assert_eq!(first.notified, 2);
    let second = h.system.jobs.inventory_check(today).await.unwrap();
    assert_eq!(second.written, 2);
    assert_eq!(second.notified, 0);

    let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let snapshot = h.system.jobs.analytics_snapshot(day).await.unwrap();
    assert_eq!(snapshot.scanned, 1);
    assert_eq!(snapshot.written, 2);
    assert_eq!(h.system.jobs.analytics_snapshot(day).await.unwrap(), snapshot);

    let reminded = h.system.jobs.cart_recovery(Utc::now()).await.unwrap();
    assert_eq!(reminded.notified, 1);
    let rerun = h.system.jobs.cart_recovery(Utc::now()).await.unwrap();
    assert_eq!(rerun.notified, 0);

    let sent = h.notifier.wait_for(3, Duration::from_secs(1)).await;
    assert_eq!(
        sent.iter().filter(|n| n.template == Template::LowStock).count(),
        2
    );
    assert_eq!(h.notifier.sent_with(Template::CartReminder).len(), 1);
}

#[tokio::test]
async fn carts_bought_since_their_last_change_are_closed_not_reminded() {
    let h = Harness::start().await;
    // Paid for without closing the cart, as when the check-out step fails.
    h.system
        .manager
        .place_order(Checkout {
            owner: OrderOwner::Registered {
                user_id: h.demo.customer,
            },
            vendor_id: h.demo.vendor,
            lines: vec![OrderLine {
                product_id: h.demo.products[1],
                quantity: 1,
            }],
            payment_reference: Some("pi_test_cart".into()),
            paid: true,
            cart_id: None,
            number: None,
            placed_at: None,
        })
        .await
        .unwrap();

    let run = h.system.jobs.cart_recovery(Utc::now()).await.unwrap();
    assert_eq!(run.scanned, 1);
    assert_eq!(run.written, 0);
    assert_eq!(run.notified, 0);

    let rerun = h.system.jobs.cart_recovery(Utc::now()).await.unwrap();
    assert_eq!(rerun.scanned, 0);
    assert!(h.notifier.sent_with(Template::CartReminder).is_empty());
}
