use crate::clients::{
    AlertClient, CartClient, OrderClient, ProductClient, SnapshotClient, UserClient, VendorClient,
};
use crate::config::AppConfig;
use crate::gateway::PaymentGateway;
use crate::http::AppState;
use crate::jobs::{JobRunner, JobStores};
use crate::notify::{NotificationDispatcher, Notifier};
use crate::orders::{Directory, OrderManager};
use crate::refunds::RefundWorkflow;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Actor task failed: {0}")]
    ActorFailed(String),

    #[error("Actors still running after {0:?}")]
    ShutdownTimeout(Duration),
}

/// Every store actor plus the services built on top of them.
///
/// The store clients are public so that seeding and tests can reach the
/// stores directly. Everything the HTTP layer needs is bundled by
/// [`app_state`](Self::app_state).
///
/// ```ignore
/// let system = MarketplaceSystem::start(&config, gateway, notifier);
/// let app = http::router(system.app_state(), &config.cors, config.request_timeout);
/// axum::serve(listener, app).await?;
/// system.shutdown(Duration::from_secs(5)).await?;
/// ```
pub struct MarketplaceSystem {
    pub users: UserClient,
    pub vendors: VendorClient,
    pub products: ProductClient,
    pub orders: OrderClient,
    pub carts: CartClient,
    pub alerts: AlertClient,
    pub snapshots: SnapshotClient,

    pub manager: OrderManager,
    pub refunds: RefundWorkflow,
    pub jobs: JobRunner,

    cron_secret: Option<Arc<str>>,
    handles: Vec<JoinHandle<()>>,
}

impl MarketplaceSystem {
    /// Spawns the store actors and wires the services. Must be called inside
    /// a Tokio runtime.
    pub fn start(
        config: &AppConfig,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store_timeout = config.store_timeout;

        let (user_actor, users) = crate::user_actor::new();
        let (vendor_actor, vendors) = crate::vendor_actor::new();
        let (product_actor, products) = crate::product_actor::new();
        let (order_actor, orders) = crate::order_actor::new();
        let (cart_actor, carts) = crate::cart_actor::new();
        let (alert_actor, alerts) = crate::report_actor::new_alerts();
        let (snapshot_actor, snapshots) = crate::report_actor::new_snapshots();

        let users = users.with_timeout(store_timeout);
        let vendors = vendors.with_timeout(store_timeout);
        let products = products.with_timeout(store_timeout);
        let orders = orders.with_timeout(store_timeout);
        let carts = carts.with_timeout(store_timeout);
        let alerts = alerts.with_timeout(store_timeout);
        let snapshots = snapshots.with_timeout(store_timeout);

        // The order store validates and reserves through the other stores.
        let handles = vec![
            tokio::spawn(user_actor.run(())),
            tokio::spawn(vendor_actor.run(())),
            tokio::spawn(product_actor.run(())),
            tokio::spawn(order_actor.run((users.clone(), vendors.clone(), products.clone()))),
            tokio::spawn(cart_actor.run(())),
            tokio::spawn(alert_actor.run(())),
            tokio::spawn(snapshot_actor.run(())),
        ];

        let notifications = NotificationDispatcher::new(notifier, config.notify_timeout);
        let directory = Directory::new(users.clone(), vendors.clone());
        let manager = OrderManager::new(
            orders.clone(),
            carts.clone(),
            directory.clone(),
            notifications.clone(),
        );
        let refunds = RefundWorkflow::new(
            manager.clone(),
            orders.clone(),
            directory,
            gateway,
            notifications.clone(),
            config.refund_settings(),
        );
        let jobs = JobRunner::new(
            JobStores {
                users: users.clone(),
                vendors: vendors.clone(),
                products: products.clone(),
                orders: orders.clone(),
                carts: carts.clone(),
                alerts: alerts.clone(),
                snapshots: snapshots.clone(),
            },
            notifications,
            config.job_settings(),
        );

        info!(actors = handles.len(), "Marketplace system started");
        Self {
            users,
            vendors,
            products,
            orders,
            carts,
            alerts,
            snapshots,
            manager,
            refunds,
            jobs,
            cron_secret: config.cron_secret.as_deref().map(Arc::from),
            handles,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            users: self.users.clone(),
            orders: self.manager.clone(),
            refunds: self.refunds.clone(),
            jobs: self.jobs.clone(),
            cron_secret: self.cron_secret.clone(),
        }
    }

    /// Drops the clients held here and waits for the actors to drain.
    ///
    /// Actors exit once every clone of their client is gone, so any
    /// [`AppState`] handed out must be dropped first (`axum::serve` drops
    /// the router when it returns).
    pub async fn shutdown(self, grace: Duration) -> Result<(), LifecycleError> {
        info!("Shutting down marketplace system...");
        let Self {
            users,
            vendors,
            products,
            orders,
            carts,
            alerts,
            snapshots,
            manager,
            refunds,
            jobs,
            handles,
            ..
        } = self;
        drop((refunds, manager, jobs));
        drop((users, vendors, products, orders, carts, alerts, snapshots));

        let drain = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    error!(error = ?e, "Actor task failed");
                    return Err(LifecycleError::ActorFailed(e.to_string()));
                }
            }
            Ok(())
        };
        match tokio::time::timeout(grace, drain).await {
            Ok(result) => result?,
            Err(_) => {
                error!(?grace, "Actors did not stop in time");
                return Err(LifecycleError::ShutdownTimeout(grace));
            }
        }
        info!("Marketplace system shutdown complete.");
        Ok(())
    }
}
