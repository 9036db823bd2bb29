use super::{JobError, JobRunner, JobSummary};
use crate::model::{ProductFilter, StockAlertWrite};
use crate::notify::Template;
use chrono::{NaiveDate, Utc};
use resource_actor::ActorClient;
use serde_json::json;
use tracing::{info, instrument, warn};

impl JobRunner {
    /// Writes one alert per product at or below its threshold for `period`.
    /// The vendor hears about a product once per period.
    #[instrument(skip(self))]
    pub async fn inventory_check(&self, period: NaiveDate) -> Result<JobSummary, JobError> {
        let mut summary = JobSummary::new("inventory-check", period);
        let products = self.stores.products.list(ProductFilter::default()).await?;
        summary.scanned = products.len();
        let now = Utc::now();

        for product in products {
            let threshold = product.threshold(self.settings.low_stock_threshold);
            if product.stock > threshold {
                continue;
            }
            let replaced = self
                .stores
                .alerts
                .record(StockAlertWrite {
                    product_id: product.id,
                    vendor_id: product.vendor_id,
                    product_name: product.name.clone(),
                    stock: product.stock,
                    threshold,
                    period,
                    generated_at: now,
                })
                .await?;
            summary.written += 1;
            if replaced {
                continue;
            }

            let vendor = match self.stores.vendors.get(product.vendor_id).await {
                Ok(Some(vendor)) => vendor,
                Ok(None) => {
                    warn!(product = %product.id, vendor = %product.vendor_id, "Product of unknown vendor");
                    continue;
                }
                Err(e) => {
                    warn!(vendor = %product.vendor_id, error = %e, "Vendor lookup failed");
                    continue;
                }
            };
            self.notifications.send(
                vendor.contact_email,
                Template::LowStock,
                json!({
                    "productId": product.id,
                    "productName": product.name,
                    "stock": product.stock,
                    "threshold": threshold,
                    "period": period,
                }),
            );
            summary.notified += 1;
        }

        info!(
            scanned = summary.scanned,
            written = summary.written,
            notified = summary.notified,
            "Inventory check finished"
        );
        Ok(summary)
    }
}
