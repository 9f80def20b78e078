use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use mosaic_core::payment::{CheckoutData, PaymentLinkProvider};

use crate::app_config::CheckoutConfig;

/// Payment-link issuer backed by a hosted checkout provider.
///
/// One checkout is created per claim; the cell id rides along as custom
/// metadata and comes back on the payment confirmation webhook.
pub struct CheckoutClient {
    http: reqwest::Client,
    config: CheckoutConfig,
}

impl CheckoutClient {
    pub fn new(config: CheckoutConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PaymentLinkProvider for CheckoutClient {
    async fn create_payment_link(
        &self,
        data: &CheckoutData,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let body = json!({
            "data": {
                "type": "checkouts",
                "attributes": {
                    "checkout_data": {
                        "custom": serde_json::to_value(data)?,
                    }
                },
                "relationships": {
                    "store": {
                        "data": { "type": "stores", "id": self.config.store_id.as_str() }
                    },
                    "variant": {
                        "data": { "type": "variants", "id": self.config.variant_id.as_str() }
                    }
                }
            }
        });

        let response = self
            .http
            .post(format!("{}/v1/checkouts", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/vnd.api+json")
            .header("Content-Type", "application/vnd.api+json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: serde_json::Value = response.json().await?;
        let url = payload
            .get("data")
            .and_then(|data| data.get("attributes"))
            .and_then(|attributes| attributes.get("url"))
            .and_then(|url| url.as_str())
            .map(String::from);

        if url.is_none() {
            warn!("Checkout response for square {} carried no URL", data.square_id);
        }

        Ok(url)
    }
}
