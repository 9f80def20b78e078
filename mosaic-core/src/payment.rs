use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Custom metadata attached to a checkout so the payment confirmation
/// webhook can be tied back to the cell it pays for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutData {
    pub square_id: i64,
}

/// Issues hosted payment links for cell purchases
#[async_trait]
pub trait PaymentLinkProvider: Send + Sync {
    /// Create a checkout URL carrying `data` as custom metadata.
    ///
    /// `Ok(None)` means the provider answered but returned no usable
    /// link; transport and protocol failures are `Err`.
    async fn create_payment_link(
        &self,
        data: &CheckoutData,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;
}
