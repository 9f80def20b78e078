use std::sync::Arc;

use mosaic_core::payment::PaymentLinkProvider;
use mosaic_core::repository::{ImageCompressor, MediaStore, RangeCache, SquareRepository};
use mosaic_core::reservation::Clock;
use mosaic_store::app_config::BusinessRules;
use mosaic_store::RedisClient;

#[derive(Clone)]
pub struct WebhookConfig {
    pub signing_secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub squares: Arc<dyn SquareRepository>,
    pub cache: Arc<dyn RangeCache>,
    pub media: Arc<dyn MediaStore>,
    pub payments: Arc<dyn PaymentLinkProvider>,
    pub compressor: Arc<dyn ImageCompressor>,
    pub clock: Arc<dyn Clock>,
    pub redis: Arc<RedisClient>,
    pub business_rules: BusinessRules,
    pub webhook: WebhookConfig,
}
