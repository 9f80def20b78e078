use async_trait::async_trait;
use bytes::Bytes;

use mosaic_core::repository::ImageCompressor;

/// Compressor that hands bytes through untouched, for deployments where
/// images arrive pre-sized. The caller still checks the ceiling on
/// whatever comes out.
#[derive(Debug, Clone, Default)]
pub struct PassthroughCompressor;

#[async_trait]
impl ImageCompressor for PassthroughCompressor {
    async fn compress(
        &self,
        bytes: Bytes,
        _max_bytes: usize,
    ) -> Result<Bytes, Box<dyn std::error::Error + Send + Sync>> {
        Ok(bytes)
    }
}
