use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};

use mosaic_core::repository::RangeCache;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Only the INCR reply matters; EXPIRE's is dropped so the
        // pipeline result destructures as a single count
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

#[async_trait]
impl RangeCache for RedisClient {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(key).await?;
        Ok(payload)
    }

    async fn set(
        &self,
        key: &str,
        payload: &str,
        ttl_seconds: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, ttl_seconds).await?;
        Ok(())
    }
}
