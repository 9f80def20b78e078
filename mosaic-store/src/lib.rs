pub mod app_config;
pub mod checkout;
pub mod compress;
pub mod database;
pub mod media;
pub mod redis_repo;
pub mod square_repo;

pub use database::DbClient;
pub use redis_repo::RedisClient;
