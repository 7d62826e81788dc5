pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use memory::InMemoryCatalogStore;
pub use postgres::{create_pool, PgCatalogStore};
pub use redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use store::CatalogStore;

#[cfg(test)]
pub use store::MockCatalogStore;
