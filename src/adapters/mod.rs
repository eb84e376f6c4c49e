#[cfg(any(test, feature = "test-util"))]
pub mod memory_store;
pub mod postgres_store;

#[cfg(any(test, feature = "test-util"))]
pub use memory_store::MemoryStore;
pub use postgres_store::PostgresStore;
