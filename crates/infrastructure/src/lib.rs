//! Infrastructure adapters for tenancy ports.

#![forbid(unsafe_code)]

mod in_memory_tenancy_store;
mod postgres_tenancy_store;
mod system_clock;

pub use in_memory_tenancy_store::InMemoryTenancyStore;
pub use postgres_tenancy_store::{MIGRATOR, PostgresTenancyStore, run_migrations};
pub use system_clock::SystemClock;
