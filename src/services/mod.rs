// Service exports
pub mod cache;
pub mod ledger;
pub mod memory;
pub mod postgres;
pub mod registry;
pub mod store;

pub use cache::PopulationCache;
pub use ledger::{LedgerError, MatchLedger};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use registry::{RegistryError, SchemaRegistry};
pub use store::{Storage, StorageError};
