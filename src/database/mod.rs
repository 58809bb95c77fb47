pub mod manager;
pub mod matcher;
pub mod memory;
pub mod mongo;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager, StoreHandle};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use repository::Repository;
pub use store::{DocumentStore, FindQuery, UpdateOutcome};
