// # Tillage Database Integration
//
// PostgreSQL implementation of the storage collaborator contracts
// (`PlotStore`, `PlayerStore`) from `tillage-core`.

pub mod error;
pub mod pool;
pub mod schema;
pub mod store;

// Re-exports for convenience
pub use error::DbError;
pub use pool::PostgresPool;
pub use schema::init_schema;
pub use store::PgStore;

// Prelude module
pub mod prelude {
    pub use crate::error::DbError;
    pub use crate::pool::PostgresPool;
    pub use crate::schema::init_schema;
    pub use crate::store::PgStore;
}
