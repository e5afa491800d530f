mod models;
mod schema;
mod store;
mod trait_def;

pub use models::*;
pub use schema::{table_names, WAREHOUSE_SCHEMA};
pub use store::{FileTransaction, SqliteWarehouseStore};
pub use trait_def::{InsertOutcome, WarehouseWriter};
