//! In-memory storage: tables, their indexes, and database snapshots

pub mod database;
pub mod index;
pub mod snapshot;
pub mod table;
