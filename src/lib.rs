//! minidb - a minimal in-memory relational engine
//!
//! This crate provides:
//! - SQL parsing (lexer, parser, AST) for a small statement subset
//! - Typed tables with PRIMARY KEY, UNIQUE and NOT NULL enforcement
//! - Hash indexes and an equality hash join
//! - Snapshot and restore of the whole database
//!
//! ```
//! use minidb::{ExecutionResult, Session};
//!
//! let mut session = Session::default();
//! session.execute("CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(50))");
//! session.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')");
//! match session.execute("SELECT name FROM users WHERE id = 1") {
//!     ExecutionResult::RowSet(set) => assert_eq!(set.rows.len(), 1),
//!     other => panic!("{:?}", other),
//! }
//! ```

pub mod error;
pub mod logging;
pub mod sql;
pub mod storage;

pub use error::{Error, ErrorKind, Result, RowFailure, TypeError};
pub use sql::engine::Session;
pub use sql::executor::{ExecutionResult, RowSet, Summary};
pub use storage::{database::Database, snapshot::Snapshot};
