//! SQL processing module
//!
//! This module provides:
//! - `parser`: SQL lexer and parser
//! - `types`: SQL data types and rows
//! - `schema`: Column definitions and value validation
//! - `executor`: Statement execution
//! - `engine`: Session over a database

pub mod parser;
pub mod types;
pub mod schema;
pub mod executor;
pub mod engine;
