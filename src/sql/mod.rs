//! SQL utilities
//!
//! Provides clause building, statement rendering, and identifier sanitization.

pub mod clause;
pub mod dialect;
pub mod sanitize;
pub mod statement;

pub use clause::{
    Clause, build_assignments, build_equality, build_insert_columns, build_insert_values,
    build_substring, to_param,
};
pub use dialect::Dialect;
pub use sanitize::{SQL_RESERVED_WORDS, escape_literal, is_plain_identifier, quote_identifier};
pub use statement::{Statement, StatementKind};
