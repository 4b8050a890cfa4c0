//! SQLite persistence for users and their daily tracker entries.
//!
//! The connection lives on a dedicated worker thread; repositories are
//! `impl Database` blocks that ship closures to it.

mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use helpers::DATE_FORMAT;
