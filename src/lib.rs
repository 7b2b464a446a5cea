//! cattery - a record service over a single CSV table of cats
//!
//! - `table`: CSV codec and the file-backed record store
//! - `http_server`: axum routes over the store
//! - `observability`: structured JSON logging
//! - `cli`: `init` and `serve` commands

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod table;
