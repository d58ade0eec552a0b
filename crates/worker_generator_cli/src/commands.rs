//! Command modules for the worker-gen CLI.
//!
//! - `config_cmd`: create, check, export and describe configuration documents
//! - `generate_cmd`: render a worker project and write it to disk

pub mod config_cmd;
pub mod generate_cmd;
