//! CLI subcommand implementations.

pub mod favourite;
pub mod migrate;
