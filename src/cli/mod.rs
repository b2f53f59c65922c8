//! Command line entry points
//!
//! - `serve`: run the HTTP API
//! - `migrate`: apply (or revert) PostgreSQL schema migrations and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Users Service - user directory, skills and follow graph
#[derive(Parser)]
#[command(name = "users-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply pending PostgreSQL migrations
    Migrate(migrate::MigrateArgs),
}
