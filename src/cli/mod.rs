//! CLI module for Conversation Recap
//!
//! Provides subcommands for running the workflow in different modes:
//! - `serve`: HTTP ingress dispatching executions
//! - `execute`: one execution from a trigger payload

pub mod execute;
pub mod serve;

use clap::{Parser, Subcommand};

/// Conversation Recap - turns conversation history into model invocations
#[derive(Parser)]
#[command(name = "conversation-recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP ingress
    Serve,

    /// Run one execution and print its outcome as JSON
    Execute(execute::ExecuteArgs),
}
