//! MDT command-line library.
//!
//! Argument parsing lives in [`cli`], the subcommand implementations in
//! [`commands`], and the wiring of registry, agents, embeddings and
//! orchestrator from the environment in [`bootstrap`].

pub mod bootstrap;
pub mod cli;
pub mod commands;
