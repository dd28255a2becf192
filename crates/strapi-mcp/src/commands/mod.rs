//! Subcommand implementations.

pub mod clear_cache;
pub mod login;
pub mod provision_token;
pub mod serve;
