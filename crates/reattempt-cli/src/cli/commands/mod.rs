//! CLI command handlers.

mod config;
mod run;

pub use config::run_show_config;
pub use run::run_command;
