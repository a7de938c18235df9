//! `reattempt config` – print where the config lives and what it says.

use anyhow::Result;
use reattempt_core::config::{self, RetryConfig};

pub fn run_show_config(cfg: &RetryConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
