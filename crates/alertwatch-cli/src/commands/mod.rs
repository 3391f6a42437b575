pub mod config;
pub mod query;
pub mod run;

use alertwatch_core::Config;
use std::path::Path;

/// Load the config from `path` or the default location, then validate it.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}
