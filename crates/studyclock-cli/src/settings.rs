//! Layered settings: built-in defaults, then an optional file, then
//! `STUDYCLOCK_*` environment variables

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use studyclock_core::BotSettings;

pub fn load(path: Option<&Path>) -> Result<BotSettings, ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder
        .add_source(Environment::with_prefix("STUDYCLOCK").try_parsing(true))
        .build()?
        .try_deserialize()
}
