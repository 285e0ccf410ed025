use std::net::SocketAddr;

use serde::Deserialize;
use snafu::ResultExt;

use crate::database::DatabaseConfig;
use crate::error::{ApplicationError, ConfigLoadSnafu};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address", default = "default_host")]
    pub host: SocketAddr,

    #[serde(rename = "log_dir", default = "default_log_dir")]
    pub log_dir: String,

    #[serde(flatten)]
    pub database: DatabaseConfig,
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        envy::from_env::<Config>().context(ConfigLoadSnafu)
    }
}

fn default_host() -> SocketAddr {
    ([127, 0, 0, 1], 3000).into()
}

fn default_log_dir() -> String {
    "logs".to_string()
}
