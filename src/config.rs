use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
}

impl Config {
    /// Reads `PORT` and `APP_DATA_PATH`, falling back to defaults for unset or
    /// unparsable values.
    pub fn from_env() -> Self {
        Self::from_vars(env::var("PORT").ok(), env::var("APP_DATA_PATH").ok())
    }

    pub fn from_vars(port: Option<String>, data_path: Option<String>) -> Self {
        Self {
            port: port
                .and_then(|value| value.trim().parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            data_path: data_path
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
