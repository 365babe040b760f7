use std::env;

use log::*;

const DEFAULT_BMS_HOST: &str = "127.0.0.1";
const DEFAULT_BMS_PORT: u16 = 8480;
const DEFAULT_BMS_DATABASE_URL: &str = "sqlite://data/bazaar_store.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BMS_HOST.to_string(),
            port: DEFAULT_BMS_PORT,
            database_url: DEFAULT_BMS_DATABASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BMS_HOST").ok().unwrap_or_else(|| DEFAULT_BMS_HOST.into());
        let port = env::var("BMS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BMS_PORT. {e} Using the default, {DEFAULT_BMS_PORT}, instead."
                    );
                    DEFAULT_BMS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BMS_PORT);
        let database_url = env::var("BMS_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ BMS_DATABASE_URL is not set. Using the default, {DEFAULT_BMS_DATABASE_URL}.");
            DEFAULT_BMS_DATABASE_URL.into()
        });
        Self { host, port, database_url }
    }
}
