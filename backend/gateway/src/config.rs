//! Application configuration loaded from environment variables.

use reach_token::{Address, CurveParameters, FixedPoint};

use crate::errors::{GatewayError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Wallet allowed to pause, update parameters and manage proposals
    pub owner: Address,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Price-feed endpoint; when absent `oracle_static_price` is served
    pub oracle_url: Option<String>,
    /// USD price of the payment currency used without a live feed
    pub oracle_static_price: FixedPoint,
    /// How many times a failed feed request is retried
    pub oracle_max_retries: u32,
    /// Curve parameters the engine starts with
    pub curve: CurveParameters,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = CurveParameters::default();
        Ok(Config {
            owner: env_var("OWNER_ADDRESS").map(Address::new).map_err(|_| {
                GatewayError::Config("OWNER_ADDRESS environment variable is required".to_string())
            })?,
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./reach_events.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid API_PORT".to_string()))?,
            oracle_url: env_var("ORACLE_URL").ok(),
            oracle_static_price: fixed_var("ORACLE_STATIC_PRICE", "2000")?,
            oracle_max_retries: env_var("ORACLE_MAX_RETRIES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid ORACLE_MAX_RETRIES".to_string()))?,
            curve: CurveParameters {
                base_price: fixed_var("BASE_PRICE", &defaults.base_price.to_string())?,
                bonding_constant: fixed_var("BONDING_CONSTANT", &defaults.bonding_constant.to_string())?,
                floor_price: fixed_var("FLOOR_PRICE", &defaults.floor_price.to_string())?,
            },
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| GatewayError::Config(format!("Missing env var: {key}")))
}

fn fixed_var(key: &str, default: &str) -> Result<FixedPoint> {
    env_var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| GatewayError::Config(format!("Invalid {key}")))
}
