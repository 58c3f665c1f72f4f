use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use apex_core::constants::DEFAULT_BASELINE_CAPITAL;
use rust_decimal::Decimal;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cache_dir: String,
    pub baseline_capital: Decimal,
    pub cash_parameter: Option<Decimal>,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("APEX_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid APEX_LISTEN_ADDR")?;
        let db_path = std::env::var("APEX_DB_PATH").unwrap_or_else(|_| "./db/apex.db".into());
        let cache_dir = std::env::var("APEX_CACHE_DIR").unwrap_or_else(|_| "./cache".into());
        let baseline_capital = match std::env::var("APEX_BASELINE_CAPITAL") {
            Ok(raw) => Decimal::from_str(raw.trim()).context("Invalid APEX_BASELINE_CAPITAL")?,
            Err(_) => DEFAULT_BASELINE_CAPITAL,
        };
        let cash_parameter = std::env::var("APEX_CASH_PARAMETER")
            .ok()
            .map(|raw| Decimal::from_str(raw.trim()).context("Invalid APEX_CASH_PARAMETER"))
            .transpose()?;
        let cors_allow = std::env::var("APEX_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("APEX_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        Ok(Self {
            listen_addr,
            db_path,
            cache_dir,
            baseline_capital,
            cash_parameter,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
