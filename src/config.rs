use std::env::{self, VarError};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use crate::error::{AppError, Result};

pub const DEFAULT_API_BASE: &str = "https://hn.algolia.com/api/v1";
pub const DEFAULT_HITS_PER_PAGE: u32 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Base URL of the search API, without the `/search` path.
    pub api_base: String,
    pub hits_per_page: u32,
    /// Key fetched once at startup.
    pub initial_query: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|name| env::var(name))
    }

    /// Builds a config from an arbitrary variable lookup, so callers other
    /// than `load` never have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let var_or = |name: &str, default: &str| -> Result<String> {
            match lookup(name) {
                Ok(value) => Ok(value),
                Err(VarError::NotPresent) => Ok(default.to_string()),
                Err(err) => Err(err.into()),
            }
        };

        let host = var_or("HOST", "127.0.0.1")?;
        let port = var_or("PORT", "3000")?;
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let api_base = var_or("HN_API_BASE", DEFAULT_API_BASE)?;
        let api_base = api_base.trim_end_matches('/').to_string();
        reqwest::Url::parse(&api_base)
            .map_err(|e| AppError::ConfigError(format!("Invalid HN_API_BASE: {}", e)))?;

        let hits_per_page = var_or("HN_HITS_PER_PAGE", &DEFAULT_HITS_PER_PAGE.to_string())?;
        let hits_per_page = hits_per_page
            .parse::<u32>()
            .map_err(|e| AppError::ConfigError(format!("Invalid HN_HITS_PER_PAGE: {}", e)))?;

        let initial_query = var_or("INITIAL_QUERY", "")?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            api_base,
            hits_per_page,
            initial_query,
        })
    }

    /// Config pointing at a specific search API, with defaults elsewhere.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Config {
            server_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            api_base: api_base.into(),
            hits_per_page: DEFAULT_HITS_PER_PAGE,
            initial_query: String::new(),
        }
    }
}
