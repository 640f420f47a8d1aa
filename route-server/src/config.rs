use anyhow::{Context, Result};
use floor_route::RouterConfig;
use std::str::FromStr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:8080,http://127.0.0.1:8080,http://localhost:8501,http://127.0.0.1:8501";

/// Server settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub allowed_origins: Vec<String>,
    pub router: RouterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            router: RouterConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Overlay `BIND_ADDR`, `ALLOWED_ORIGINS`, `ROUTE_VERTICAL_SCALE`,
    /// `ROUTE_FLOOR_SHIFT`, `ROUTE_STAIR_PENALTY` and `ROUTE_MAX_SETTLED`
    /// on the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            config.allowed_origins = split_origins(&origins);
        }
        if let Some(scale) = parse_var::<f64, _>(&lookup, "ROUTE_VERTICAL_SCALE")? {
            config.router.projection.vertical_scale = scale;
        }
        if let Some(shift) = parse_var::<i32, _>(&lookup, "ROUTE_FLOOR_SHIFT")? {
            config.router.projection.floor_shift = shift;
        }
        if let Some(penalty) = parse_var::<f64, _>(&lookup, "ROUTE_STAIR_PENALTY")? {
            anyhow::ensure!(
                penalty.is_finite() && penalty > 0.0,
                "ROUTE_STAIR_PENALTY must be a positive number, got {}",
                penalty
            );
            config.router.weights.floor_change_penalty = penalty;
        }
        if let Some(limit) = parse_var::<usize, _>(&lookup, "ROUTE_MAX_SETTLED")? {
            config.router.max_settled = Some(limit);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
