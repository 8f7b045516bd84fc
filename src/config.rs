use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::info;

use crate::errors::{Error, Result};

pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Interface the server binds to. All of them, so the app is reachable from outside a container.
pub const BIND_HOST: &str = "0.0.0.0";

/// Server settings, read from the environment once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory holding `index.html` and the other static assets
    pub static_dir: PathBuf,
    /// Refuse orders that fail validation instead of only logging the problems
    pub strict_orders: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 3000,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            strict_orders: false,
        }
    }
}

impl ServerConfig {
    /// Load the configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            static_dir: try_load(&lookup, "STATIC_DIR", DEFAULT_STATIC_DIR)?,
            strict_orders: try_load(&lookup, "STRICT_ORDERS", "false")?,
        })
    }

    /// Address given to the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", BIND_HOST, self.port)
    }
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid {key} value '{value}': {e}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_in(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_in(&[
            ("PORT", "8080"),
            ("STATIC_DIR", "/srv/www"),
            ("STRICT_ORDERS", "true"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
        assert!(config.strict_orders);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_values() {
        let err = ServerConfig::from_lookup(lookup_in(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(ServerConfig::from_lookup(lookup_in(&[("PORT", "70000")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_in(&[("STRICT_ORDERS", "yes")])).is_err());
    }
}
