//! Environment-driven settings for the mock server binary.

use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub seed: bool,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            seed: true,
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Reads `TODO_BIND`, `PORT`, `TODO_SEED` and `TODO_LOG_JSON`, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind: lookup("TODO_BIND").unwrap_or(defaults.bind),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            seed: lookup("TODO_SEED")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.seed),
            log_json: lookup("TODO_LOG_JSON")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.log_json),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" => Some(false),
        _ => None,
    }
}
