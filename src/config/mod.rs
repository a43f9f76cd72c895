// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod server;

pub use crate::transform::ImageConfig;
pub use server::{LogFormat, OriginConfig, ServerConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub origin: OriginConfig,
    #[serde(default)]
    pub image_processing: ImageConfig,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }

    /// Parse YAML after replacing `${VAR_NAME}` with environment variable values.
    ///
    /// Every referenced variable must be set.
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = Vec::new();
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.push(var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing.first() {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        Self::from_yaml(&substituted)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = self.origin.url.trim();
        if url.is_empty() {
            return Err("origin.url cannot be empty".to_string());
        }

        let uri: http::Uri = url
            .parse()
            .map_err(|e| format!("origin.url '{}' is not a valid URL: {}", url, e))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(format!(
                "origin.url '{}' must be an absolute http:// URL",
                url
            ));
        }

        if self.server.request_timeout == 0 {
            return Err("server.request_timeout must be greater than 0".to_string());
        }

        self.image_processing.validate()
    }
}
