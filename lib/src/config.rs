//! Defines the configuration for a zbrdf run: conversion buffer size, split
//! ceiling and SPARQL endpoint settings. Every parameter is explicit and can be
//! loaded from (or saved to) a JSON file.

use crate::consts::{
    DEFAULT_ENDPOINT, DEFAULT_FLUSH_THRESHOLD, DEFAULT_REQUEST_INTERVAL_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SPLIT_MAX_SIZE_MB,
};
use anyhow::{Context, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::path::Path;
use std::time::Duration;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Builder)]
#[builder(default, build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct Config {
    /// Buffered bytes above which the converter flushes to the output file
    pub flush_threshold_bytes: usize,
    /// Soft ceiling for each split part, in MiB
    pub split_max_size_mb: u64,
    /// SPARQL endpoint the problem queries are posted to
    #[builder(setter(into))]
    pub endpoint: String,
    /// Minimum delay between the start of two endpoint requests
    pub request_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flush_threshold_bytes: DEFAULT_FLUSH_THRESHOLD,
            split_max_size_mb: DEFAULT_SPLIT_MAX_SIZE_MB,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_interval_ms: DEFAULT_REQUEST_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.split_max_size_mb == Some(0) {
            return Err("split_max_size_mb must be greater than zero".to_string());
        }
        if let Some(mb) = self.split_max_size_mb {
            if mb.checked_mul(1024 * 1024).is_none() {
                return Err(format!("split_max_size_mb {mb} is too large"));
            }
        }
        if let Some(endpoint) = &self.endpoint {
            url::Url::parse(endpoint)
                .map_err(|e| format!("invalid endpoint URL '{endpoint}': {e}"))?;
        }
        Ok(())
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Returns a builder pre-populated with this config, so callers can
    /// override individual values (e.g. CLI flags over a config file).
    pub fn to_builder(&self) -> ConfigBuilder {
        let mut builder = ConfigBuilder::default();
        builder
            .flush_threshold_bytes(self.flush_threshold_bytes)
            .split_max_size_mb(self.split_max_size_mb)
            .endpoint(self.endpoint.clone())
            .request_interval_ms(self.request_interval_ms)
            .request_timeout_secs(self.request_timeout_secs);
        builder
    }

    pub fn split_max_bytes(&self) -> u64 {
        self.split_max_size_mb * 1024 * 1024
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let handle = std::fs::File::open(file)
            .with_context(|| format!("Failed to open config file {}", file.display()))?;
        let reader = BufReader::new(handle);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file {}", file.display()))?;
        // run the same checks as the builder
        Ok(config.to_builder().build()?)
    }

    /// Prints out the current Config in a clear and readable way for command line output.
    pub fn print(&self) {
        println!("Configuration:");
        println!(
            "  Flush threshold: {} bytes ({})",
            self.flush_threshold_bytes,
            pretty_bytes::converter::convert(self.flush_threshold_bytes as f64)
        );
        println!("  Split max size: {} MiB", self.split_max_size_mb);
        println!("  Endpoint: {}", self.endpoint);
        println!("  Request interval: {} ms", self.request_interval_ms);
        println!("  Request timeout: {} s", self.request_timeout_secs);
    }
}
