//! SPARQL endpoint access.
//!
//! [`SparqlEndpoint`] is the seam the runner talks to; [`HttpEndpoint`] is the
//! real implementation, a paced blocking HTTP client.

use crate::config::Config;
use crate::consts::SPARQL_RESULTS_XML;
use crate::errors::EndpointStatusError;
use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};

pub trait SparqlEndpoint {
    /// Evaluates a SELECT query and returns the raw SPARQL XML results document.
    fn select(&mut self, query: &str) -> Result<String>;

    /// Human readable location, for log lines.
    fn location(&self) -> &str;
}

/// Keeps successive request starts at least `interval` apart.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    last_start: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: None,
        }
    }

    /// How long to wait before the next request may start, as of `now`.
    pub fn delay_at(&self, now: Instant) -> Duration {
        match self.last_start {
            Some(last) => self.interval.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Sleeps if needed, then marks a request as started.
    pub fn wait(&mut self) {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            debug!("Waiting {delay:?} before next request");
            std::thread::sleep(delay);
        }
        self.last_start = Some(Instant::now());
    }
}

pub struct HttpEndpoint {
    url: String,
    client: Client,
    pacer: Pacer,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>, timeout: Duration, interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            url: url.into(),
            client,
            pacer: Pacer::new(interval),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.request_timeout(),
            config.request_interval(),
        )
    }
}

impl SparqlEndpoint for HttpEndpoint {
    fn select(&mut self, query: &str) -> Result<String> {
        self.pacer.wait();
        debug!("POST {} ({} byte query)", self.url, query.len());
        let resp = self
            .client
            .post(&self.url)
            .header(ACCEPT, SPARQL_RESULTS_XML)
            .form(&[("query", query)])
            .send()
            .with_context(|| format!("Request to {} failed", self.url))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EndpointStatusError {
                endpoint: self.url.clone(),
                status: status.as_u16(),
            }
            .into());
        }
        resp.text()
            .with_context(|| format!("Failed to read response body from {}", self.url))
    }

    fn location(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_is_not_delayed() {
        let pacer = Pacer::new(Duration::from_secs(1));
        assert_eq!(pacer.delay_at(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_delay_counts_from_previous_start() {
        let mut pacer = Pacer::new(Duration::from_millis(1_000));
        let start = Instant::now();
        pacer.last_start = Some(start);
        assert_eq!(
            pacer.delay_at(start + Duration::from_millis(300)),
            Duration::from_millis(700)
        );
        assert_eq!(
            pacer.delay_at(start + Duration::from_millis(1_500)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_wait_spaces_requests() {
        let mut pacer = Pacer::new(Duration::from_millis(50));
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let mut endpoint = HttpEndpoint::new(
            "http://127.0.0.1:9/sparql",
            Duration::from_secs(2),
            Duration::ZERO,
        )
        .unwrap();
        assert!(endpoint.select("SELECT * WHERE { ?s ?p ?o }").is_err());
        assert_eq!(endpoint.location(), "http://127.0.0.1:9/sparql");
    }
}
