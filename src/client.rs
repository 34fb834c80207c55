use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::{DbaasError, DbaasResult};

pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub target: String,
    pub token: String,
    pub timeout: Duration,
}

impl PlatformConfig {
    /// Both values are required; a missing or blank one is a configuration
    /// error raised before any request is made.
    pub fn new(target: Option<String>, token: Option<String>, timeout: Duration) -> DbaasResult<Self> {
        let target = required(target, "TSURU_TARGET")?;
        let token = required(token, "TSURU_TOKEN")?;

        Ok(Self {
            target: target.trim_end_matches('/').to_string(),
            token,
            timeout,
        })
    }

    fn authorization(&self) -> String {
        if self.token.to_lowercase().starts_with("bearer ") {
            self.token.clone()
        } else {
            format!("bearer {}", self.token)
        }
    }
}

fn required(value: Option<String>, name: &str) -> DbaasResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DbaasError::ConfigError(format!(
            "{} must be set (environment variable or command line flag)",
            name
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct EnvVar {
    name: String,
    value: String,
}

pub struct PlatformClient {
    client: reqwest::Client,
    config: PlatformConfig,
}

impl PlatformClient {
    pub fn new(config: PlatformConfig) -> DbaasResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut authorization = HeaderValue::from_str(&config.authorization())
            .map_err(|_| DbaasError::ConfigError("TSURU_TOKEN contains invalid characters".to_string()))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetches the app's environment variables as a name to value map.
    pub async fn fetch_env(&self, app: &str) -> DbaasResult<HashMap<String, String>> {
        let url = format!("{}/apps/{}/env", self.config.target, app);
        info!("Fetching environment variables from {}", url);

        let fetch_err = |status: Option<u16>, detail: String| {
            error!("Failed to get environment variables from {}: {}", url, detail);
            DbaasError::FetchError {
                app: app.to_string(),
                status,
                detail,
            }
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_err(None, e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(fetch_err(Some(status.as_u16()), format!("HTTP {}", status)));
        }

        let vars: Vec<EnvVar> = response
            .json()
            .await
            .map_err(|e| fetch_err(Some(status.as_u16()), format!("invalid response body: {}", e)))?;
        debug!("Received {} environment variables", vars.len());

        Ok(vars.into_iter().map(|v| (v.name, v.value)).collect())
    }
}
