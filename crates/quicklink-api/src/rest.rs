// REST probe for instance health and metadata.
//
// Only two read-only endpoints are used: `GET /api/` to validate the
// token and `GET /api/config` for the status summary.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::InstanceConfig;
use crate::transport::TransportConfig;

/// Bearer-token REST client for a Home Assistant instance.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl RestClient {
    /// Build a client for `base_url` (e.g. `http://homeassistant.local:8123`).
    pub fn new(
        base_url: Url,
        token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_http_client()?,
            base_url,
            token,
        })
    }

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Rest {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Validate reachability and the token.
    ///
    /// `GET /api/`, returns the server's status message ("API running.").
    pub async fn check_api(&self) -> Result<String, Error> {
        #[derive(serde::Deserialize)]
        struct ApiStatus {
            message: String,
        }

        let status: ApiStatus = self.get(self.api_url("")?).await?;
        Ok(status.message)
    }

    /// Instance metadata.
    ///
    /// `GET /api/config`
    pub async fn instance_config(&self) -> Result<InstanceConfig, Error> {
        self.get(self.api_url("config")?).await
    }
}
