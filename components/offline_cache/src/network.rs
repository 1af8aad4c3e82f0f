//! The network seam.
//!
//! The controller never talks to sockets itself. Hosts hand it a
//! [`Network`] that performs the live fetch; tests hand it a scripted one.

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::http::{Request, Response};

/// Performs live fetches on behalf of the controller
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch `request` from the network.
    ///
    /// Any HTTP status is a successful fetch; only transport failures are
    /// errors.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

#[cfg(feature = "http-client")]
pub use http_client::HttpNetwork;

#[cfg(feature = "http-client")]
mod http_client {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use tracing::trace;

    use super::Network;
    use crate::error::NetworkError;
    use crate::http::{Request, Response, ResponseType};
    use crate::origin::Origin;

    /// [`Network`] backed by a reqwest client
    #[derive(Debug, Clone)]
    pub struct HttpNetwork {
        client: reqwest::Client,
        origin: Origin,
    }

    impl HttpNetwork {
        /// Network for pages served from `origin`
        pub fn new(origin: Origin) -> Self {
            Self::with_client(reqwest::Client::new(), origin)
        }

        /// Use a preconfigured client (timeouts, proxies, TLS roots)
        pub fn with_client(client: reqwest::Client, origin: Origin) -> Self {
            Self { client, origin }
        }
    }

    fn transport(err: reqwest::Error) -> NetworkError {
        if err.is_connect() {
            NetworkError::Offline
        } else {
            NetworkError::Transport(err.to_string())
        }
    }

    #[async_trait]
    impl Network for HttpNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
            let method = reqwest::Method::from_bytes(request.method.to_string().as_bytes())
                .map_err(|e| NetworkError::Transport(e.to_string()))?;

            let mut builder = self.client.request(method, request.url.clone());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let resp = builder.send().await.map_err(transport)?;
            let status = resp.status();
            let final_url = resp.url().clone();
            let headers: BTreeMap<String, String> = resp
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = resp.bytes().await.map_err(transport)?;

            let response_type = if self.origin.contains(&final_url) {
                ResponseType::Basic
            } else {
                ResponseType::Cors
            };
            trace!(url = %final_url, status = status.as_u16(), "network response");

            Ok(Response {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                headers,
                body,
                response_type,
                url: Some(final_url.to_string()),
            })
        }
    }

}
