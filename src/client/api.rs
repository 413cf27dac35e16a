//! Transport from the form handler to the lookup endpoint.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::modules::availability::catalog::encode_component;
use crate::modules::availability::models::SearchResponse;

/// Successful endpoint answer as the form handler consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReply {
    /// Raw status label; unknown labels are rendered as not found.
    pub status: String,
    pub search_url: String,
}

/// Failures surfaced inline by the form handler.
#[derive(Debug, Error)]
pub enum ClientFetchError {
    #[error("{0}")]
    Network(#[source] reqwest::Error),

    #[error("Server error: {status}")]
    Server { status: u16 },

    #[error("{message}")]
    Api { message: String },

    #[error("unreadable response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Lookup endpoint as seen by the form handler.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, title: &str) -> Result<LookupReply, ClientFetchError>;
}

/// `SearchApi` over HTTP against a running endpoint.
#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    http_client: Client,
    endpoint: String,
}

impl HttpSearchApi {
    /// `endpoint` is the server base URL, e.g. `http://127.0.0.1:8080`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn request_url(&self, title: &str) -> String {
        format!(
            "{}/api/search?bookTitle={}",
            self.endpoint,
            encode_component(title)
        )
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    #[instrument(skip(self))]
    async fn search(&self, title: &str) -> Result<LookupReply, ClientFetchError> {
        let url = self.request_url(title);
        debug!(url = %url, "calling lookup endpoint");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(ClientFetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientFetchError::Server {
                status: status.as_u16(),
            });
        }

        match response
            .json::<SearchResponse>()
            .await
            .map_err(ClientFetchError::Decode)?
        {
            SearchResponse::Failure { error, .. } => Err(ClientFetchError::Api { message: error }),
            SearchResponse::Success { status, search_url } => {
                Ok(LookupReply { status, search_url })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn request_url_encodes_title() {
        let api = HttpSearchApi::new("http://localhost:8080/");
        assert_eq!(
            api.request_url("War & Peace"),
            "http://localhost:8080/api/search?bookTitle=War%20%26%20Peace"
        );
    }

    #[tokio::test]
    async fn decodes_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .and(query_param("bookTitle", "War & Peace"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "Checked Out",
                "searchUrl": "https://catalog.example/q"
            })))
            .mount(&server)
            .await;

        let reply = HttpSearchApi::new(server.uri())
            .search("War & Peace")
            .await
            .unwrap();

        assert_eq!(
            reply,
            LookupReply {
                status: "Checked Out".to_string(),
                search_url: "https://catalog.example/q".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_success_status_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Failed to fetch or parse library data.",
                "details": "Library server responded with status: 503"
            })))
            .mount(&server)
            .await;

        let err = HttpSearchApi::new(server.uri())
            .search("Emma")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientFetchError::Server { status: 500 }));
        assert_eq!(err.to_string(), "Server error: 500");
    }

    #[tokio::test]
    async fn error_field_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "error": "catalog offline" })),
            )
            .mount(&server)
            .await;

        let err = HttpSearchApi::new(server.uri())
            .search("Emma")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "catalog offline");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = HttpSearchApi::new(format!("http://{addr}"));

        let err = api.search("Emma").await.unwrap_err();
        assert!(matches!(err, ClientFetchError::Network(_)));
    }
}
