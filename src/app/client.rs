// HiveTail - app/client.rs
//
// JSON-over-HTTP access to the Hivemind root controller.
//
// `HiveClient::fetch_json` is the generic helper: GET an endpoint with query
// parameters, reject transport failures and any status outside 200-299, and
// decode the body. `LogSource` is the narrow seam the poller depends on, so
// tests can drive the poller without a server.

use crate::core::model::{LogChunk, NodeId};
use crate::util::error::FetchError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Anything that can answer "give me the log of `node` from `position`".
pub trait LogSource: Send + Sync {
    fn fetch_log(&self, node: &NodeId, position: i64) -> Result<LogChunk, FetchError>;
}

/// Blocking HTTP client bound to one controller base URL.
pub struct HiveClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HiveClient {
    /// `base_url` is the controller root, e.g. `http://127.0.0.1:9476`.
    /// A trailing slash is ignored.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{endpoint}` with `params` as query pairs and decode the
    /// JSON body into `T`.
    pub fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self.agent.get(&url).set("Accept", "application/json");
        for (key, value) in params {
            request = request.query(key, value);
        }
        let request_url = display_url(&url, params);

        tracing::trace!(url = %request_url, "GET");

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                return Err(FetchError::Status {
                    url: request_url,
                    code,
                    status_text: response.status_text().to_string(),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Transport {
                    url: request_url,
                    source: Box::new(transport),
                });
            }
        };

        // ureq only errors on 4xx/5xx; anything else outside 2xx (an
        // unfollowed redirect, say) is still a failure here.
        let code = response.status();
        if !(200..300).contains(&code) {
            return Err(FetchError::Status {
                url: request_url,
                code,
                status_text: response.status_text().to_string(),
            });
        }

        response
            .into_json::<T>()
            .map_err(|source| FetchError::Decode {
                url: request_url,
                source,
            })
    }
}

/// URL with its query string, for diagnostics only (values are not escaped).
fn display_url(url: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{url}?{}", query.join("&"))
}

impl LogSource for HiveClient {
    fn fetch_log(&self, node: &NodeId, position: i64) -> Result<LogChunk, FetchError> {
        self.fetch_json(
            &format!("/nodes/{node}/log"),
            &[("position", position.to_string())],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HiveClient::new("http://hive.local:9476/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://hive.local:9476");
    }

    #[test]
    fn test_display_url_joins_params() {
        assert_eq!(display_url("http://h/x", &[]), "http://h/x");
        assert_eq!(
            display_url("http://h/x", &[("position", "42".to_string()), ("raw", "1".to_string())]),
            "http://h/x?position=42&raw=1"
        );
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on loopback is essentially never listening.
        let client = HiveClient::new("http://127.0.0.1:9", Duration::from_millis(500));
        let node = NodeId::parse("n1").unwrap();
        let err = client.fetch_log(&node, -100).unwrap_err();
        assert!(
            matches!(err, FetchError::Transport { .. }),
            "expected transport error, got {err:?}"
        );
        assert!(err.url().contains("/nodes/n1/log?position=-100"));
    }
}
