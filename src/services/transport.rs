//! HTTP transport seam.
//!
//! The session builds fully enveloped requests and hands them to a
//! [`Transport`]. Production uses the reqwest-backed
//! [`ApiClient`](crate::services::api_client::ApiClient); tests substitute
//! a recording mock.

use crate::error::AppError;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// HTTP methods used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// A spreadsheet handed to the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self {
            file_name,
            bytes,
            mime,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            AppError::invalid_input_field(
                format!("Failed to read {}: {}", path.display(), e),
                "file",
            )
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".csv") {
        "text/csv"
    } else if lower.ends_with(".xlsx") {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    } else {
        "application/octet-stream"
    }
}

/// Request payload.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    /// Single file under the form field `file`.
    Multipart(UploadFile),
}

/// A request as it leaves the session, headers included.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the backend base URL, e.g. `/get_info`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// All values of a header, case-insensitively.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Status and body text of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_str(&self.body)
            .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
    }

    /// `message` field of a JSON body, if present.
    pub fn message(&self) -> Option<String> {
        self.json::<Value>()
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
    }
}

/// Executes enveloped requests against the backend.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, AppError>>;
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording transport for unit tests.

    use super::*;
    use futures::FutureExt;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves canned responses and records every request it sees.
    ///
    /// A route holding several responses pops them in order; the last one
    /// sticks. Unrouted requests get a 404.
    #[derive(Default)]
    pub struct MockTransport {
        routes: Mutex<HashMap<(Method, String), VecDeque<HttpResponse>>>,
        requests: Mutex<Vec<HttpRequest>>,
        delay: Mutex<Option<Duration>>,
        delays: Mutex<VecDeque<Duration>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
            self.respond_sequence(method, path, vec![(status, body)]);
        }

        pub fn respond_sequence(&self, method: Method, path: &str, responses: Vec<(u16, Value)>) {
            let queue = responses
                .into_iter()
                .map(|(status, body)| HttpResponse {
                    status,
                    body: match body {
                        Value::String(s) => s,
                        other => other.to_string(),
                    },
                })
                .collect();
            self.routes
                .lock()
                .unwrap()
                .insert((method, path.to_string()), queue);
        }

        /// Every request waits this long before answering.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        /// Per-request delays, used in arrival order before falling back to
        /// the shared delay.
        pub fn delay_sequence(&self, delays: Vec<Duration>) {
            *self.delays.lock().unwrap() = delays.into();
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn calls(&self, method: Method, path: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .count()
        }

        /// Sequence of `(method, path)` in arrival order.
        pub fn trace(&self) -> Vec<(Method, String)> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| (r.method, r.path.clone()))
                .collect()
        }

        pub fn clear_requests(&self) {
            self.requests.lock().unwrap().clear();
        }
    }

    impl Transport for MockTransport {
        fn execute(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, AppError>> {
            let key = (request.method, request.path.clone());
            self.requests.lock().unwrap().push(request);

            let response = {
                let mut routes = self.routes.lock().unwrap();
                match routes.get_mut(&key) {
                    Some(queue) if queue.len() > 1 => queue.pop_front(),
                    Some(queue) => queue.front().cloned(),
                    None => None,
                }
            }
            .unwrap_or(HttpResponse {
                status: 404,
                body: format!("no route for {} {}", key.0, key.1),
            });
            let delay = self
                .delays
                .lock()
                .unwrap()
                .pop_front()
                .or(*self.delay.lock().unwrap());

            async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            .boxed()
        }
    }
}
