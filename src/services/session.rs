//! Session holder.
//!
//! Owns the single operator credential for the process lifetime and wraps
//! every backend call in the Basic-auth envelope. A credential persisted by
//! an earlier run is restored without re-validation; the first gated call
//! fails loudly if the server has since stopped accepting it.

use crate::error::AppError;
use crate::models::Credential;
use crate::services::credentials::CredentialStore;
use crate::services::events::{ConsoleEvent, EventBus};
use crate::services::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Endpoint used to probe a candidate credential.
const AUTHENTICATE_ENDPOINT: &str = "/authenticate";

#[derive(Debug, Default)]
struct SessionState {
    credential: Credential,
    authenticated: bool,
}

/// Authenticated request envelope shared by every component.
pub struct Session {
    transport: Arc<dyn Transport>,
    store: CredentialStore,
    events: EventBus,
    state: RwLock<SessionState>,
}

impl Session {
    /// Create an unauthenticated session.
    pub fn new(transport: Arc<dyn Transport>, store: CredentialStore, events: EventBus) -> Self {
        Self {
            transport,
            store,
            events,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Create a session, restoring a persisted credential if one exists.
    pub fn restore(
        transport: Arc<dyn Transport>,
        store: CredentialStore,
        events: EventBus,
    ) -> Result<Self, AppError> {
        let state = match store.load()? {
            Some(credential) => {
                log::info!("[session] Restored session for {}", credential.username);
                SessionState {
                    credential,
                    authenticated: true,
                }
            }
            None => SessionState::default(),
        };

        Ok(Self {
            transport,
            store,
            events,
            state: RwLock::new(state),
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.authenticated
    }

    /// Username of the authenticated operator.
    pub async fn username(&self) -> Option<String> {
        let state = self.state.read().await;
        state.authenticated.then(|| state.credential.username.clone())
    }

    /// Validate a credential against the backend and hold it.
    ///
    /// On success the session is marked authenticated and the credential is
    /// persisted. On rejection the session is left unauthenticated and the
    /// server's message is returned.
    pub async fn authenticate(&self, credential: Credential) -> Result<(), AppError> {
        if !credential.is_complete() {
            return Err(AppError::authentication(
                "Please enter your username and password",
            ));
        }

        match self
            .send_with(&credential, Method::Post, AUTHENTICATE_ENDPOINT, None)
            .await
        {
            Ok(_) => {
                if let Err(e) = self.store.save(&credential) {
                    log::warn!("[session] Authenticated but could not persist: {}", e);
                }
                log::info!("[session] Authenticated as {}", credential.username);
                *self.state.write().await = SessionState {
                    credential,
                    authenticated: true,
                };
                Ok(())
            }
            Err(e) => {
                *self.state.write().await = SessionState::default();
                Err(e)
            }
        }
    }

    /// Forget the credential in memory and on disk.
    pub async fn logout(&self) -> Result<(), AppError> {
        *self.state.write().await = SessionState::default();
        self.store.clear()
    }

    /// Issue a request enveloped with the held credential.
    ///
    /// Any non-success status is an error carrying the response body;
    /// 401 and 403 are authentication errors.
    pub async fn gated_request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<HttpResponse, AppError> {
        let credential = {
            let state = self.state.read().await;
            if !state.authenticated {
                return Err(AppError::authentication("Not authenticated"));
            }
            state.credential.clone()
        };

        self.send_with(&credential, method, path, body).await
    }

    /// GET a JSON document.
    pub async fn get_json(&self, path: &str) -> Result<Value, AppError> {
        self.gated_request(Method::Get, path, None).await?.json()
    }

    /// POST without a body.
    pub async fn post_empty(&self, path: &str) -> Result<HttpResponse, AppError> {
        self.gated_request(Method::Post, path, None).await
    }

    /// POST a JSON body.
    pub async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<HttpResponse, AppError> {
        let value = serde_json::to_value(body)?;
        self.gated_request(Method::Post, path, Some(RequestBody::Json(value)))
            .await
    }

    async fn send_with(
        &self,
        credential: &Credential,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<HttpResponse, AppError> {
        let request = envelope(credential, method, path, body);
        log::debug!("[session] {} {} as {}", method, path, credential.username);

        let response = self.transport.execute(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let detail = error_detail(&response);
        if response.status == 401 || response.status == 403 {
            log::warn!("[session] {} {} rejected: {}", method, path, detail);
            self.events.emit(ConsoleEvent::AuthRejected {
                message: detail.clone(),
            });
            return Err(AppError::authentication(detail));
        }

        log::error!("[session] {} {} failed ({}): {}", method, path, response.status, detail);
        Err(AppError::request_full(detail, response.status, path))
    }
}

/// `Authorization` header value for a credential.
pub fn basic_auth_value(credential: &Credential) -> String {
    let raw = format!("{}:{}", credential.username, credential.password);
    format!("Basic {}", STANDARD.encode(raw))
}

/// Build the request with auth and, when a JSON body is present, its content type.
///
/// Multipart bodies get their boundary content type from the transport.
fn envelope(
    credential: &Credential,
    method: Method,
    path: &str,
    body: Option<RequestBody>,
) -> HttpRequest {
    let mut headers = vec![("Authorization".to_string(), basic_auth_value(credential))];
    if let Some(RequestBody::Json(_)) = &body {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }

    HttpRequest {
        method,
        path: path.to_string(),
        headers,
        body,
    }
}

/// Human-readable detail from an error response.
///
/// JSON bodies of the form `{"detail": ..}`, `{"message": ..}` or
/// `{"error": ..}` are unwrapped; anything else is used verbatim.
fn error_detail(response: &HttpResponse) -> String {
    let unwrapped = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|v| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).cloned())
        })
        .map(|m| match m {
            Value::String(s) => s,
            other => other.to_string(),
        });

    match unwrapped {
        Some(message) => message,
        None if response.body.trim().is_empty() => format!("HTTP {}", response.status),
        None => response.body.clone(),
    }
}
