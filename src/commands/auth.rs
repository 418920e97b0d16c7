//! Authentication commands.

use crate::error::AppError;
use crate::models::Credential;
use crate::state::Console;

/// Validate and persist a credential.
///
/// # Errors
/// - Authentication error if either field is empty or the backend rejects the pair
pub async fn login(console: &Console, username: &str, password: &str) -> Result<String, AppError> {
    console
        .session()
        .authenticate(Credential::new(username, password))
        .await?;
    Ok(format!("Logged in as {}", username))
}

/// Forget the held and persisted credential.
pub async fn logout(console: &Console) -> Result<String, AppError> {
    let username = console.session().username().await;
    console.session().logout().await?;
    Ok(match username {
        Some(name) => format!("Logged out {}", name),
        None => "Not logged in".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::mock::MockTransport;
    use crate::services::transport::Method;
    use crate::state::tests::console;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_login_then_logout() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Post, "/authenticate", 200, json!({}));
        let (console, _dir) = console(mock.clone());

        assert_eq!(login(&console, "ta", "s3cret").await.unwrap(), "Logged in as ta");
        assert_eq!(logout(&console).await.unwrap(), "Logged out ta");
        assert!(!console.session().is_authenticated().await);
        assert!(!console.config().store_path.exists());
    }

    #[tokio::test]
    async fn test_login_with_blank_password() {
        let mock = Arc::new(MockTransport::new());
        let (console, _dir) = console(mock.clone());

        let err = login(&console, "ta", "").await.unwrap_err();

        assert_eq!(err.to_string(), "Authentication error: Please enter your username and password");
        assert!(mock.trace().is_empty());
    }
}
