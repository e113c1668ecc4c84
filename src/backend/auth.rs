//! Session handling against the `profiles` table.
//!
//! Sign-in only checks that the email belongs to a profile; passwords are
//! accepted as-is. There is a single session slot per client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use super::query::Query;
use super::store::{to_patch, Table};
use super::MockClient;
use crate::error::{BackendError, BackendResult, Response};
use crate::models::User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub issued_at: DateTime<Utc>,
}

/// `data` half of an auth response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthData {
    pub user: Option<User>,
    pub session: Option<Session>,
}

pub struct Auth<'a> {
    client: &'a MockClient,
}

impl<'a> Auth<'a> {
    pub(super) fn new(client: &'a MockClient) -> Self {
        Self { client }
    }

    /// Register a profile. Does not sign it in.
    pub async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        full_name: Option<&str>,
    ) -> Response<AuthData> {
        Response::from_result(self.try_sign_up(email, full_name).await)
    }

    async fn try_sign_up(&self, email: &str, full_name: Option<&str>) -> BackendResult<AuthData> {
        let email = email.trim();
        if email.is_empty() {
            return Err(BackendError::Validation(
                "El correo es obligatorio".to_string(),
            ));
        }
        let full_name = full_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(email);

        let now = self.client.now();
        let user = self.client.store.write().await.append(
            Table::Profiles,
            User::new(email, full_name),
            now,
        )?;
        info!("Registered profile {} for {}", user.id, user.email);
        Ok(AuthData {
            user: Some(user),
            session: None,
        })
    }

    pub async fn sign_in_with_password(&self, email: &str, _password: &str) -> Response<AuthData> {
        Response::from_result(self.try_sign_in(email).await)
    }

    async fn try_sign_in(&self, email: &str) -> BackendResult<AuthData> {
        let query = Query::table(Table::Profiles).eq("email", email.trim());
        let user: User = match self.client.store.read().await.single(&query) {
            Ok(user) => user,
            Err(BackendError::NotFound(_)) => {
                warn!("Sign-in rejected for {}", email);
                return Err(BackendError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let session = Session {
            user: user.clone(),
            issued_at: self.client.now(),
        };
        self.client.session.send_replace(Some(session.clone()));
        info!("Signed in {}", user.email);
        Ok(AuthData {
            user: Some(user),
            session: Some(session),
        })
    }

    pub async fn sign_out(&self) -> Response<()> {
        if let Some(previous) = self.client.session.send_replace(None) {
            info!("Signed out {}", previous.user.email);
        }
        Response::ok(())
    }

    pub async fn get_session(&self) -> Response<Option<Session>> {
        Response::ok(self.client.session.borrow().clone())
    }

    pub fn current_user(&self) -> Option<User> {
        self.client
            .session
            .borrow()
            .as_ref()
            .map(|s| s.user.clone())
    }

    /// Merge `patch` into the signed-in profile and its session copy.
    pub async fn update_user<P: Serialize>(&self, patch: &P) -> Response<AuthData> {
        Response::from_result(self.try_update_user(patch).await)
    }

    async fn try_update_user<P: Serialize>(&self, patch: &P) -> BackendResult<AuthData> {
        let user_id = self.client.session_user_id()?;
        let fields = to_patch(patch)?;
        let now = self.client.now();
        let user: User = self.client.store.write().await.update(
            &Query::by_id(Table::Profiles, &user_id),
            &fields,
            now,
        )?;

        let mut session = None;
        self.client.session.send_modify(|slot| {
            if let Some(current) = slot.as_mut() {
                current.user = user.clone();
                session = Some(current.clone());
            }
        });
        Ok(AuthData {
            user: Some(user),
            session,
        })
    }

    pub async fn reset_password_for_email(&self, email: &str) -> Response<()> {
        info!("Password reset requested for {}", email);
        Response::ok(())
    }

    pub async fn verify_otp(&self, email: &str, _token: &str) -> Response<()> {
        info!("OTP accepted for {}", email);
        Response::ok(())
    }

    /// Receiver that observes every session change.
    pub fn on_auth_state_change(&self) -> watch::Receiver<Option<Session>> {
        self.client.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ManualClock;
    use crate::config::MockConfig;
    use crate::error::ErrorCode;
    use crate::models::seed::DEMO_EMAIL;
    use crate::models::Badge;
    use serde_json::json;
    use std::sync::Arc;

    fn client() -> MockClient {
        MockClient::with_clock(&MockConfig::for_tests(), Arc::new(ManualClock::default()))
    }

    #[tokio::test]
    async fn test_sign_in_with_known_email() {
        let client = client();
        let response = client.auth().sign_in_with_password(DEMO_EMAIL, "x").await;
        let data = response.into_result().unwrap();
        assert_eq!(data.user.unwrap().id, "1");
        assert_eq!(client.session_user_id().unwrap(), "1");
    }

    #[tokio::test]
    async fn test_unknown_email_is_invalid_credentials() {
        let client = client();
        let response = client.auth().sign_in_with_password("nadie@x.com", "x").await;
        assert_eq!(
            response.error.map(|e| e.code),
            Some(ErrorCode::InvalidCredentials)
        );
        assert!(client.auth().current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let client = client();
        let data = client
            .auth()
            .sign_up("nueva@ejemplo.com", "secret", Some("Nueva"))
            .await
            .into_result()
            .unwrap();
        let user = data.user.unwrap();
        assert!(!user.verified);
        assert_eq!(user.badge, Badge::None);
        assert!(data.session.is_none());

        let signed_in = client
            .auth()
            .sign_in_with_password("nueva@ejemplo.com", "other")
            .await;
        assert!(signed_in.is_ok());
    }

    #[tokio::test]
    async fn test_sign_up_defaults_name_to_email() {
        let client = client();
        let data = client
            .auth()
            .sign_up("solo@ejemplo.com", "pw", None)
            .await
            .into_result()
            .unwrap();
        assert_eq!(data.user.unwrap().full_name, "solo@ejemplo.com");
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_and_notifies() {
        let client = client();
        let mut changes = client.auth().on_auth_state_change();
        client.auth().sign_in_with_password(DEMO_EMAIL, "x").await;
        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_some());

        client.auth().sign_out().await;
        assert!(changes.borrow_and_update().is_none());
        assert!(client.auth().get_session().await.data.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user_writes_profile_and_session() {
        let client = client();
        client.auth().sign_in_with_password(DEMO_EMAIL, "x").await;
        client
            .auth()
            .update_user(&json!({ "bio": "Vendo de todo" }))
            .await
            .into_result()
            .unwrap();

        assert_eq!(
            client.auth().current_user().unwrap().bio.as_deref(),
            Some("Vendo de todo")
        );
        let stored: User = client
            .single(&Query::by_id(Table::Profiles, "1"))
            .await
            .into_result()
            .unwrap();
        assert_eq!(stored.bio.as_deref(), Some("Vendo de todo"));
    }

    #[tokio::test]
    async fn test_update_user_requires_session() {
        let response = client().auth().update_user(&json!({ "bio": "x" })).await;
        assert_eq!(
            response.error.map(|e| e.code),
            Some(ErrorCode::NotAuthenticated)
        );
    }
}
