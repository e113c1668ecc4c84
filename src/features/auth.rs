//! Signed-in user, profile edits and badge-derived permissions.

use serde::Serialize;
use tracing::{info, warn};

use crate::backend::{Delay, MockClient, Query, Table};
use crate::config::MockConfig;
use crate::error::{BackendError, BackendResult};
use crate::models::{Badge, User};

/// Profile fields a user may edit themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

pub struct AuthState {
    client: MockClient,
    profile: Option<User>,
    auto_login_demo: bool,
    demo_email: String,
}

impl AuthState {
    pub fn new(client: MockClient, config: &MockConfig) -> Self {
        Self {
            client,
            profile: None,
            auto_login_demo: config.auto_login_demo,
            demo_email: config.demo_email.clone(),
        }
    }

    pub fn profile(&self) -> Option<&User> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    fn badge(&self) -> Option<Badge> {
        self.profile.as_ref().map(|p| p.badge)
    }

    pub fn is_admin(&self) -> bool {
        self.badge().is_some_and(Badge::is_admin)
    }

    pub fn is_moderator(&self) -> bool {
        self.badge().is_some_and(Badge::is_moderator)
    }

    pub fn is_vip(&self) -> bool {
        self.badge().is_some_and(Badge::is_vip)
    }

    pub fn is_colaborador(&self) -> bool {
        self.badge().is_some_and(Badge::is_colaborador)
    }

    pub fn is_destacado(&self) -> bool {
        self.badge().is_some_and(Badge::is_destacado)
    }

    /// Also true when signed out.
    pub fn has_no_badge(&self) -> bool {
        self.badge().map_or(true, |b| b == Badge::None)
    }

    /// Register a new account without signing it in.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> BackendResult<User> {
        self.client.latency().pause(Delay::SignIn).await;
        let data = self
            .client
            .auth()
            .sign_up(email, password, Some(full_name))
            .await
            .into_result()?;
        data.user
            .ok_or_else(|| BackendError::Other(anyhow::anyhow!("sign-up returned no user")))
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> BackendResult<User> {
        self.client.latency().pause(Delay::SignIn).await;
        self.adopt_sign_in(email, password).await
    }

    async fn adopt_sign_in(&mut self, email: &str, password: &str) -> BackendResult<User> {
        let data = self
            .client
            .auth()
            .sign_in_with_password(email, password)
            .await
            .into_result()?;
        let user = data
            .user
            .ok_or_else(|| BackendError::Other(anyhow::anyhow!("sign-in returned no user")))?;
        self.profile = Some(user.clone());
        Ok(user)
    }

    pub async fn sign_out(&mut self) -> BackendResult<()> {
        self.client.latency().pause(Delay::SignOut).await;
        self.client.auth().sign_out().await.into_result()?;
        self.profile = None;
        Ok(())
    }

    /// Re-read the signed-in profile from the store.
    pub async fn get_profile(&mut self) -> BackendResult<Option<User>> {
        let Some(current) = &self.profile else {
            return Ok(None);
        };
        let profile: User = self
            .client
            .single(&Query::by_id(Table::Profiles, &current.id))
            .await
            .into_result()?;
        self.profile = Some(profile.clone());
        Ok(Some(profile))
    }

    pub async fn update_profile(&mut self, patch: ProfilePatch) -> BackendResult<User> {
        if self.profile.is_none() {
            return Err(BackendError::NotAuthenticated);
        }
        let data = self.client.auth().update_user(&patch).await.into_result()?;
        let user = data
            .user
            .ok_or_else(|| BackendError::Other(anyhow::anyhow!("update returned no user")))?;
        self.profile = Some(user.clone());
        Ok(user)
    }

    /// Resume an existing session; otherwise sign the demo account in when
    /// auto-login is enabled.
    pub async fn initialize(&mut self) -> BackendResult<Option<User>> {
        if let Some(user) = self.client.auth().current_user() {
            info!("Resuming session for {}", user.email);
            self.profile = Some(user.clone());
            return Ok(Some(user));
        }
        if !self.auto_login_demo {
            self.profile = None;
            return Ok(None);
        }

        let email = self.demo_email.clone();
        match self.adopt_sign_in(&email, "").await {
            Ok(user) => {
                info!("Demo mode: signed in as {}", user.email);
                Ok(Some(user))
            }
            Err(e) => {
                warn!("Demo auto-login failed: {}", e);
                Err(e)
            }
        }
    }

    /// Drop local and backend session state after the backend rejected it.
    pub async fn handle_invalid_session(&mut self) {
        self.client.auth().sign_out().await;
        self.profile = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ManualClock;
    use crate::models::seed::DEMO_EMAIL;
    use serde_json::json;
    use std::sync::Arc;

    fn state(config: MockConfig) -> AuthState {
        let client = MockClient::with_clock(&config, Arc::new(ManualClock::default()));
        AuthState::new(client, &config)
    }

    #[tokio::test]
    async fn test_initialize_auto_logs_in_demo() {
        let mut auth = state(MockConfig::for_tests());
        let user = auth.initialize().await.unwrap().unwrap();
        assert_eq!(user.email, DEMO_EMAIL);
        assert!(auth.is_authenticated());
        assert!(auth.is_vip());
        assert!(!auth.is_moderator());
        assert!(!auth.has_no_badge());
    }

    #[tokio::test]
    async fn test_initialize_without_auto_login_stays_signed_out() {
        let mut auth = state(MockConfig {
            auto_login_demo: false,
            ..MockConfig::for_tests()
        });
        assert!(auth.initialize().await.unwrap().is_none());
        assert!(!auth.is_authenticated());
        assert!(auth.has_no_badge());
    }

    #[tokio::test]
    async fn test_initialize_resumes_existing_session() {
        let config = MockConfig::for_tests();
        let client = MockClient::with_clock(&config, Arc::new(ManualClock::default()));
        client.auth().sign_up("otra@ejemplo.com", "x", Some("Otra")).await;
        client.auth().sign_in_with_password("otra@ejemplo.com", "x").await;

        let mut auth = AuthState::new(client, &config);
        let user = auth.initialize().await.unwrap().unwrap();
        assert_eq!(user.full_name, "Otra");
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email_fails() {
        let mut auth = state(MockConfig::for_tests());
        let err = auth.sign_in("nadie@ejemplo.com", "x").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidCredentials));
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_out_clears_profile() {
        let mut auth = state(MockConfig::for_tests());
        auth.sign_in(DEMO_EMAIL, "x").await.unwrap();
        auth.sign_out().await.unwrap();
        assert!(auth.profile().is_none());
        assert!(auth.get_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_keeps_badge() {
        let mut auth = state(MockConfig::for_tests());
        auth.initialize().await.unwrap();
        let user = auth
            .update_profile(ProfilePatch {
                location: Some("Cali".to_string()),
                ..ProfilePatch::default()
            })
            .await
            .unwrap();
        assert_eq!(user.location.as_deref(), Some("Cali"));
        assert_eq!(user.badge, Badge::Vip);
        assert_eq!(auth.get_profile().await.unwrap().unwrap().location.as_deref(), Some("Cali"));
    }

    #[tokio::test]
    async fn test_moderator_flags_follow_badge() {
        let mut auth = state(MockConfig::for_tests());
        auth.initialize().await.unwrap();
        auth.client
            .update::<User, _>(&Query::by_id(Table::Profiles, "1"), &json!({ "badge": "admin" }))
            .await
            .into_result()
            .unwrap();
        auth.get_profile().await.unwrap();
        assert!(auth.is_admin());
        assert!(auth.is_moderator());
        assert!(!auth.is_vip());
    }

    #[tokio::test]
    async fn test_handle_invalid_session() {
        let mut auth = state(MockConfig::for_tests());
        auth.initialize().await.unwrap();
        auth.handle_invalid_session().await;
        assert!(!auth.is_authenticated());
        assert!(auth.client.auth().current_user().is_none());
    }
}
