use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::auth::{AuthUser, IdentityProvider};
use crate::errors::AppError;

/// Supabase Auth (GoTrue) client used to validate access tokens.
#[derive(Clone)]
pub struct SupabaseIdentity {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
}

impl SupabaseIdentity {
    pub fn new(base_url: String, anon_key: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Identity(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url,
            anon_key,
        })
    }

    fn user_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn resolve(&self, access_token: &str) -> Result<Option<AuthUser>, AppError> {
        let response = self
            .client
            .get(self.user_endpoint())
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let user: GoTrueUser = response
                    .json()
                    .await
                    .map_err(|e| AppError::Identity(format!("Invalid user payload: {e}")))?;
                Ok(Some(AuthUser {
                    id: user.id,
                    email: user.email,
                }))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => {
                warn!("Identity provider returned {status}");
                Err(AppError::Identity(format!("Unexpected status {status}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_endpoint() {
        let identity =
            SupabaseIdentity::new("https://stable.supabase.co".into(), "anon".into()).unwrap();
        assert_eq!(
            identity.user_endpoint(),
            "https://stable.supabase.co/auth/v1/user"
        );
    }

    #[test]
    fn test_user_payload_ignores_extra_fields() {
        let user: GoTrueUser = serde_json::from_str(
            r#"{"id":"6c1f3c2e-8a53-4a4e-9d89-7a3c0e1b2f44","email":"ecurie@example.fr","aud":"authenticated","role":"authenticated"}"#,
        )
        .unwrap();
        assert_eq!(user.email.as_deref(), Some("ecurie@example.fr"));
    }
}
