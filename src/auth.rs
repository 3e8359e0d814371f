/*!
 * Credential acquisition
 *
 * Self-hosted deployments exchange user/password for a session token via
 * the v2 login endpoint. Cloud deployments authenticate every request with
 * a personal access token supplied as the password.
 */

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::endpoint::login_url;
use crate::config::{DeploymentMode, RunConfig};
use crate::error::{LineageError, Result};

/// Opaque value sent in the Authorization header of every catalog request
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(header_value: impl Into<String>) -> Self {
        Self(header_value.into())
    }

    pub fn header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    user_name: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Obtain the credential for this run
pub fn acquire_credential(config: &RunConfig, http: &Client) -> Result<Credential> {
    match config.deployment {
        DeploymentMode::Cloud => {
            if config.password.is_empty() {
                return Err(LineageError::Auth(
                    "Cloud mode needs a personal access token in `password`".to_string(),
                ));
            }
            tracing::info!("Using personal access token for cloud catalog");
            Ok(Credential::new(format!("Bearer {}", config.password)))
        }
        DeploymentMode::SelfHosted => login(config, http),
    }
}

fn login(config: &RunConfig, http: &Client) -> Result<Credential> {
    let url = login_url(config)?;
    tracing::info!(user = %config.username, "Authenticating with catalog service");
    tracing::debug!(url = %url, "Login request");

    let body = LoginRequest {
        user_name: &config.username,
        password: &config.password,
    };

    let response = http.post(url).json(&body).send()?;
    let status = response.status();
    if !status.is_success() {
        let err = LineageError::from_status("Login", status.as_u16());
        if err.is_transient() {
            tracing::warn!(status = status.as_u16(), "Login endpoint unavailable");
        } else {
            tracing::error!(status = status.as_u16(), "Authentication failed");
        }
        return Err(err);
    }

    let login: LoginResponse = response
        .json()
        .map_err(|e| LineageError::Auth(format!("Login response had no token: {}", e)))?;

    Ok(Credential::new(format!(
        "{}{}",
        config.token_prefix, login.token
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_credential_is_bearer() {
        let config = RunConfig {
            deployment: DeploymentMode::Cloud,
            password: "pat-123".to_string(),
            ..Default::default()
        };
        let credential = acquire_credential(&config, &Client::new()).unwrap();
        assert_eq!(credential.header_value(), "Bearer pat-123");
    }

    #[test]
    fn test_cloud_without_token_fails() {
        let config = RunConfig {
            deployment: DeploymentMode::Cloud,
            ..Default::default()
        };
        assert!(matches!(
            acquire_credential(&config, &Client::new()),
            Err(LineageError::Auth(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("_dremiosecret");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }

    #[test]
    fn test_login_payload_shape() {
        let body = LoginRequest {
            user_name: "admin",
            password: "pw",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"userName": "admin", "password": "pw"})
        );
    }
}
