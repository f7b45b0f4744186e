use reqwest::blocking::Client as HttpClient;
use reqwest::header::HeaderValue;

use crate::error::{MonsoonError, format_api_message};
use crate::util::urljoin;

#[derive(Debug, serde::Deserialize)]
struct LoginResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

/// An authenticated session.
///
/// Holds the bearer token obtained at login. The credential used to obtain it
/// is not retained, and the token is only reachable as a sensitive header value.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    authorization: HeaderValue,
}

impl Session {
    /// Exchanges `username`/`credential` for a bearer token with a single
    /// `POST <base>/login`. Any status >= 400 is an authentication failure;
    /// there is no retry.
    pub fn authenticate(
        http: &HttpClient,
        base_url: &str,
        username: &str,
        credential: &str,
    ) -> Result<Self, MonsoonError> {
        let url = urljoin(base_url, "/login");
        tracing::debug!(%url, username, "logging in");

        let resp = http
            .post(&url)
            .form(&[("username", username), ("key", credential)])
            .send()
            .map_err(|source| MonsoonError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text().map_err(|source| MonsoonError::Transport {
            url: url.clone(),
            source,
        })?;
        if status.as_u16() >= 400 {
            tracing::warn!(%status, username, "login rejected");
            return Err(MonsoonError::Authentication {
                username: username.to_string(),
                status,
                message: format_api_message(&text),
            });
        }

        let login: LoginResponse =
            serde_json::from_str(&text).map_err(|source| MonsoonError::Decode {
                url,
                status,
                source,
            })?;

        let session = Self::from_token(username, &login.access_token)?;
        tracing::info!(username, "authenticated");
        Ok(session)
    }

    pub(crate) fn from_token(username: &str, token: &str) -> Result<Self, MonsoonError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(MonsoonError::InvalidToken)?;
        authorization.set_sensitive(true);
        Ok(Self {
            username: username.to_string(),
            authorization,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header of every data request.
    pub fn authorization(&self) -> &HeaderValue {
        &self.authorization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_carries_bearer_token() {
        let session = Session::from_token("alice", "tok123").unwrap();
        assert_eq!(session.authorization().to_str().unwrap(), "Bearer tok123");
        assert!(session.authorization().is_sensitive());
        assert_eq!(session.username(), "alice");
    }

    #[test]
    fn debug_output_hides_token() {
        let session = Session::from_token("alice", "tok123").unwrap();
        let dbg = format!("{:?}", session);
        assert!(!dbg.contains("tok123"));
        assert!(dbg.contains("alice"));
    }

    #[test]
    fn token_with_control_characters_is_rejected() {
        let err = Session::from_token("alice", "tok\n123").unwrap_err();
        assert!(matches!(err, MonsoonError::InvalidToken(_)));
    }
}
