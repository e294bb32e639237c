use std::fs;
use std::path::PathBuf;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Identity persisted by the portal shell after sign-in. The booking flow
/// reads it; it never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub patient_id: Uuid,
    pub auth_token: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("No stored session at {0}")]
    Missing(String),

    #[error("Stored session is unreadable: {0}")]
    Unreadable(String),

    #[error("Invalid token format")]
    MalformedToken,

    #[error("Session token expired")]
    Expired,

    #[error("Session token does not match the stored patient id")]
    IdentityMismatch,
}

/// Claims carried in the stored access token. The backend verifies the
/// signature on every request; client-side we only decode the payload to
/// cross-check the patient id and catch an expired session before issuing
/// any booking call.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

pub fn decode_claims(token: &str) -> Result<TokenClaims, SessionError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(SessionError::MalformedToken);
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(parts[1]) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err(SessionError::MalformedToken),
        },
        Err(e) => {
            debug!("Failed to decode token payload: {}", e);
            return Err(SessionError::MalformedToken);
        }
    };

    let claims: TokenClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse token claims: {}", e);
            return Err(SessionError::MalformedToken);
        }
    };

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err(SessionError::Expired);
        }
    }

    Ok(claims)
}

/// Reads the portal's persistent session file (written by the sign-in
/// screen, outside this engine's scope).
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Session, SessionError> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|_| SessionError::Missing(self.path.display().to_string()))?;

        let session: Session = serde_json::from_str(&raw)
            .map_err(|e| SessionError::Unreadable(e.to_string()))?;

        let claims = decode_claims(&session.auth_token)?;
        if claims.sub != session.patient_id.to_string() {
            return Err(SessionError::IdentityMismatch);
        }

        debug!("Loaded session for patient {}", session.patient_id);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestSession;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn write_session_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_session() {
        let test_session = TestSession::default();
        let file = write_session_file(&test_session.to_json().to_string());

        let store = FileSessionStore::new(file.path());
        let session = store.load().unwrap();

        assert_eq!(session.patient_id, test_session.patient_id);
    }

    #[test]
    fn missing_file_is_reported() {
        let store = FileSessionStore::new("/nonexistent/session.json");
        assert_matches!(store.load(), Err(SessionError::Missing(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let test_session = TestSession::expired();
        let file = write_session_file(&test_session.to_json().to_string());

        let store = FileSessionStore::new(file.path());
        assert_matches!(store.load(), Err(SessionError::Expired));
    }

    #[test]
    fn mismatched_subject_is_rejected() {
        let mut test_session = TestSession::default();
        test_session.patient_id = Uuid::new_v4();
        let file = write_session_file(&test_session.to_json().to_string());

        let store = FileSessionStore::new(file.path());
        assert_matches!(store.load(), Err(SessionError::IdentityMismatch));
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert_matches!(decode_claims("not-a-token"), Err(SessionError::MalformedToken));
    }
}
