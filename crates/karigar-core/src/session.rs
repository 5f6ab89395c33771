//! Session storage and retrieval.
//!
//! Persists the authenticated session in `<base>/session.json` with restricted
//! permissions (0600). The file always holds both tokens plus the user record;
//! a partial or unparseable file counts as no session and is removed on load.
//! Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Session cache filename.
const SESSION_FILE: &str = "session.json";

fn default_user_type() -> String {
    "customer".to_string()
}

/// User record as returned by the server.
///
/// Safe-parsed only: unknown fields are ignored and nothing beyond
/// deserialization is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// "customer" or "provider"
    #[serde(default = "default_user_type")]
    pub user_type: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl UserRecord {
    pub fn is_provider(&self) -> bool {
        self.user_type == "provider"
    }

    /// First + last name, falling back to the username.
    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        let joined = format!("{first} {last}");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            self.username.clone()
        } else {
            trimmed.to_string()
        }
    }
}

/// A stored session: both tokens plus the user they belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token (short-lived)
    pub access_token: String,
    /// The refresh token (long-lived)
    pub refresh_token: String,
    /// The authenticated user
    pub user: UserRecord,
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}

/// File-backed session store.
///
/// All mutations rewrite the whole file, so the session is all-or-nothing on
/// disk: tokens and user record are stored together and cleared together.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Store rooted at the karigar home directory.
    pub fn new() -> Self {
        Self::at(paths::karigar_home())
    }

    /// Store rooted at an explicit directory.
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Loads the stored session.
    ///
    /// Returns `None` when nothing is stored. A file that cannot be read or
    /// parsed, or whose required fields are empty, is removed and treated as
    /// no session (self-healing against corruption).
    pub fn load(&self) -> Option<Session> {
        let path = self.session_path();
        if !path.exists() {
            return None;
        }

        let Ok(contents) = fs::read_to_string(&path) else {
            self.heal();
            return None;
        };

        match serde_json::from_str::<Session>(&contents) {
            Ok(session)
                if !session.access_token.is_empty() && !session.user.username.is_empty() =>
            {
                Some(session)
            }
            _ => {
                tracing::warn!("stored session is malformed, clearing");
                self.heal();
                None
            }
        }
    }

    /// Saves the session to disk with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn save(&self, session: &Session) -> Result<()> {
        let path = self.session_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        // Write to a temp file first, then rename over the old session.
        let tmp_path = path.with_extension("json.tmp");

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp_path)
                .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&tmp_path, contents)
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        fs::rename(&tmp_path, &path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Removes the stored session unconditionally.
    /// Returns whether a session file was present.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn clear(&self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        Ok(true)
    }

    /// Swaps the access token after a refresh, leaving the refresh token and
    /// user record untouched.
    ///
    /// # Errors
    /// Returns an error if no session is stored or the write fails.
    pub fn update_access(&self, access_token: &str) -> Result<()> {
        let Some(mut session) = self.load() else {
            anyhow::bail!("No session to update");
        };
        session.access_token = access_token.to_string();
        self.save(&session)
    }

    fn heal(&self) {
        let _ = fs::remove_file(self.session_path());
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn user(username: &str) -> UserRecord {
        UserRecord {
            id: 1,
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            first_name: Some("Alice".to_string()),
            last_name: Some("Kumar".to_string()),
            user_type: "customer".to_string(),
            phone_number: None,
            address: None,
            is_verified: true,
        }
    }

    fn session(access: &str, refresh: &str) -> Session {
        Session {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
            user: user("alice"),
        }
    }

    /// Test: save followed by load returns an equivalent session.
    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().to_path_buf());

        store.save(&session("A1", "R1")).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.access_token, "A1");
        assert_eq!(loaded.refresh_token, "R1");
        assert_eq!(loaded.user.username, "alice");
    }

    /// Test: clear followed by load returns no session, regardless of prior state.
    #[test]
    fn test_clear_then_load_is_none() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().to_path_buf());

        store.save(&session("A1", "R1")).unwrap();
        assert!(store.clear().unwrap());
        assert!(store.load().is_none());

        // Clearing again succeeds and reports nothing was present.
        assert!(!store.clear().unwrap());
        assert!(store.load().is_none());
    }

    /// Test: a malformed session file is removed and treated as no session.
    #[test]
    fn test_load_malformed_file_self_heals() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().to_path_buf());
        let path = dir.path().join("session.json");

        std::fs::write(&path, "{not json").unwrap();

        assert!(store.load().is_none());
        assert!(!path.exists(), "malformed session file should be removed");
    }

    /// Test: a session whose user record does not parse counts as no session.
    #[test]
    fn test_load_malformed_user_self_heals() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().to_path_buf());
        let path = dir.path().join("session.json");

        std::fs::write(
            &path,
            r#"{"access_token": "A1", "refresh_token": "R1", "user": "garbage"}"#,
        )
        .unwrap();

        assert!(store.load().is_none());
        assert!(!path.exists());
    }

    /// Test: an empty access token violates the all-or-nothing invariant.
    #[test]
    fn test_load_empty_access_token_self_heals() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().to_path_buf());
        let path = dir.path().join("session.json");

        let partial = session("", "R1");
        std::fs::write(&path, serde_json::to_string(&partial).unwrap()).unwrap();

        assert!(store.load().is_none());
        assert!(!path.exists());
    }

    /// Test: update_access swaps only the access token.
    #[test]
    fn test_update_access_preserves_refresh_and_user() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().to_path_buf());

        store.save(&session("A1", "R1")).unwrap();
        store.update_access("A2").unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.access_token, "A2");
        assert_eq!(loaded.refresh_token, "R1");
        assert_eq!(loaded.user.username, "alice");
    }

    /// Test: update_access without a session is an error.
    #[test]
    fn test_update_access_without_session_errors() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().to_path_buf());

        assert!(store.update_access("A2").is_err());
    }

    /// Test: unknown user fields are ignored (safe-parse).
    #[test]
    fn test_user_record_ignores_unknown_fields() {
        let raw = r#"{
            "id": 7,
            "username": "bob",
            "user_type": "provider",
            "some_future_field": {"nested": true}
        }"#;
        let user: UserRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(user.username, "bob");
        assert!(user.is_provider());
        assert!(!user.is_verified);
    }

    /// Test: session file has restricted permissions on Unix.
    #[cfg(unix)]
    #[test]
    fn test_session_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().to_path_buf());

        store.save(&session("A1", "R1")).unwrap();

        let metadata = std::fs::metadata(dir.path().join("session.json")).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
    }

    /// Test: full name falls back to username.
    #[test]
    fn test_full_name_fallback() {
        let mut u = user("alice");
        assert_eq!(u.full_name(), "Alice Kumar");

        u.first_name = None;
        u.last_name = None;
        assert_eq!(u.full_name(), "alice");
    }

    /// Test: token masking.
    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGci...");
        assert_eq!(mask_token("short"), "***");
    }
}
