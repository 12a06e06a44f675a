//! Acting-user resolution for CLI commands.
//!
//! The resolution chain: `--as` flag > `CIVIC_USER` env > the stored
//! current user. Flag and env values name a seed user; the override lasts for
//! one invocation and is never persisted.

use civic_core::ErrorCode;
use civic_core::model::{Session, User};
use civic_core::seed;
use std::env;

/// Errors from session resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResolutionError {
    /// Human-readable description.
    pub message: String,
    /// Machine error code.
    pub code: &'static str,
}

impl std::fmt::Display for SessionResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SessionResolutionError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

fn override_id_with(cli_flag: Option<&str>, env: &dyn EnvReader) -> Option<String> {
    if let Some(id) = cli_flag.map(str::trim).filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }
    env.get("CIVIC_USER")
}

fn lookup(id: &str) -> Result<User, SessionResolutionError> {
    seed::user(id).ok_or_else(|| SessionResolutionError {
        message: format!("unknown user '{id}'"),
        code: ErrorCode::UserNotFound.code(),
    })
}

fn resolve_session_with(
    cli_flag: Option<&str>,
    stored: &Session,
    env: &dyn EnvReader,
) -> Result<Session, SessionResolutionError> {
    match override_id_with(cli_flag, env) {
        Some(id) => {
            let user = lookup(&id)?;
            tracing::debug!(user = %user.id, role = %user.role, "acting as override user");
            Ok(Session::from(user))
        }
        None => Ok(stored.clone()),
    }
}

/// Resolve the session a command acts under.
///
/// # Errors
///
/// The flag or env names a user that is not in the seed directory.
pub fn resolve_session(
    cli_flag: Option<&str>,
    stored: &Session,
) -> Result<Session, SessionResolutionError> {
    resolve_session_with(cli_flag, stored, &RealEnv)
}

/// Seed user ids, for error hints.
pub fn known_user_ids() -> String {
    seed::users()
        .into_iter()
        .map(|u| u.id)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_core::model::Role;
    use std::collections::HashMap;

    struct MockEnv {
        vars: HashMap<String, String>,
    }

    impl MockEnv {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
            }
        }

        fn var(mut self, key: &str, val: &str) -> Self {
            self.vars.insert(key.to_string(), val.to_string());
            self
        }
    }

    impl EnvReader for MockEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).filter(|v| !v.is_empty()).cloned()
        }
    }

    #[test]
    fn stored_session_when_nothing_set() {
        let stored = Session::default();
        let session = resolve_session_with(None, &stored, &MockEnv::new()).unwrap();
        assert_eq!(session, stored);
    }

    #[test]
    fn flag_beats_env() {
        let env = MockEnv::new().var("CIVIC_USER", "user2");
        let session = resolve_session_with(Some("admin1"), &Session::default(), &env).unwrap();
        assert_eq!(session.role(), Role::Admin);
    }

    #[test]
    fn env_beats_stored() {
        let env = MockEnv::new().var("CIVIC_USER", "user2");
        let session = resolve_session_with(None, &Session::default(), &env).unwrap();
        assert_eq!(session.user_id(), "user2");
        assert_eq!(session.role(), Role::Staff);
    }

    #[test]
    fn blank_flag_ignored() {
        let env = MockEnv::new().var("CIVIC_USER", "admin1");
        let session = resolve_session_with(Some("  "), &Session::default(), &env).unwrap();
        assert_eq!(session.user_id(), "admin1");
    }

    #[test]
    fn unknown_user_is_an_error() {
        let err = resolve_session_with(Some("ghost"), &Session::default(), &MockEnv::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown user 'ghost'");
        assert_eq!(err.code, "E2007");
        assert!(known_user_ids().contains("user1"));
    }
}
