use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::config::{IdentityConfig, SessionConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Candidate, Role::Admin];

    pub fn label(self) -> &'static str {
        match self {
            Role::Candidate => "Candidate",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-user UI preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    pub role: Option<Role>,
    pub role_survey_completed: bool,
}

impl UserPreferences {
    /// Record the survey answer
    pub fn choose_role(&mut self, role: Role) {
        self.role = Some(role);
        self.role_survey_completed = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// Identity from the `[session]` section; requires a uid
    pub fn from_config(session: &SessionConfig) -> Option<Self> {
        let uid = session.uid.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        Some(Self {
            uid: uid.to_string(),
            email: session.email.clone(),
            display_name: session.display_name.clone(),
        })
    }
}

/// Name recorded as a template author: display name, else the local part
/// of the email, else "System"
pub fn author_name(user: Option<&UserIdentity>) -> String {
    let Some(user) = user else {
        return "System".to_string();
    };
    if let Some(name) = user.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    user.email
        .as_deref()
        .and_then(|email| email.split('@').next())
        .filter(|local| !local.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "System".to_string())
}

/// The current user and their preferences, passed by reference to whatever needs them
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserIdentity>,
    pub preferences: UserPreferences,
}

impl Session {
    pub fn new(user: Option<UserIdentity>, preferences: UserPreferences) -> Self {
        Self { user, preferences }
    }

    /// A signed-in user who has not answered the role survey yet
    pub fn needs_role_survey(&self) -> bool {
        self.user.is_some() && !self.preferences.role_survey_completed
    }

    pub fn author_name(&self) -> String {
        author_name(self.user.as_ref())
    }
}

/// Warning shown while identity provider settings are missing, if any
pub fn identity_warning(identity: &IdentityConfig) -> Option<String> {
    let missing = identity.missing_settings();
    if missing.is_empty() {
        return None;
    }
    tracing::warn!(target: "session", "Identity provider not configured: {:?}", missing);
    Some(format!(
        "Identity provider not configured (missing {}); sign-in features are unavailable",
        missing.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display: Option<&str>, email: Option<&str>) -> UserIdentity {
        UserIdentity {
            uid: "u1".to_string(),
            email: email.map(str::to_string),
            display_name: display.map(str::to_string),
        }
    }

    #[test]
    fn test_author_fallbacks() {
        assert_eq!(author_name(Some(&user(Some("Jane Doe"), Some("j@x.com")))), "Jane Doe");
        assert_eq!(author_name(Some(&user(None, Some("jdoe@x.com")))), "jdoe");
        assert_eq!(author_name(Some(&user(Some(" "), None))), "System");
        assert_eq!(author_name(None), "System");
    }

    #[test]
    fn test_needs_role_survey() {
        let mut session = Session::new(Some(user(None, None)), UserPreferences::default());
        assert!(session.needs_role_survey());
        session.preferences.choose_role(Role::Admin);
        assert!(!session.needs_role_survey());
        assert_eq!(session.preferences.role, Some(Role::Admin));
        assert!(!Session::default().needs_role_survey());
    }

    #[test]
    fn test_identity_from_config_requires_uid() {
        let mut cfg = SessionConfig::default();
        assert!(UserIdentity::from_config(&cfg).is_none());
        cfg.uid = Some("abc".to_string());
        assert_eq!(UserIdentity::from_config(&cfg).unwrap().uid, "abc");
    }

    #[test]
    fn test_identity_warning() {
        let mut identity = IdentityConfig::default();
        assert!(identity_warning(&identity).unwrap().contains("identity.provider_url"));
        identity.provider_url = Some("https://auth".into());
        identity.publishable_key = Some("pk".into());
        assert!(identity_warning(&identity).is_none());
    }
}
