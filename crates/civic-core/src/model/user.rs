use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::issue::{ParseEnumError, normalize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Staff,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Name shown in the role switcher.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Citizen => "Citizen",
            Self::Staff => "Municipal Staff",
            Self::Admin => "Administrator",
        }
    }
}

/// Persisted account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl User {
    /// The identity used when nothing has been stored yet.
    #[must_use]
    pub fn default_citizen() -> Self {
        Self {
            id: "user1".into(),
            name: "John Citizen".into(),
            email: "john@example.com".into(),
            role: Role::Citizen,
            department: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// The acting user for this run, typed by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Citizen(Identity),
    Staff {
        identity: Identity,
        department: Option<String>,
    },
    Admin(Identity),
}

impl Session {
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        match self {
            Self::Citizen(identity) | Self::Admin(identity) | Self::Staff { identity, .. } => {
                identity
            }
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.identity().id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity().name
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Citizen(_) => Role::Citizen,
            Self::Staff { .. } => Role::Staff,
            Self::Admin(_) => Role::Admin,
        }
    }

    #[must_use]
    pub const fn can_change_status(&self) -> bool {
        matches!(self, Self::Staff { .. } | Self::Admin(_))
    }

    #[must_use]
    pub const fn can_view_analytics(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    /// Same person, different role. A department only survives on staff.
    #[must_use]
    pub fn with_role(&self, role: Role) -> Self {
        let identity = self.identity().clone();
        let department = match self {
            Self::Staff { department, .. } => department.clone(),
            _ => None,
        };
        match role {
            Role::Citizen => Self::Citizen(identity),
            Role::Staff => Self::Staff {
                identity,
                department,
            },
            Role::Admin => Self::Admin(identity),
        }
    }

    /// The record written under `current_user`.
    #[must_use]
    pub fn to_user(&self) -> User {
        let identity = self.identity().clone();
        let department = match self {
            Self::Staff { department, .. } => department.clone(),
            _ => None,
        };
        User {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            role: self.role(),
            department,
        }
    }
}

impl From<User> for Session {
    fn from(user: User) -> Self {
        let identity = Identity {
            id: user.id,
            name: user.name,
            email: user.email,
        };
        match user.role {
            Role::Citizen => Self::Citizen(identity),
            Role::Staff => Self::Staff {
                identity,
                department: user.department,
            },
            Role::Admin => Self::Admin(identity),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::from(User::default_citizen())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Gu,
}

impl Language {
    pub const ALL: [Self; 3] = [Self::En, Self::Hi, Self::Gu];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Gu => "gu",
        }
    }

    /// Native name shown in the language picker.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "हिंदी",
            Self::Gu => "ગુજરાતી",
        }
    }

    /// Locale tag handed to the speech recognizer.
    #[must_use]
    pub const fn speech_locale(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Hi => "hi-IN",
            Self::Gu => "gu-IN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "citizen" => Ok(Self::Citizen),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseEnumError {
                expected: "role",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "en" => Ok(Self::En),
            "hi" => Ok(Self::Hi),
            "gu" => Ok(Self::Gu),
            _ => Err(ParseEnumError {
                expected: "language",
                got: s.to_string(),
            }),
        }
    }
}
