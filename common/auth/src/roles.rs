use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_SUPERUSER: &str = "SUPERUSER";
pub const ROLE_EDITOR: &str = "EDITOR";
pub const ROLE_VIEWER: &str = "VIEWER";

pub const ROLE_HIERARCHY: &[&str] = &[ROLE_SUPERUSER, ROLE_EDITOR, ROLE_VIEWER];

/// Portal role carried in the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Viewer,
    Editor,
    Superuser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => ROLE_VIEWER,
            Role::Editor => ROLE_EDITOR,
            Role::Superuser => ROLE_SUPERUSER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_VIEWER => Ok(Role::Viewer),
            ROLE_EDITOR => Ok(Role::Editor),
            ROLE_SUPERUSER => Ok(Role::Superuser),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
