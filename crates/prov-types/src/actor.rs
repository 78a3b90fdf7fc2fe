use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Role of an actor at the time of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    /// Waste generator (seller side).
    Generator,
    /// Buyer / manufacturer.
    Buyer,
    /// Collection or delivery worker.
    Worker,
    /// Platform administrator.
    Admin,
    /// Automated system action (e.g. quality verification).
    System,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generator => "GENERATOR",
            Self::Buyer => "BUYER",
            Self::Worker => "WORKER",
            Self::Admin => "ADMIN",
            Self::System => "SYSTEM",
        }
    }
}

impl FromStr for ActorRole {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENERATOR" => Ok(Self::Generator),
            "BUYER" => Ok(Self::Buyer),
            "WORKER" => Ok(Self::Worker),
            "ADMIN" => Ok(Self::Admin),
            "SYSTEM" => Ok(Self::System),
            other => Err(TypeError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of whoever triggered an event.
///
/// Captured at write time and never re-resolved from current account state:
/// the ledger keeps who the actor *was*, even if the account is later
/// renamed, re-roled, or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Stable account identifier.
    pub actor_id: String,
    /// Display name at event time.
    pub display_name: String,
    /// Role at event time.
    pub role: ActorRole,
}

impl ActorSnapshot {
    pub fn new(
        actor_id: impl Into<String>,
        display_name: impl Into<String>,
        role: ActorRole,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// The snapshot used for automated system actions.
    pub fn system() -> Self {
        Self::new("system", "System", ActorRole::System)
    }

    /// `true` if the snapshot carries a usable actor id.
    pub fn has_valid_id(&self) -> bool {
        !self.actor_id.trim().is_empty()
    }
}

impl fmt::Display for ActorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.role)
    }
}
