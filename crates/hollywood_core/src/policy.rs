use std::fmt;

use serde::{Deserialize, Serialize};

pub const POLICY_FLAG_KEY: &str = "Policy";
pub const ACTIVE_POLICY_KEY: &str = "ACTIVE_POLICY";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivePolicy {
    Trash,
    Major,
    Boutique,
    Conveyor,
    Average,
    Unknown(String),
}

impl ActivePolicy {
    pub const TRASH_TOKEN: &'static str = "POLICY_TRASH";
    pub const MAJOR_TOKEN: &'static str = "POLICY_MAJOR";
    pub const BOUTIQUE_TOKEN: &'static str = "POLICY_BOUTIQUE";
    pub const CONVEYOR_TOKEN: &'static str = "POLICY_CONVEYOR";
    pub const AVERAGE_TOKEN: &'static str = "POLICY_AVERAGE";

    /// Used when the policy section is unlocked but carries no token.
    pub const BASELINE: ActivePolicy = ActivePolicy::Average;

    pub const KNOWN: [ActivePolicy; 5] = [
        ActivePolicy::Trash,
        ActivePolicy::Major,
        ActivePolicy::Boutique,
        ActivePolicy::Conveyor,
        ActivePolicy::Average,
    ];

    /// Tokens outside the known set are kept verbatim so an untouched save
    /// writes back exactly what it read.
    pub fn from_token(token: &str) -> Self {
        Self::parse_known(token).unwrap_or_else(|| Self::Unknown(token.to_string()))
    }

    pub fn parse_known(token: &str) -> Option<Self> {
        match token {
            Self::TRASH_TOKEN => Some(Self::Trash),
            Self::MAJOR_TOKEN => Some(Self::Major),
            Self::BOUTIQUE_TOKEN => Some(Self::Boutique),
            Self::CONVEYOR_TOKEN => Some(Self::Conveyor),
            Self::AVERAGE_TOKEN => Some(Self::Average),
            _ => None,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            Self::Trash => Self::TRASH_TOKEN,
            Self::Major => Self::MAJOR_TOKEN,
            Self::Boutique => Self::BOUTIQUE_TOKEN,
            Self::Conveyor => Self::CONVEYOR_TOKEN,
            Self::Average => Self::AVERAGE_TOKEN,
            Self::Unknown(token) => token,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trash => "Trash",
            Self::Major => "Major",
            Self::Boutique => "Boutique",
            Self::Conveyor => "Conveyor",
            Self::Average => "Average",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for ActivePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(token) => write!(f, "Unknown ({})", token),
            _ => f.write_str(self.as_str()),
        }
    }
}
