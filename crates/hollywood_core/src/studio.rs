use std::fmt;

use serde::{Deserialize, Serialize};

pub const OWNED_CINEMAS_KEY: &str = "ownedCinemas";

/// Rival studio codes keyed inside the `ownedCinemas` object, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Studio {
    GB,
    EM,
    SU,
    HE,
    MA,
    PL,
}

impl Studio {
    pub const ALL: [Studio; 6] = [
        Studio::GB,
        Studio::EM,
        Studio::SU,
        Studio::HE,
        Studio::MA,
        Studio::PL,
    ];

    pub fn code(&self) -> &'static str {
        match *self {
            Self::GB => "GB",
            Self::EM => "EM",
            Self::SU => "SU",
            Self::HE => "HE",
            Self::MA => "MA",
            Self::PL => "PL",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|studio| studio.code().eq_ignore_ascii_case(code))
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Name used in validation errors, e.g. `ownedCinemas.GB`.
    pub fn field_name(&self) -> String {
        format!("{OWNED_CINEMAS_KEY}.{}", self.code())
    }
}

impl fmt::Display for Studio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipMap {
    counts: [u64; 6],
}

impl OwnershipMap {
    pub fn get(&self, studio: Studio) -> u64 {
        self.counts[studio.index()]
    }

    pub fn set(&mut self, studio: Studio, count: u64) {
        self.counts[studio.index()] = count;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Studio, u64)> + '_ {
        Studio::ALL
            .into_iter()
            .map(|studio| (studio, self.counts[studio.index()]))
    }

    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |acc, &count| acc.saturating_add(count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&count| count == 0)
    }

    /// Serializes the object literal without whitespace, always in `Studio::ALL` order.
    pub fn to_literal(&self) -> String {
        let body = self
            .iter()
            .map(|(studio, count)| format!("\"{}\":{}", studio.code(), count))
            .collect::<Vec<_>>()
            .join(",");
        format!("{{{body}}}")
    }
}
