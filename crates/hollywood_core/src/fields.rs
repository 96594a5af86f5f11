use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldId {
    Budget,
    Cash,
    Reputation,
    Influence,
    TagSlotMax,
    ContractMoviesMax,
    ContractYearsMax,
    AllCinemas,
    FirstSaveVersion,
    LastSaveVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Codec {
    /// Non-negative integer literal, written bare.
    Integer,
    /// Non-negative decimal written quoted with exactly three fractional digits.
    Decimal3,
    /// Displayed only; never rewritten.
    ReadOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub key: &'static str,
    /// Capture group 1 is the current value.
    pub extract_pattern: &'static str,
    /// Capture group 1 is the span replaced on save; everything around it is kept.
    pub replace_pattern: &'static str,
    pub codec: Codec,
}

pub static REGISTRY: [FieldDescriptor; 10] = [
    integer_field(FieldId::Budget, "budget", r#""budget":([0-9]+)"#),
    integer_field(FieldId::Cash, "cash", r#""cash":([0-9]+)"#),
    FieldDescriptor {
        id: FieldId::Reputation,
        key: "reputation",
        extract_pattern: r#""reputation":"([0-9]+\.[0-9]{3})""#,
        replace_pattern: r#""reputation":"([0-9]+\.[0-9]{3})""#,
        codec: Codec::Decimal3,
    },
    integer_field(FieldId::Influence, "influence", r#""influence":([0-9]+)"#),
    integer_field(FieldId::TagSlotMax, "TAG_SLOT_MAX", r#""TAG_SLOT_MAX":([0-9]+)"#),
    integer_field(
        FieldId::ContractMoviesMax,
        "CONTRACT_MOVIES_MAX",
        r#""CONTRACT_MOVIES_MAX":([0-9]+)"#,
    ),
    integer_field(
        FieldId::ContractYearsMax,
        "CONTRACT_YEARS_MAX",
        r#""CONTRACT_YEARS_MAX":([0-9]+)"#,
    ),
    integer_field(FieldId::AllCinemas, "allCinemas", r#""allCinemas":([0-9]+)"#),
    read_only_field(
        FieldId::FirstSaveVersion,
        "firstSaveVersion",
        r#""firstSaveVersion":"([^"\n]*)""#,
    ),
    read_only_field(
        FieldId::LastSaveVersion,
        "lastSaveVersion",
        r#""lastSaveVersion":"([^"\n]*)""#,
    ),
];

const fn integer_field(id: FieldId, key: &'static str, pattern: &'static str) -> FieldDescriptor {
    FieldDescriptor {
        id,
        key,
        extract_pattern: pattern,
        replace_pattern: pattern,
        codec: Codec::Integer,
    }
}

const fn read_only_field(
    id: FieldId,
    key: &'static str,
    pattern: &'static str,
) -> FieldDescriptor {
    FieldDescriptor {
        id,
        key,
        extract_pattern: pattern,
        replace_pattern: pattern,
        codec: Codec::ReadOnly,
    }
}

struct CompiledPatterns {
    extract: Regex,
    replace: Regex,
}

static COMPILED: LazyLock<Vec<CompiledPatterns>> = LazyLock::new(|| {
    REGISTRY
        .iter()
        .map(|descriptor| CompiledPatterns {
            extract: compile_builtin(descriptor.extract_pattern),
            replace: compile_builtin(descriptor.replace_pattern),
        })
        .collect()
});

pub(crate) fn compile_builtin(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("built-in pattern {pattern:?} is invalid: {e}"))
}

impl FieldId {
    pub const ALL: [FieldId; 10] = [
        FieldId::Budget,
        FieldId::Cash,
        FieldId::Reputation,
        FieldId::Influence,
        FieldId::TagSlotMax,
        FieldId::ContractMoviesMax,
        FieldId::ContractYearsMax,
        FieldId::AllCinemas,
        FieldId::FirstSaveVersion,
        FieldId::LastSaveVersion,
    ];

    pub const EDITABLE: [FieldId; 8] = [
        FieldId::Budget,
        FieldId::Cash,
        FieldId::Reputation,
        FieldId::Influence,
        FieldId::TagSlotMax,
        FieldId::ContractMoviesMax,
        FieldId::ContractYearsMax,
        FieldId::AllCinemas,
    ];

    pub fn descriptor(&self) -> &'static FieldDescriptor {
        &REGISTRY[*self as usize]
    }

    pub fn key(&self) -> &'static str {
        self.descriptor().key
    }

    pub fn codec(&self) -> Codec {
        self.descriptor().codec
    }

    pub fn is_editable(&self) -> bool {
        self.codec() != Codec::ReadOnly
    }

    pub fn from_key(key: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|descriptor| descriptor.key == key)
            .map(|descriptor| descriptor.id)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FieldDescriptor {
    pub fn extract_regex(&self) -> &'static Regex {
        &COMPILED[self.id as usize].extract
    }

    pub fn replace_regex(&self) -> &'static Regex {
        &COMPILED[self.id as usize].replace
    }
}
