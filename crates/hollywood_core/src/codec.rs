use std::collections::BTreeMap;

use crate::core_api::{CoreError, CoreErrorCode};
use crate::fields::{Codec, FieldId};
use crate::policy::ActivePolicy;
use crate::studio::{OwnershipMap, Studio};

const REPUTATION_FRACTION_DIGITS: usize = 3;

/// Everything a save will write, already in on-disk form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpdates {
    pub scalars: BTreeMap<FieldId, String>,
    pub owned_cinemas: OwnershipMap,
    /// `None` when the policy section is locked; nothing is written for it then.
    pub active_policy: Option<ActivePolicy>,
}

pub fn validate_and_encode(id: FieldId, input: &str) -> Result<String, CoreError> {
    match id.codec() {
        Codec::Integer => encode_integer(id.key(), input).map(|value| value.to_string()),
        Codec::Decimal3 => encode_decimal3(id.key(), input),
        Codec::ReadOnly => Err(CoreError::new(
            CoreErrorCode::UnsupportedOperation,
            format!("{} is read-only", id.key()),
        )),
    }
}

pub fn encode_owned_cinemas(studio: Studio, input: &str) -> Result<u64, CoreError> {
    encode_integer(&studio.field_name(), input)
}

/// Accepts a bare run of ASCII digits and nothing else: no sign, no whitespace.
pub fn encode_integer(field: &str, input: &str) -> Result<u64, CoreError> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::validation(
            field,
            format!("invalid value for {field}: expected a non-negative integer, got {input:?}"),
        ));
    }
    input.parse::<u64>().map_err(|_| {
        CoreError::validation(field, format!("invalid value for {field}: {input} is too large"))
    })
}

/// Non-negative decimal with at most three fractional digits, padded to exactly three.
/// More precision is rejected rather than rounded.
pub fn encode_decimal3(field: &str, input: &str) -> Result<String, CoreError> {
    let invalid = || {
        CoreError::validation(
            field,
            format!(
                "invalid value for {field}: expected a non-negative number with at most \
                 {REPUTATION_FRACTION_DIGITS} decimals, got {input:?}"
            ),
        )
    };

    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !all_digits(whole)
        || !all_digits(fraction)
        || fraction.len() > REPUTATION_FRACTION_DIGITS
    {
        return Err(invalid());
    }

    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| invalid())?
    };
    Ok(format!(
        "{whole}.{fraction:0<width$}",
        width = REPUTATION_FRACTION_DIGITS
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reputation_pads_to_three_decimals() {
        assert_eq!(encode_decimal3("reputation", "4.5").unwrap(), "4.500");
        assert_eq!(encode_decimal3("reputation", "4").unwrap(), "4.000");
        assert_eq!(encode_decimal3("reputation", "4.250").unwrap(), "4.250");
        assert_eq!(encode_decimal3("reputation", ".5").unwrap(), "0.500");
        assert_eq!(encode_decimal3("reputation", "007.1").unwrap(), "7.100");
    }

    #[test]
    fn reputation_rejects_extra_precision_and_junk() {
        for input in ["4.5001", "", ".", "-1.0", "abc", "4,5", " 4.5", "1e3"] {
            let err = encode_decimal3("reputation", input).expect_err(input);
            assert_eq!(err.code, CoreErrorCode::Validation);
            assert_eq!(err.field.as_deref(), Some("reputation"));
        }
    }

    #[test]
    fn integers_must_be_plain_digits() {
        assert_eq!(encode_integer("cash", "0").unwrap(), 0);
        assert_eq!(encode_integer("cash", "00120").unwrap(), 120);
        for input in ["", "-5", "+5", "1.0", " 7", "12a", "99999999999999999999999"] {
            let err = encode_integer("cash", input).expect_err(input);
            assert_eq!(err.field.as_deref(), Some("cash"));
        }
    }

    #[test]
    fn read_only_fields_cannot_be_encoded() {
        let err = validate_and_encode(FieldId::FirstSaveVersion, "1.0.0").unwrap_err();
        assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);
    }

    #[test]
    fn ownership_errors_name_the_studio() {
        let err = encode_owned_cinemas(Studio::PL, "x").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("ownedCinemas.PL"));
    }
}
