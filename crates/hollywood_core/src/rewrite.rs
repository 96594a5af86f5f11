use tracing::debug;

use crate::codec::ValidatedUpdates;
use crate::core_api::{CoreError, CoreErrorCode};
use crate::layout::{DocumentLayout, SpanId, ValueSpan};

/// Produces the new save text. Only the located value spans change; every other
/// byte is copied from `raw_text` as-is. Keys missing from the text are skipped,
/// never inserted.
pub fn rewrite(raw_text: &str, updates: &ValidatedUpdates) -> Result<String, CoreError> {
    let located = DocumentLayout::locate(raw_text);
    let mut targets: Vec<(ValueSpan, String)> = Vec::new();

    for (id, value) in &updates.scalars {
        let span_id = SpanId::Field(*id);
        match located.get(span_id) {
            Some(span) => targets.push((ValueSpan { id: span_id, span }, value.clone())),
            None => debug!(field = id.key(), "key absent from save, not written"),
        }
    }

    match located.get(SpanId::OwnedCinemas) {
        Some(span) => targets.push((
            ValueSpan {
                id: SpanId::OwnedCinemas,
                span,
            },
            updates.owned_cinemas.to_literal(),
        )),
        None if updates.owned_cinemas.is_empty() => {
            debug!("no ownedCinemas block and no ownership to write")
        }
        None => {
            return Err(CoreError::new(
                CoreErrorCode::Structure,
                "save has no ownedCinemas block to rewrite",
            ));
        }
    }

    if let Some(policy) = &updates.active_policy {
        match located.get(SpanId::ActivePolicy) {
            Some(span) => targets.push((
                ValueSpan {
                    id: SpanId::ActivePolicy,
                    span,
                },
                policy.token().to_string(),
            )),
            None => debug!("policy unlocked but ACTIVE_POLICY absent, not written"),
        }
    }

    targets.sort_by_key(|(value, _)| value.span.start);
    let plan = DocumentLayout {
        text_len: raw_text.len(),
        spans: targets.iter().map(|(value, _)| *value).collect(),
    };
    plan.validate()?;

    let mut out = String::with_capacity(raw_text.len() + 64);
    let mut cursor = 0usize;
    for (value, replacement) in &targets {
        out.push_str(&raw_text[cursor..value.span.start]);
        out.push_str(replacement);
        cursor = value.span.end;
    }
    out.push_str(&raw_text[cursor..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::fields::FieldId;
    use crate::policy::ActivePolicy;
    use crate::studio::{OwnershipMap, Studio};

    fn updates(scalars: &[(FieldId, &str)]) -> ValidatedUpdates {
        ValidatedUpdates {
            scalars: scalars
                .iter()
                .map(|(id, value)| (*id, value.to_string()))
                .collect::<BTreeMap<_, _>>(),
            owned_cinemas: OwnershipMap::default(),
            active_policy: None,
        }
    }

    #[test]
    fn replaces_only_the_first_occurrence() {
        let text = "{\"cash\":1,\n\"cash\":2}";
        let out = rewrite(text, &updates(&[(FieldId::Cash, "9")])).unwrap();
        assert_eq!(out, "{\"cash\":9,\n\"cash\":2}");
    }

    #[test]
    fn absent_keys_are_not_inserted() {
        let text = r#"{"cash":1}"#;
        let out = rewrite(text, &updates(&[(FieldId::Budget, "5")])).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn ownership_without_block_is_a_structure_error() {
        let mut update = updates(&[]);
        update.owned_cinemas.set(Studio::GB, 1);
        let err = rewrite(r#"{"cash":1}"#, &update).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::Structure);
    }

    #[test]
    fn policy_token_is_replaced_in_place() {
        let text = r#"{"Policy":true,"ACTIVE_POLICY":"POLICY_TRASH"}"#;
        let mut update = updates(&[]);
        update.active_policy = Some(ActivePolicy::Boutique);
        let out = rewrite(text, &update).unwrap();
        assert_eq!(out, r#"{"Policy":true,"ACTIVE_POLICY":"POLICY_BOUTIQUE"}"#);
    }
}
