use serde::{Deserialize, Serialize};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::document::{ACTIVE_POLICY_RE, OWNED_CINEMAS_RE, POLICY_FLAG_RE};
use crate::fields::{FieldId, REGISTRY};
use crate::policy::{ACTIVE_POLICY_KEY, POLICY_FLAG_KEY};
use crate::studio::OWNED_CINEMAS_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanId {
    Field(FieldId),
    OwnedCinemas,
    PolicyFlag,
    ActivePolicy,
}

impl SpanId {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Field(id) => id.key(),
            Self::OwnedCinemas => OWNED_CINEMAS_KEY,
            Self::PolicyFlag => POLICY_FLAG_KEY,
            Self::ActivePolicy => ACTIVE_POLICY_KEY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSpan {
    pub id: SpanId,
    pub span: TextSpan,
}

/// Where each recognized value sits in the raw text, sorted by offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub text_len: usize,
    pub spans: Vec<ValueSpan>,
}

impl DocumentLayout {
    /// Locates the first occurrence of every recognized value. Absent keys get no span.
    pub fn locate(text: &str) -> Self {
        let mut spans = Vec::new();

        for descriptor in &REGISTRY {
            if let Some(span) = first_group_span(descriptor.replace_regex(), text) {
                spans.push(ValueSpan {
                    id: SpanId::Field(descriptor.id),
                    span,
                });
            }
        }
        if let Some(span) = first_group_span(&OWNED_CINEMAS_RE, text) {
            spans.push(ValueSpan {
                id: SpanId::OwnedCinemas,
                span,
            });
        }
        if let Some(span) = first_group_span(&POLICY_FLAG_RE, text) {
            spans.push(ValueSpan {
                id: SpanId::PolicyFlag,
                span,
            });
        }
        if let Some(span) = first_group_span(&ACTIVE_POLICY_RE, text) {
            spans.push(ValueSpan {
                id: SpanId::ActivePolicy,
                span,
            });
        }

        spans.sort_by_key(|value| (value.span.start, value.span.end));
        Self {
            text_len: text.len(),
            spans,
        }
    }

    pub fn get(&self, id: SpanId) -> Option<TextSpan> {
        self.spans
            .iter()
            .find(|value| value.id == id)
            .map(|value| value.span)
    }

    /// Spans must be ordered, inside the text and disjoint, otherwise a rewrite
    /// could clobber one value with another.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut prev: Option<&ValueSpan> = None;
        for value in &self.spans {
            if value.span.end < value.span.start || value.span.end > self.text_len {
                return Err(CoreError::new(
                    CoreErrorCode::Structure,
                    format!(
                        "invalid span for {}: {}..{} (text length {})",
                        value.id.key(),
                        value.span.start,
                        value.span.end,
                        self.text_len
                    ),
                ));
            }
            if let Some(prev) = prev
                && value.span.start < prev.span.end
            {
                return Err(CoreError::new(
                    CoreErrorCode::Structure,
                    format!(
                        "value of {} at {} overlaps value of {} ending at {}",
                        value.id.key(),
                        value.span.start,
                        prev.id.key(),
                        prev.span.end
                    ),
                ));
            }
            prev = Some(value);
        }
        Ok(())
    }
}

pub(crate) fn first_group_span(re: &regex::Regex, text: &str) -> Option<TextSpan> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| TextSpan {
            start: m.start(),
            end: m.end(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_orders_spans_by_offset() {
        let text = r#"{"cash":50,"budget":1000,"ownedCinemas":{"GB":1}}"#;
        let layout = DocumentLayout::locate(text);
        let ids: Vec<SpanId> = layout.spans.iter().map(|value| value.id).collect();
        assert_eq!(
            ids,
            vec![
                SpanId::Field(FieldId::Cash),
                SpanId::Field(FieldId::Budget),
                SpanId::OwnedCinemas,
            ]
        );
        let budget = layout
            .get(SpanId::Field(FieldId::Budget))
            .expect("budget span");
        assert_eq!(budget.slice(text), "1000");
        layout.validate().expect("disjoint spans");
    }

    #[test]
    fn validate_rejects_overlapping_spans() {
        let text = r#""ownedCinemas":{"GB":1,"cash":5}"#;
        let layout = DocumentLayout::locate(text);
        let err = layout.validate().expect_err("cash sits inside ownedCinemas");
        assert_eq!(err.code, CoreErrorCode::Structure);
    }
}
