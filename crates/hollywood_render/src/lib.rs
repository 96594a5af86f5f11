use std::fmt::Write as _;

use hollywood_core::core_api::{SaveReport, Session};
use hollywood_core::fields::{Codec, FieldId};
use hollywood_core::studio::Studio;
use serde_json::{Map as JsonMap, Value as JsonValue};

const SHEET_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub budget: bool,
    pub cash: bool,
    pub reputation: bool,
    pub influence: bool,
    pub tag_slot_max: bool,
    pub contract_movies_max: bool,
    pub contract_years_max: bool,
    pub all_cinemas: bool,
    pub owned_cinemas: bool,
    pub independent_cinemas: bool,
    pub policy: bool,
    pub versions: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.budget
            || self.cash
            || self.reputation
            || self.influence
            || self.tag_slot_max
            || self.contract_movies_max
            || self.contract_years_max
            || self.all_cinemas
            || self.owned_cinemas
            || self.independent_cinemas
            || self.policy
            || self.versions
    }

    fn scalar_fields(&self) -> Vec<FieldId> {
        let flags = [
            (self.budget, FieldId::Budget),
            (self.cash, FieldId::Cash),
            (self.reputation, FieldId::Reputation),
            (self.influence, FieldId::Influence),
            (self.tag_slot_max, FieldId::TagSlotMax),
            (self.contract_movies_max, FieldId::ContractMoviesMax),
            (self.contract_years_max, FieldId::ContractYearsMax),
            (self.all_cinemas, FieldId::AllCinemas),
        ];
        flags
            .into_iter()
            .filter_map(|(selected, id)| selected.then_some(id))
            .collect()
    }
}

/// `key=value` lines in a fixed order, one per value.
pub fn render_selected_pairs(session: &Session, fields: &FieldSelection) -> Vec<(String, String)> {
    let mut out = Vec::new();

    for id in fields.scalar_fields() {
        out.push((id.key().to_string(), session.field(id).to_string()));
    }
    if fields.owned_cinemas {
        for studio in Studio::ALL {
            out.push((
                studio.field_name(),
                session.owned_cinemas(studio).to_string(),
            ));
        }
    }
    if fields.independent_cinemas {
        out.push((
            "independentCinemas".to_string(),
            session.independent_cinemas().count.to_string(),
        ));
    }
    if fields.policy {
        out.push(("ACTIVE_POLICY".to_string(), policy_label(session)));
    }
    if fields.versions {
        for id in [FieldId::FirstSaveVersion, FieldId::LastSaveVersion] {
            out.push((id.key().to_string(), session.field(id).to_string()));
        }
    }

    out
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session)),
    }
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(fields, session)),
    }
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    out.insert(
        "path".to_string(),
        match session.path() {
            Some(path) => JsonValue::String(path.display().to_string()),
            None => JsonValue::Null,
        },
    );
    for id in [FieldId::FirstSaveVersion, FieldId::LastSaveVersion] {
        out.insert(id.key().to_string(), field_to_json(session, id));
    }
    for id in FieldId::EDITABLE {
        out.insert(id.key().to_string(), field_to_json(session, id));
    }
    out.insert("ownedCinemas".to_string(), owned_cinemas_to_json(session));
    out.insert(
        "independentCinemas".to_string(),
        independent_cinemas_to_json(session),
    );
    out.insert("policy".to_string(), policy_to_json(session));
    out.insert(
        "capabilities".to_string(),
        serde_json::to_value(session.capabilities()).unwrap_or(JsonValue::Null),
    );

    out
}

fn selected_json(fields: &FieldSelection, session: &Session) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    if fields.versions {
        for id in [FieldId::FirstSaveVersion, FieldId::LastSaveVersion] {
            out.insert(id.key().to_string(), field_to_json(session, id));
        }
    }
    for id in fields.scalar_fields() {
        out.insert(id.key().to_string(), field_to_json(session, id));
    }
    if fields.owned_cinemas {
        out.insert("ownedCinemas".to_string(), owned_cinemas_to_json(session));
    }
    if fields.independent_cinemas {
        out.insert(
            "independentCinemas".to_string(),
            independent_cinemas_to_json(session),
        );
    }
    if fields.policy {
        out.insert("policy".to_string(), policy_to_json(session));
    }

    out
}

/// Integers render as JSON numbers; anything that does not parse stays a string
/// so unsaved edit text is shown as typed.
fn field_to_json(session: &Session, id: FieldId) -> JsonValue {
    let value = session.field(id);
    match id.codec() {
        Codec::Integer => value
            .parse::<u64>()
            .map(JsonValue::from)
            .unwrap_or_else(|_| JsonValue::String(value.to_string())),
        Codec::Decimal3 | Codec::ReadOnly => JsonValue::String(value.to_string()),
    }
}

fn owned_cinemas_to_json(session: &Session) -> JsonValue {
    let mut out = JsonMap::new();
    for studio in Studio::ALL {
        let value = session.owned_cinemas(studio);
        out.insert(
            studio.code().to_string(),
            value
                .parse::<u64>()
                .map(JsonValue::from)
                .unwrap_or_else(|_| JsonValue::String(value.to_string())),
        );
    }
    JsonValue::Object(out)
}

fn independent_cinemas_to_json(session: &Session) -> JsonValue {
    let view = session.independent_cinemas();
    let mut out = JsonMap::new();
    out.insert("count".to_string(), JsonValue::from(view.count));
    out.insert("over_allocated".to_string(), JsonValue::Bool(view.over_allocated));
    JsonValue::Object(out)
}

fn policy_to_json(session: &Session) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "unlocked".to_string(),
        JsonValue::Bool(session.snapshot().policy_unlocked),
    );
    out.insert(
        "active".to_string(),
        match session.active_policy() {
            Some(policy) => JsonValue::String(policy.token().to_string()),
            None => JsonValue::Null,
        },
    );
    JsonValue::Object(out)
}

pub fn render_studio_sheet(session: &Session) -> String {
    let mut out = String::new();

    let versions = format!(
        "save versions {} -> {}",
        session.field(FieldId::FirstSaveVersion),
        session.field(FieldId::LastSaveVersion)
    );
    writeln!(out).expect("writing to String cannot fail");
    writeln!(out, "{:^SHEET_WIDTH$}", "HOLLYWOOD ANIMAL").expect("writing to String cannot fail");
    writeln!(out, "{:^SHEET_WIDTH$}", "STUDIO SAVE RECORD").expect("writing to String cannot fail");
    writeln!(out, "{:^SHEET_WIDTH$}", versions).expect("writing to String cannot fail");
    writeln!(out).expect("writing to String cannot fail");

    writeln!(out, " ::: Currencies :::").expect("writing to String cannot fail");
    push_field(&mut out, "Budget", session, FieldId::Budget);
    push_field(&mut out, "Cash", session, FieldId::Cash);
    push_field(&mut out, "Reputation", session, FieldId::Reputation);
    push_field(&mut out, "Influence", session, FieldId::Influence);
    writeln!(out).expect("writing to String cannot fail");

    writeln!(out, " ::: Misc :::").expect("writing to String cannot fail");
    push_field(&mut out, "Tag Slots Max", session, FieldId::TagSlotMax);
    push_field(
        &mut out,
        "Movies Max Per Contract",
        session,
        FieldId::ContractMoviesMax,
    );
    push_field(
        &mut out,
        "Max Years Per Contract",
        session,
        FieldId::ContractYearsMax,
    );
    writeln!(out).expect("writing to String cannot fail");

    writeln!(out, " ::: Cinemas :::").expect("writing to String cannot fail");
    push_field(&mut out, "Total Cinemas", session, FieldId::AllCinemas);
    if session.snapshot().has_owned_cinemas {
        for studio in Studio::ALL {
            push_line(
                &mut out,
                &format!("Owned by {}", studio.code()),
                &format_number_with_commas(session.owned_cinemas(studio)),
            );
        }
    } else {
        push_line(&mut out, "Owned by rivals", "none recorded");
    }
    let view = session.independent_cinemas();
    let independent = if view.over_allocated {
        format!(
            "{} (over-allocated by {})",
            view.count,
            view.owned_total - view.declared_total
        )
    } else {
        format_number_with_commas(&view.count.to_string())
    };
    push_line(&mut out, "Independent Cinemas", &independent);
    writeln!(out).expect("writing to String cannot fail");

    writeln!(out, " ::: Policy :::").expect("writing to String cannot fail");
    push_line(&mut out, "Active Policy", &policy_label(session));

    out
}

/// One line per located value: `key start..end value`.
pub fn render_layout(session: &Session) -> String {
    let text = session.raw_text();
    let layout = session.layout();
    let mut out = String::new();

    writeln!(
        out,
        "text_len={} spans={}",
        layout.text_len,
        layout.spans.len()
    )
    .expect("writing to String cannot fail");
    for value in &layout.spans {
        writeln!(
            out,
            "{:<22}{:>8}..{:<8}{}",
            value.id.key(),
            value.span.start,
            value.span.end,
            value.span.slice(text)
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn render_save_report(report: &SaveReport) -> String {
    let mut out = String::new();
    writeln!(out, "Saved {}", report.path.display()).expect("writing to String cannot fail");
    writeln!(out, "Backup created: {}", report.backup_path.display())
        .expect("writing to String cannot fail");
    if report.changed.is_empty() {
        writeln!(out, "No values changed").expect("writing to String cannot fail");
    } else {
        writeln!(out, "Changed: {}", report.changed.join(", "))
            .expect("writing to String cannot fail");
    }
    out
}

fn policy_label(session: &Session) -> String {
    match session.active_policy() {
        Some(policy) => policy.to_string(),
        None => "Locked".to_string(),
    }
}

fn push_field(out: &mut String, label: &str, session: &Session, id: FieldId) {
    let value = session.field(id);
    let shown = match id.codec() {
        Codec::Integer => format_number_with_commas(value),
        Codec::Decimal3 | Codec::ReadOnly => value.to_string(),
    };
    push_line(out, label, &shown);
}

fn push_line(out: &mut String, label: &str, value: &str) {
    let label = format!("{label}:");
    writeln!(out, "  {:<LABEL_WIDTH$}{}", label, value).expect("writing to String cannot fail");
}

/// Groups a digit string by thousands; anything else is returned unchanged.
fn format_number_with_commas(s: &str) -> String {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
