use chrono::NaiveDate;

use crate::models::{AbsenceKind, Category, RawRow};

pub const DATE_FORMAT: &str = "%Y.%m.%d";

pub struct CategoryRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub kind: AbsenceKind,
}

/// Evaluated top to bottom, first match wins. Predicates receive trimmed text.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "sickness and absence tokens",
        matches: is_sick_absence,
        kind: AbsenceKind::SickAbsence,
    },
    CategoryRule {
        name: "recognized absence",
        matches: is_recognized_absence,
        kind: AbsenceKind::RecognizedAbsence,
    },
    CategoryRule {
        name: "present",
        matches: is_present,
        kind: AbsenceKind::Present,
    },
    CategoryRule {
        name: "other absence",
        matches: is_other_absence,
        kind: AbsenceKind::OtherAbsence,
    },
];

/// Connectives that join a cause to its consequence ("A로 인한 결석").
/// Listed longest first so that a tie at the same position keeps the full form.
pub const REASON_CONNECTIVES: &[&str] = &["으로 인한", "로 인한"];

fn is_sick_absence(text: &str) -> bool {
    let lower = text.to_lowercase();
    (text.contains("질병") && text.contains("결석"))
        || (lower.contains("sick") && lower.contains("absence"))
}

fn is_recognized_absence(text: &str) -> bool {
    text == "출석인정결석" || text.eq_ignore_ascii_case("recognized absence")
}

fn is_other_absence(text: &str) -> bool {
    text == "기타결석" || text.eq_ignore_ascii_case("other absence")
}

fn is_present(text: &str) -> bool {
    text == "출석" || text.eq_ignore_ascii_case("present")
}

pub fn normalize_category(text: &str) -> Category {
    let trimmed = text.trim();
    CATEGORY_RULES
        .iter()
        .find(|rule| (rule.matches)(trimmed))
        .map(|rule| {
            log::trace!("category {:?} matched rule {:?}", trimmed, rule.name);
            Category::Known(rule.kind)
        })
        .unwrap_or_else(|| Category::Unrecognized(trimmed.to_string()))
}

/// Keeps the cause phrase in front of the leftmost connective.
pub fn clean_reason(text: &str) -> String {
    let cut = REASON_CONNECTIVES
        .iter()
        .filter_map(|connective| text.find(connective))
        .min();

    match cut {
        Some(position) => text[..position].trim().to_string(),
        None => text.trim().to_string(),
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let cleaned = text.trim().trim_end_matches('.').trim_end();
    if cleaned.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(cleaned, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Blank identity cells inherit the nearest non-blank value above them.
pub fn forward_fill(rows: &mut [RawRow]) {
    let mut last_id: Option<String> = None;
    let mut last_name: Option<String> = None;

    for row in rows.iter_mut() {
        fill_cell(&mut row.student_id, &mut last_id);
        fill_cell(&mut row.student_name, &mut last_name);
    }
}

fn fill_cell(cell: &mut String, last: &mut Option<String>) {
    if cell.trim().is_empty() {
        if let Some(value) = last.as_ref() {
            cell.clone_from(value);
        }
    } else {
        *last = Some(cell.trim().to_string());
        *cell = cell.trim().to_string();
    }
}
