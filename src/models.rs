use chrono::NaiveDate;

/// Headers plus string cells, as read from an uploaded sheet.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }
}

/// One input row after column resolution, still untyped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub student_id: String,
    pub student_name: String,
    pub date: String,
    pub category: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AbsenceKind {
    RecognizedAbsence,
    SickAbsence,
    OtherAbsence,
    Present,
}

impl AbsenceKind {
    pub const RETAINED: [AbsenceKind; 3] = [
        AbsenceKind::RecognizedAbsence,
        AbsenceKind::SickAbsence,
        AbsenceKind::OtherAbsence,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AbsenceKind::RecognizedAbsence => "출석인정결석",
            AbsenceKind::SickAbsence => "질병결석",
            AbsenceKind::OtherAbsence => "기타결석",
            AbsenceKind::Present => "출석",
        }
    }

    pub fn is_absence(self) -> bool {
        !matches!(self, AbsenceKind::Present)
    }
}

impl std::fmt::Display for AbsenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Known(AbsenceKind),
    Unrecognized(String),
}

impl Category {
    /// The kind, if it is one of the three absence categories kept for documents.
    pub fn retained(&self) -> Option<AbsenceKind> {
        match self {
            Category::Known(kind) if kind.is_absence() => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceRecord {
    pub student_id: String,
    pub student_name: String,
    pub date: NaiveDate,
    pub kind: AbsenceKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceInterval {
    pub student_id: String,
    pub student_name: String,
    pub kind: AbsenceKind,
    pub reason: String,
    pub interval_start: NaiveDate,
    pub interval_end: NaiveDate,
    pub day_count: i64,
}

impl AbsenceInterval {
    pub fn display_date(&self) -> String {
        let start = crate::normalize::format_date(self.interval_start);
        if self.interval_start == self.interval_end {
            start
        } else {
            format!(
                "{} ~ {}",
                start,
                crate::normalize::format_date(self.interval_end)
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub kind: AbsenceKind,
    pub interval_count: usize,
    pub total_days: i64,
    pub student_count: usize,
}
