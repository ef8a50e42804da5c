use std::io::Write;

use serde::Serialize;

use crate::calendar::confirmation_date;
use crate::models::AbsenceInterval;
use crate::normalize::format_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// One row of the document-template input, keyed by the template's field names.
#[derive(Debug, Serialize)]
pub struct IntervalRow<'a> {
    #[serde(rename = "번호")]
    pub student_id: &'a str,
    #[serde(rename = "성명")]
    pub student_name: &'a str,
    #[serde(rename = "일자")]
    pub display_date: String,
    #[serde(rename = "출결구분")]
    pub category: &'static str,
    #[serde(rename = "사유")]
    pub reason: &'a str,
    #[serde(rename = "결석시작일")]
    pub interval_start: String,
    #[serde(rename = "결석종료일")]
    pub interval_end: String,
    #[serde(rename = "결석일수")]
    pub day_count: i64,
    #[serde(rename = "결석확인일")]
    pub confirmation_date: String,
}

impl<'a> From<&'a AbsenceInterval> for IntervalRow<'a> {
    fn from(interval: &'a AbsenceInterval) -> Self {
        Self {
            student_id: &interval.student_id,
            student_name: &interval.student_name,
            display_date: interval.display_date(),
            category: interval.kind.label(),
            reason: &interval.reason,
            interval_start: format_date(interval.interval_start),
            interval_end: format_date(interval.interval_end),
            day_count: interval.day_count,
            confirmation_date: confirmation_date(interval.interval_end)
                .map(format_date)
                .unwrap_or_default(),
        }
    }
}

pub fn write_intervals<W: Write>(
    writer: W,
    intervals: &[AbsenceInterval],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rows: Vec<IntervalRow<'_>> = intervals.iter().map(IntervalRow::from).collect();
    match format {
        OutputFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            if rows.is_empty() {
                csv_writer.write_record(HEADERS)?;
            }
            for row in &rows {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, &rows)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

const HEADERS: [&str; 9] = [
    "번호",
    "성명",
    "일자",
    "출결구분",
    "사유",
    "결석시작일",
    "결석종료일",
    "결석일수",
    "결석확인일",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AbsenceKind;
    use chrono::NaiveDate;

    fn sample_interval() -> AbsenceInterval {
        AbsenceInterval {
            student_id: "101".to_string(),
            student_name: "Kim".to_string(),
            kind: AbsenceKind::SickAbsence,
            reason: "건강 문제".to_string(),
            interval_start: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            interval_end: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            day_count: 5,
        }
    }

    #[test]
    fn csv_uses_template_headers() {
        let mut buffer = Vec::new();
        write_intervals(&mut buffer, &[sample_interval()], OutputFormat::Csv).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "101,Kim,2024.03.04 ~ 2024.03.08,질병결석,건강 문제,2024.03.04,2024.03.08,5,2024.03.11"
        );
    }

    #[test]
    fn empty_csv_still_has_headers() {
        let mut buffer = Vec::new();
        write_intervals(&mut buffer, &[], OutputFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap().trim_end(), HEADERS.join(","));
    }

    #[test]
    fn end_of_calendar_leaves_confirmation_blank() {
        let table = crate::models::RawTable::new(
            ["번호", "성명", "일자", "출결구분", "사유"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            vec![vec![
                "7".to_string(),
                "Oh".to_string(),
                format_date(NaiveDate::MAX),
                "질병결석".to_string(),
                "".to_string(),
            ]],
        );
        let intervals = crate::consolidate::consolidate(
            &table,
            &crate::config::ConsolidateOptions::default(),
        )
        .unwrap();
        assert_eq!(intervals.len(), 1);

        let mut buffer = Vec::new();
        write_intervals(&mut buffer, &intervals, OutputFormat::Csv).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.ends_with(",1,"), "row {row:?}");
    }

    #[test]
    fn json_carries_day_count_as_number() {
        let mut buffer = Vec::new();
        write_intervals(&mut buffer, &[sample_interval()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value[0]["결석일수"], 5);
        assert_eq!(value[0]["출결구분"], "질병결석");
        assert_eq!(value[0]["결석확인일"], "2024.03.11");
    }
}
