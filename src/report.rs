use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::calendar::confirmation_date;
use crate::models::{AbsenceInterval, AbsenceKind, CategorySummary};
use crate::normalize::format_date;

pub fn summarize_by_category(intervals: &[AbsenceInterval]) -> Vec<CategorySummary> {
    let mut map: HashMap<AbsenceKind, (usize, i64, HashSet<&str>)> = HashMap::new();

    for interval in intervals {
        let entry = map
            .entry(interval.kind)
            .or_insert_with(|| (0, 0, HashSet::new()));
        entry.0 += 1;
        entry.1 += interval.day_count;
        entry.2.insert(interval.student_id.as_str());
    }

    AbsenceKind::RETAINED
        .iter()
        .filter_map(|kind| {
            map.get(kind).map(|(count, days, students)| CategorySummary {
                kind: *kind,
                interval_count: *count,
                total_days: *days,
                student_count: students.len(),
            })
        })
        .collect()
}

pub fn build_report(source: &str, intervals: &[AbsenceInterval]) -> String {
    let summaries = summarize_by_category(intervals);

    let mut output = String::new();

    let _ = writeln!(output, "# Absence Report");
    let _ = writeln!(output, "Generated from {}", source);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No absences to report.");
        return output;
    }

    for summary in summaries.iter() {
        let _ = writeln!(
            output,
            "- {}: {} intervals, {} days across {} students",
            summary.kind, summary.interval_count, summary.total_days, summary.student_count
        );
    }

    for summary in summaries.iter() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", summary.kind);
        for interval in intervals.iter().filter(|i| i.kind == summary.kind) {
            let _ = writeln!(
                output,
                "- {} {} | {} ({} days) | {} | confirm {}",
                interval.student_id,
                interval.student_name,
                interval.display_date(),
                interval.day_count,
                interval.reason,
                confirmation_date(interval.interval_end)
                    .map(format_date)
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }

    output
}
