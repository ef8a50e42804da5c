use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::{ColumnMap, ConsolidateOptions, GroupOrder, GroupingMode};
use crate::error::ConsolidateError;
use crate::models::{AbsenceInterval, AbsenceKind, AbsenceRecord, Category, RawRow, RawTable};
use crate::normalize;

/// Positions of the required columns, resolved once before any row is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    student_id: usize,
    student_name: usize,
    date: usize,
    category: usize,
    reason: usize,
}

impl ColumnIndex {
    pub fn resolve(headers: &[String], columns: &ColumnMap) -> Result<Self, ConsolidateError> {
        if headers.is_empty() {
            return Err(ConsolidateError::EmptyTable);
        }

        let mut missing = Vec::new();
        let mut find = |name: &str| {
            let position = headers.iter().position(|header| header.trim() == name);
            if position.is_none() {
                missing.push(name.to_string());
            }
            position.unwrap_or_default()
        };

        let index = Self {
            student_id: find(columns.student_id.as_str()),
            student_name: find(columns.student_name.as_str()),
            date: find(columns.date.as_str()),
            category: find(columns.category.as_str()),
            reason: find(columns.reason.as_str()),
        };

        if missing.is_empty() {
            Ok(index)
        } else {
            Err(ConsolidateError::MissingColumns(missing))
        }
    }

    pub fn row(&self, cells: &[String]) -> RawRow {
        let cell = |position: usize| cells.get(position).cloned().unwrap_or_default();
        RawRow {
            student_id: cell(self.student_id),
            student_name: cell(self.student_name),
            date: cell(self.date),
            category: cell(self.category),
            reason: cell(self.reason),
        }
    }
}

pub fn consolidate(
    table: &RawTable,
    options: &ConsolidateOptions,
) -> Result<Vec<AbsenceInterval>, ConsolidateError> {
    let index = ColumnIndex::resolve(&table.headers, &options.columns)?;

    let mut rows: Vec<RawRow> = table.rows.iter().map(|cells| index.row(cells)).collect();
    normalize::forward_fill(&mut rows);

    let records = to_records(&rows);
    if records.is_empty() {
        log::warn!("no absence rows left after filtering {} input rows", rows.len());
        return Ok(Vec::new());
    }

    let mut intervals = Vec::new();
    for group in group_records(records, options.grouping, options.group_order) {
        let dates: Vec<NaiveDate> = group.iter().map(|record| record.date).collect();
        for (start, end) in detect_runs(&dates) {
            if let Some(first) = group.iter().find(|record| record.date == start) {
                intervals.push(synthesize(first, start, end, &options.reason_placeholder));
            }
        }
    }

    order_within_student_category(&mut intervals);
    if options.sort_by_student_number {
        sort_by_student_number(&mut intervals);
    }

    log::info!(
        "consolidated {} input rows into {} intervals",
        rows.len(),
        intervals.len()
    );
    Ok(intervals)
}

fn to_records(rows: &[RawRow]) -> Vec<AbsenceRecord> {
    let mut records = Vec::new();
    let mut skipped_category = 0usize;
    let mut skipped_date = 0usize;

    for (position, row) in rows.iter().enumerate() {
        let category = normalize::normalize_category(&row.category);
        let Some(kind) = category.retained() else {
            if let Category::Unrecognized(text) = &category {
                log::debug!("row {}: unrecognized category {:?}, skipped", position + 1, text);
            }
            skipped_category += 1;
            continue;
        };

        let Some(date) = normalize::parse_date(&row.date) else {
            log::debug!("row {}: unparseable date {:?}, skipped", position + 1, row.date);
            skipped_date += 1;
            continue;
        };

        records.push(AbsenceRecord {
            student_id: row.student_id.clone(),
            student_name: row.student_name.clone(),
            date,
            kind,
            reason: normalize::clean_reason(&row.reason),
        });
    }

    if skipped_date > 0 {
        log::warn!("{skipped_date} absence rows dropped for invalid dates");
    }
    log::debug!(
        "{} absence rows retained, {} rows outside the absence categories",
        records.len(),
        skipped_category
    );
    records
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    student_id: String,
    kind: AbsenceKind,
    reason: Option<String>,
}

/// Groups in key order (or first appearance), each sorted by date with ties
/// keeping input order.
pub fn group_records(
    records: Vec<AbsenceRecord>,
    mode: GroupingMode,
    order: GroupOrder,
) -> Vec<Vec<AbsenceRecord>> {
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Vec<AbsenceRecord>)> = Vec::new();

    for record in records {
        let key = GroupKey {
            student_id: record.student_id.clone(),
            kind: record.kind,
            reason: match mode {
                GroupingMode::ByCategory => None,
                GroupingMode::ByCategoryAndReason => Some(record.reason.clone()),
            },
        };
        let position = match positions.get(&key) {
            Some(position) => *position,
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, Vec::new()));
                groups.len() - 1
            }
        };
        groups[position].1.push(record);
    }

    if order == GroupOrder::ByKey {
        groups.sort_by(|(a, _), (b, _)| {
            compare_student_ids(&a.student_id, &b.student_id)
                .then_with(|| a.kind.label().cmp(b.kind.label()))
                .then_with(|| a.reason.cmp(&b.reason))
        });
    }

    groups
        .into_iter()
        .map(|(_, mut group)| {
            group.sort_by_key(|record| record.date);
            group
        })
        .collect()
}

/// Numeric ids compare as numbers and sort before non-numeric ones.
fn compare_student_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Keeps each student's intervals of one category together and in start-date
/// order. Strict grouping splits a category into per-reason groups, which
/// would otherwise interleave.
fn order_within_student_category(intervals: &mut [AbsenceInterval]) {
    let mut ranks: HashMap<(String, AbsenceKind), usize> = HashMap::new();
    for interval in intervals.iter() {
        let next = ranks.len();
        ranks
            .entry((interval.student_id.clone(), interval.kind))
            .or_insert(next);
    }
    intervals.sort_by_cached_key(|interval| {
        let rank = ranks
            .get(&(interval.student_id.clone(), interval.kind))
            .copied()
            .unwrap_or_default();
        (rank, interval.interval_start)
    });
}

/// Maximal runs of consecutive calendar days over sorted dates. A repeated
/// date stays inside the run it belongs to.
pub fn detect_runs(dates: &[NaiveDate]) -> Vec<(NaiveDate, NaiveDate)> {
    let mut runs = Vec::new();
    let Some((&first, rest)) = dates.split_first() else {
        return runs;
    };

    let mut start = first;
    let mut end = first;
    for &date in rest {
        match (date - end).num_days() {
            0 => {}
            1 => end = date,
            _ => {
                runs.push((start, end));
                start = date;
                end = date;
            }
        }
    }
    runs.push((start, end));
    runs
}

pub fn synthesize(
    first: &AbsenceRecord,
    start: NaiveDate,
    end: NaiveDate,
    placeholder: &str,
) -> AbsenceInterval {
    let reason = if first.reason.trim().is_empty() {
        placeholder.to_string()
    } else {
        first.reason.clone()
    };

    AbsenceInterval {
        student_id: first.student_id.clone(),
        student_name: first.student_name.clone(),
        kind: first.kind,
        reason,
        interval_start: start,
        interval_end: end,
        day_count: (end - start).num_days() + 1,
    }
}

/// Numeric ids ascending, then everything else in its existing order.
pub fn sort_by_student_number(intervals: &mut [AbsenceInterval]) {
    intervals.sort_by_key(|interval| match interval.student_id.trim().parse::<i64>() {
        Ok(number) => (0, number),
        Err(_) => (1, 0),
    });
}
