//! Validation and the narrow per-collection updates. Every function here is
//! pure: it takes the current collection and returns the replacement.

use crate::errors::AppError;
use crate::models::{
    AppData, AttendanceInput, AttendanceRecord, AttendanceStatus, ClassDetails, ClassInput,
    Holiday, HolidayInput,
};
use chrono::{NaiveDate, NaiveTime, SecondsFormat, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_id() -> String {
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{:x}{:04x}", Utc::now().timestamp_millis(), seq & 0xffff)
}

fn unique_id<'a>(taken: impl Iterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = taken.collect();
    loop {
        let id = new_id();
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    let value = value.trim();
    if value.len() != 10 {
        return Err(AppError::bad_request(format!(
            "invalid date '{value}', expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    let value = value.trim();
    if value.len() != 5 {
        return Err(AppError::bad_request(format!(
            "invalid time '{value}', expected HH:mm"
        )));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::bad_request(format!("invalid time '{value}', expected HH:mm")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub fn validate_class(input: &ClassInput) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::bad_request("class name must not be empty"));
    }
    if input.schedule.is_empty() {
        return Err(AppError::bad_request("schedule must contain at least one day"));
    }
    let mut seen = HashSet::new();
    for day in &input.schedule {
        if !seen.insert(*day) {
            return Err(AppError::bad_request(format!(
                "schedule lists {day} more than once"
            )));
        }
    }
    let start = parse_time(&input.start_time)?;
    let end = parse_time(&input.end_time)?;
    if start >= end {
        return Err(AppError::bad_request("start time must be before end time"));
    }
    Ok(())
}

fn build_class(id: String, input: ClassInput, stamp: &str) -> ClassDetails {
    ClassDetails {
        id,
        name: input.name.trim().to_string(),
        room: input.room.trim().to_string(),
        teacher: input.teacher.trim().to_string(),
        schedule: input.schedule,
        important_notes: non_empty(input.important_notes),
        start_time: input.start_time.trim().to_string(),
        end_time: input.end_time.trim().to_string(),
        last_modified: Some(stamp.to_string()),
    }
}

pub fn create_class(
    classes: &[ClassDetails],
    input: ClassInput,
    stamp: &str,
) -> Result<(Vec<ClassDetails>, ClassDetails), AppError> {
    validate_class(&input)?;
    let id = unique_id(classes.iter().map(|class| class.id.as_str()));
    let class = build_class(id, input, stamp);
    let mut next = classes.to_vec();
    next.push(class.clone());
    Ok((next, class))
}

pub fn update_class(
    classes: &[ClassDetails],
    id: &str,
    input: ClassInput,
    stamp: &str,
) -> Result<(Vec<ClassDetails>, ClassDetails), AppError> {
    validate_class(&input)?;
    let index = classes
        .iter()
        .position(|class| class.id == id)
        .ok_or_else(|| AppError::not_found(format!("class '{id}' not found")))?;
    let class = build_class(id.to_string(), input, stamp);
    let mut next = classes.to_vec();
    next[index] = class.clone();
    Ok((next, class))
}

/// Attendance that points at the class is left alone.
pub fn delete_class(classes: &[ClassDetails], id: &str) -> Result<Vec<ClassDetails>, AppError> {
    if !classes.iter().any(|class| class.id == id) {
        return Err(AppError::not_found(format!("class '{id}' not found")));
    }
    Ok(classes.iter().filter(|class| class.id != id).cloned().collect())
}

/// Inserts or replaces the record for `(date, classId)`, keeping at most one
/// record per class per day. A replaced record keeps its position.
pub fn upsert_attendance(
    records: &[AttendanceRecord],
    input: AttendanceInput,
    stamp: &str,
) -> Result<(Vec<AttendanceRecord>, AttendanceRecord), AppError> {
    let date = parse_date(&input.date)?.format("%Y-%m-%d").to_string();
    let class_id = input.class_id.trim().to_string();
    if class_id.is_empty() {
        return Err(AppError::bad_request("classId must not be empty"));
    }

    let record = AttendanceRecord {
        date,
        class_id,
        status: input.status,
        note: non_empty(input.note),
        biometric_done: input.biometric_done,
        last_modified: Some(stamp.to_string()),
    };

    let mut next: Vec<AttendanceRecord> = Vec::with_capacity(records.len() + 1);
    let mut replaced = false;
    for existing in records {
        if existing.key() == record.key() {
            if !replaced {
                next.push(record.clone());
                replaced = true;
            }
        } else {
            next.push(existing.clone());
        }
    }
    if !replaced {
        next.push(record.clone());
    }
    Ok((next, record))
}

/// Sets only the status for `(date, classId)`. The note and biometric flag of
/// an existing record are carried over; a new record starts without them.
pub fn set_attendance_status(
    records: &[AttendanceRecord],
    date: &str,
    class_id: &str,
    status: AttendanceStatus,
    stamp: &str,
) -> Result<(Vec<AttendanceRecord>, AttendanceRecord), AppError> {
    let date = parse_date(date)?.format("%Y-%m-%d").to_string();
    let class_id = class_id.trim();
    let existing = records
        .iter()
        .find(|record| record.key() == (date.as_str(), class_id));
    let input = AttendanceInput {
        note: existing.and_then(|record| record.note.clone()),
        biometric_done: existing.is_some_and(|record| record.biometric_done),
        date,
        class_id: class_id.to_string(),
        status,
    };
    upsert_attendance(records, input, stamp)
}

pub fn delete_attendance(
    records: &[AttendanceRecord],
    date: &str,
    class_id: &str,
) -> Result<Vec<AttendanceRecord>, AppError> {
    if !records.iter().any(|record| record.key() == (date, class_id)) {
        return Err(AppError::not_found(format!(
            "no attendance for class '{class_id}' on {date}"
        )));
    }
    Ok(records
        .iter()
        .filter(|record| record.key() != (date, class_id))
        .cloned()
        .collect())
}

pub fn create_holiday(
    holidays: &[Holiday],
    input: HolidayInput,
    stamp: &str,
) -> Result<(Vec<Holiday>, Holiday), AppError> {
    let date = parse_date(&input.date)?.format("%Y-%m-%d").to_string();
    let description = input.description.trim().to_string();
    if description.is_empty() {
        return Err(AppError::bad_request("holiday description must not be empty"));
    }
    let holiday = Holiday {
        id: unique_id(holidays.iter().map(|holiday| holiday.id.as_str())),
        date,
        description,
        last_modified: Some(stamp.to_string()),
    };
    let mut next = holidays.to_vec();
    next.push(holiday.clone());
    Ok((next, holiday))
}

pub fn delete_holiday(holidays: &[Holiday], id: &str) -> Result<Vec<Holiday>, AppError> {
    if !holidays.iter().any(|holiday| holiday.id == id) {
        return Err(AppError::not_found(format!("holiday '{id}' not found")));
    }
    Ok(holidays
        .iter()
        .filter(|holiday| holiday.id != id)
        .cloned()
        .collect())
}

/// Adds `date` when absent, removes it when present. Returns the new list and
/// whether the date is now marked.
pub fn toggle_biometric(dates: &[String], date: &str) -> Result<(Vec<String>, bool), AppError> {
    let date = parse_date(date)?.format("%Y-%m-%d").to_string();
    if dates.contains(&date) {
        Ok((dates.iter().filter(|d| **d != date).cloned().collect(), false))
    } else {
        let mut next = dates.to_vec();
        next.push(date);
        next.sort();
        Ok((next, true))
    }
}

/// Checks an imported document before it replaces the current one.
pub fn validate_import(data: &AppData) -> Result<(), AppError> {
    let mut ids = HashSet::new();
    for class in &data.classes {
        if !ids.insert(class.id.as_str()) {
            return Err(AppError::bad_request(format!(
                "duplicate class id '{}'",
                class.id
            )));
        }
    }

    let mut ids = HashSet::new();
    for holiday in &data.holidays {
        if !ids.insert(holiday.id.as_str()) {
            return Err(AppError::bad_request(format!(
                "duplicate holiday id '{}'",
                holiday.id
            )));
        }
    }

    let mut keys = HashSet::new();
    for record in &data.attendance {
        if !keys.insert(record.key()) {
            return Err(AppError::bad_request(format!(
                "duplicate attendance for class '{}' on {}",
                record.class_id, record.date
            )));
        }
    }
    Ok(())
}
