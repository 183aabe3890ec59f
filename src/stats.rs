use crate::models::{
    AnalyticsResponse, AppData, AttendanceRange, AttendanceRecord, ClassStats, DailyPoint,
    DashboardResponse, DayOfWeek, ScheduledClass, StatusCounts, WeeklyPoint,
};
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::{BTreeMap, HashMap};

const WEEK_COUNT: usize = 8;

pub fn build_analytics(data: &AppData, range: AttendanceRange) -> AnalyticsResponse {
    build_analytics_at(Local::now().date_naive(), range, data)
}

pub fn build_analytics_at(
    today: NaiveDate,
    range: AttendanceRange,
    data: &AppData,
) -> AnalyticsResponse {
    let (start, end) = range_bounds(today, range);
    let dated = dated_records(data);

    let mut overall = StatusCounts::default();
    let mut all_time = StatusCounts::default();
    let mut by_class: HashMap<&str, StatusCounts> = HashMap::new();
    let mut by_day: HashMap<NaiveDate, StatusCounts> = HashMap::new();

    for (date, record) in &dated {
        all_time.add(record.status);
        by_day.entry(*date).or_default().add(record.status);
        if *date >= start && *date <= end {
            overall.add(record.status);
            by_class
                .entry(record.class_id.as_str())
                .or_default()
                .add(record.status);
        }
    }

    let mut per_class: Vec<ClassStats> = data
        .classes
        .iter()
        .map(|class| {
            let counts = by_class.remove(class.id.as_str()).unwrap_or_default();
            ClassStats {
                class_id: class.id.clone(),
                name: Some(class.name.clone()),
                counts,
                percentage: counts.percentage(),
            }
        })
        .collect();

    // Records whose class was deleted are still reported under the raw id.
    let orphans: BTreeMap<&str, StatusCounts> = by_class.into_iter().collect();
    per_class.extend(orphans.into_iter().map(|(class_id, counts)| ClassStats {
        class_id: class_id.to_string(),
        name: None,
        counts,
        percentage: counts.percentage(),
    }));

    let holidays_in_range = data
        .holidays
        .iter()
        .filter_map(|holiday| parse_key(&holiday.date))
        .filter(|date| *date >= start && *date <= end)
        .count();

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        last_7_days.push(DailyPoint {
            date: date_key(date),
            counts: by_day.get(&date).copied().unwrap_or_default(),
        });
    }

    let current_week_start = week_start(today);
    let mut weekly_totals = Vec::with_capacity(WEEK_COUNT);
    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let mut counts = StatusCounts::default();
        for day_offset in 0..7 {
            let date = start + Duration::days(day_offset);
            if let Some(day) = by_day.get(&date) {
                counts.merge(day);
            }
        }

        weekly_totals.push(WeeklyPoint {
            week: week_label(start),
            start_date: date_key(start),
            end_date: date_key(end),
            counts,
            percentage: counts.percentage(),
        });
    }

    AnalyticsResponse {
        range: range.as_str().to_string(),
        start_date: date_key(start),
        end_date: date_key(end),
        overall,
        overall_percentage: overall.percentage(),
        all_time_percentage: all_time.percentage(),
        holidays_in_range,
        per_class,
        last_7_days,
        weekly_totals,
    }
}

pub fn build_dashboard(data: &AppData) -> DashboardResponse {
    build_dashboard_at(Local::now().date_naive(), data)
}

pub fn build_dashboard_at(today: NaiveDate, data: &AppData) -> DashboardResponse {
    let date = date_key(today);
    let weekday = DayOfWeek::of(today);

    let mut classes_today: Vec<ScheduledClass> = data
        .classes
        .iter()
        .filter(|class| class.schedule.contains(&weekday))
        .map(|class| {
            let record = data.record(&date, &class.id);
            ScheduledClass {
                class_id: class.id.clone(),
                name: class.name.clone(),
                room: class.room.clone(),
                teacher: class.teacher.clone(),
                start_time: class.start_time.clone(),
                end_time: class.end_time.clone(),
                status: record.map(|record| record.status),
                biometric_done: record.is_some_and(|record| record.biometric_done),
            }
        })
        .collect();
    classes_today.sort_by(|a, b| a.start_time.cmp(&b.start_time));

    let mut all_time = StatusCounts::default();
    for record in &data.attendance {
        all_time.add(record.status);
    }

    DashboardResponse {
        holiday: data.holiday_on(&date).cloned(),
        biometric_marked: data.daily_biometrics.iter().any(|marked| *marked == date),
        overall_percentage: all_time.percentage(),
        date,
        weekday,
        classes_today,
    }
}

/// Inclusive window ending today.
pub fn range_bounds(today: NaiveDate, range: AttendanceRange) -> (NaiveDate, NaiveDate) {
    let start = match range {
        AttendanceRange::Daily => today,
        AttendanceRange::Weekly => week_start(today),
        AttendanceRange::Monthly => today.with_day(1).unwrap_or(today),
    };
    (start, today)
}

fn dated_records(data: &AppData) -> Vec<(NaiveDate, &AttendanceRecord)> {
    data.attendance
        .iter()
        .filter_map(|record| parse_key(&record.date).map(|date| (date, record)))
        .collect()
}

fn parse_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, ClassDetails, Holiday};

    fn class(id: &str, name: &str, schedule: Vec<DayOfWeek>, start: &str) -> ClassDetails {
        ClassDetails {
            id: id.into(),
            name: name.into(),
            room: "R1".into(),
            teacher: "T".into(),
            schedule,
            important_notes: None,
            start_time: start.into(),
            end_time: "23:00".into(),
            last_modified: None,
        }
    }

    fn record(date: &str, class_id: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            date: date.into(),
            class_id: class_id.into(),
            status,
            note: None,
            biometric_done: false,
            last_modified: None,
        }
    }

    // 2024-05-15 is a Wednesday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn sample() -> AppData {
        AppData {
            classes: vec![
                class("c1", "Algebra", vec![DayOfWeek::Wednesday], "10:00"),
                class("c2", "Biology", vec![DayOfWeek::Wednesday, DayOfWeek::Friday], "08:00"),
            ],
            attendance: vec![
                record("2024-05-15", "c1", AttendanceStatus::Attended),
                record("2024-05-14", "c1", AttendanceStatus::Missed),
                record("2024-05-13", "c2", AttendanceStatus::Attended),
                record("2024-05-10", "c2", AttendanceStatus::Missed),
                record("2024-05-02", "c1", AttendanceStatus::Cancelled),
                record("2024-04-30", "c1", AttendanceStatus::Attended),
                record("2024-05-14", "ghost", AttendanceStatus::Attended),
                record("not-a-date", "c1", AttendanceStatus::Missed),
            ],
            holidays: vec![Holiday {
                id: "h1".into(),
                date: "2024-05-01".into(),
                description: "Labour day".into(),
                last_modified: None,
            }],
            ..AppData::default()
        }
    }

    #[test]
    fn range_bounds_cover_day_week_month() {
        let today = today();
        assert_eq!(range_bounds(today, AttendanceRange::Daily), (today, today));
        assert_eq!(
            range_bounds(today, AttendanceRange::Weekly).0,
            NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
        );
        assert_eq!(
            range_bounds(today, AttendanceRange::Monthly).0,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }

    #[test]
    fn weekly_analytics_counts_only_this_week() {
        let stats = build_analytics_at(today(), AttendanceRange::Weekly, &sample());
        assert_eq!(stats.start_date, "2024-05-13");
        assert_eq!(stats.end_date, "2024-05-15");
        assert_eq!(stats.overall.attended, 3);
        assert_eq!(stats.overall.missed, 1);
        assert_eq!(stats.overall_percentage, Some(75.0));
        assert_eq!(stats.holidays_in_range, 0);

        let algebra = &stats.per_class[0];
        assert_eq!(algebra.class_id, "c1");
        assert_eq!(algebra.percentage, Some(50.0));
        let biology = &stats.per_class[1];
        assert_eq!(biology.percentage, Some(100.0));
    }

    #[test]
    fn dangling_class_ids_are_reported() {
        let stats = build_analytics_at(today(), AttendanceRange::Weekly, &sample());
        let ghost = stats
            .per_class
            .iter()
            .find(|entry| entry.class_id == "ghost")
            .expect("missing orphan entry");
        assert_eq!(ghost.name, None);
        assert_eq!(ghost.counts.attended, 1);
    }

    #[test]
    fn monthly_analytics_includes_holidays_and_cancellations() {
        let stats = build_analytics_at(today(), AttendanceRange::Monthly, &sample());
        assert_eq!(stats.holidays_in_range, 1);
        assert_eq!(stats.overall.cancelled, 1);
        assert_eq!(stats.overall.total(), 6);
        // 2024-04-30 falls outside May but counts toward the all-time figure.
        assert_eq!(stats.all_time_percentage, Some(4.0 * 100.0 / 6.0));
    }

    #[test]
    fn series_lengths_and_daily_points() {
        let stats = build_analytics_at(today(), AttendanceRange::Daily, &sample());
        assert_eq!(stats.last_7_days.len(), 7);
        assert_eq!(stats.weekly_totals.len(), WEEK_COUNT);
        let last = stats.last_7_days.last().unwrap();
        assert_eq!(last.date, "2024-05-15");
        assert_eq!(last.counts.attended, 1);
        let this_week = stats.weekly_totals.last().unwrap();
        assert_eq!(this_week.week, "2024-W20");
        assert_eq!(this_week.counts.total(), 4);
    }

    #[test]
    fn dashboard_lists_todays_classes_in_time_order() {
        let mut data = sample();
        data.daily_biometrics.push("2024-05-15".into());
        let dashboard = build_dashboard_at(today(), &data);
        assert_eq!(dashboard.weekday, DayOfWeek::Wednesday);
        assert!(dashboard.biometric_marked);
        assert!(dashboard.holiday.is_none());
        let names: Vec<&str> = dashboard
            .classes_today
            .iter()
            .map(|class| class.name.as_str())
            .collect();
        assert_eq!(names, vec!["Biology", "Algebra"]);
        assert_eq!(dashboard.classes_today[1].status, Some(AttendanceStatus::Attended));
        assert_eq!(dashboard.classes_today[0].status, None);
    }

    #[test]
    fn empty_data_has_no_percentages() {
        let stats = build_analytics_at(today(), AttendanceRange::Weekly, &AppData::default());
        assert!(stats.per_class.is_empty());
        assert_eq!(stats.overall_percentage, None);
        assert_eq!(stats.all_time_percentage, None);
    }
}
