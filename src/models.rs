use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::from(date.weekday())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetails {
    pub id: String,
    pub name: String,
    pub room: String,
    pub teacher: String,
    pub schedule: Vec<DayOfWeek>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub important_notes: Option<String>,
    /// `HH:mm`
    pub start_time: String,
    /// `HH:mm`
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Attended,
    Missed,
    Cancelled,
    Holiday,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Attended,
        AttendanceStatus::Missed,
        AttendanceStatus::Cancelled,
        AttendanceStatus::Holiday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Attended => "attended",
            AttendanceStatus::Missed => "missed",
            AttendanceStatus::Cancelled => "cancelled",
            AttendanceStatus::Holiday => "holiday",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// `YYYY-MM-DD`
    pub date: String,
    pub class_id: String,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub biometric_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl AttendanceRecord {
    pub fn key(&self) -> (&str, &str) {
        (&self.date, &self.class_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: String,
    pub date: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTheme {
    #[default]
    Cosmic,
    Onyx,
    Cloud,
    Aurora,
}

impl AppTheme {
    pub const ALL: [AppTheme; 4] = [
        AppTheme::Cosmic,
        AppTheme::Onyx,
        AppTheme::Cloud,
        AppTheme::Aurora,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppTheme::Cosmic => "cosmic",
            AppTheme::Onyx => "onyx",
            AppTheme::Cloud => "cloud",
            AppTheme::Aurora => "aurora",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceRange {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl AttendanceRange {
    pub const ALL: [AttendanceRange; 3] = [
        AttendanceRange::Daily,
        AttendanceRange::Weekly,
        AttendanceRange::Monthly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceRange::Daily => "daily",
            AttendanceRange::Weekly => "weekly",
            AttendanceRange::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|range| range.as_str() == value)
    }
}

/// The whole persisted state. Mutations never edit it in place: each one
/// builds a new value with a single collection replaced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub classes: Vec<ClassDetails>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub daily_biometrics: Vec<String>,
    #[serde(default)]
    pub theme: AppTheme,
}

impl AppData {
    pub fn with_classes(&self, classes: Vec<ClassDetails>) -> Self {
        Self {
            classes,
            ..self.clone()
        }
    }

    pub fn with_attendance(&self, attendance: Vec<AttendanceRecord>) -> Self {
        Self {
            attendance,
            ..self.clone()
        }
    }

    pub fn with_holidays(&self, holidays: Vec<Holiday>) -> Self {
        Self {
            holidays,
            ..self.clone()
        }
    }

    pub fn with_daily_biometrics(&self, daily_biometrics: Vec<String>) -> Self {
        Self {
            daily_biometrics,
            ..self.clone()
        }
    }

    pub fn with_theme(&self, theme: AppTheme) -> Self {
        Self {
            theme,
            ..self.clone()
        }
    }

    pub fn class(&self, id: &str) -> Option<&ClassDetails> {
        self.classes.iter().find(|class| class.id == id)
    }

    pub fn record(&self, date: &str, class_id: &str) -> Option<&AttendanceRecord> {
        self.attendance
            .iter()
            .find(|record| record.key() == (date, class_id))
    }

    pub fn holiday_on(&self, date: &str) -> Option<&Holiday> {
        self.holidays.iter().find(|holiday| holiday.date == date)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInput {
    pub name: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub teacher: String,
    pub schedule: Vec<DayOfWeek>,
    #[serde(default)]
    pub important_notes: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceInput {
    pub date: String,
    pub class_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub biometric_done: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HolidayInput {
    pub date: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: AppTheme,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub view: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub date: Option<String>,
    pub class_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub current: String,
    pub history: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BiometricsResponse {
    pub date: String,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub attended: u32,
    pub missed: u32,
    pub cancelled: u32,
    pub holiday: u32,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        let slot = match status {
            AttendanceStatus::Attended => &mut self.attended,
            AttendanceStatus::Missed => &mut self.missed,
            AttendanceStatus::Cancelled => &mut self.cancelled,
            AttendanceStatus::Holiday => &mut self.holiday,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn merge(&mut self, other: &StatusCounts) {
        self.attended = self.attended.saturating_add(other.attended);
        self.missed = self.missed.saturating_add(other.missed);
        self.cancelled = self.cancelled.saturating_add(other.cancelled);
        self.holiday = self.holiday.saturating_add(other.holiday);
    }

    pub fn total(&self) -> u32 {
        self.attended
            .saturating_add(self.missed)
            .saturating_add(self.cancelled)
            .saturating_add(self.holiday)
    }

    /// Share of held sessions that were attended. Cancelled and holiday
    /// sessions are not held, so they are left out of the denominator.
    pub fn percentage(&self) -> Option<f64> {
        let held = self.attended.saturating_add(self.missed);
        if held == 0 {
            None
        } else {
            Some(f64::from(self.attended) * 100.0 / f64::from(held))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClassStats {
    pub class_id: String,
    pub name: Option<String>,
    pub counts: StatusCounts,
    pub percentage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub counts: StatusCounts,
}

#[derive(Debug, Serialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub counts: StatusCounts,
    pub percentage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub range: String,
    pub start_date: String,
    pub end_date: String,
    pub overall: StatusCounts,
    pub overall_percentage: Option<f64>,
    pub all_time_percentage: Option<f64>,
    pub holidays_in_range: usize,
    pub per_class: Vec<ClassStats>,
    pub last_7_days: Vec<DailyPoint>,
    pub weekly_totals: Vec<WeeklyPoint>,
}

#[derive(Debug, Serialize)]
pub struct ScheduledClass {
    pub class_id: String,
    pub name: String,
    pub room: String,
    pub teacher: String,
    pub start_time: String,
    pub end_time: String,
    pub status: Option<AttendanceStatus>,
    pub biometric_done: bool,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub date: String,
    pub weekday: DayOfWeek,
    pub classes_today: Vec<ScheduledClass>,
    pub holiday: Option<Holiday>,
    pub biometric_marked: bool,
    pub overall_percentage: Option<f64>,
}
