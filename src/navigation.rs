use std::collections::VecDeque;
use std::fmt;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppView {
    #[default]
    Dashboard,
    Classes,
    AttendanceLog,
    Holidays,
    Analytics,
    Settings,
    Thanks,
}

impl AppView {
    pub const ALL: [AppView; 7] = [
        AppView::Dashboard,
        AppView::Classes,
        AppView::AttendanceLog,
        AppView::Holidays,
        AppView::Analytics,
        AppView::Settings,
        AppView::Thanks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppView::Dashboard => "dashboard",
            AppView::Classes => "classes",
            AppView::AttendanceLog => "attendance_log",
            AppView::Holidays => "holidays",
            AppView::Analytics => "analytics",
            AppView::Settings => "settings",
            AppView::Thanks => "thanks",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.as_str() == value)
    }

    /// Unknown identifiers land on the dashboard.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value.trim()).unwrap_or_default()
    }

    pub fn title(self) -> &'static str {
        match self {
            AppView::Dashboard => "Home",
            AppView::Classes => "Subjects",
            AppView::AttendanceLog => "Logs",
            AppView::Holidays => "Holidays",
            AppView::Analytics => "Stats",
            AppView::Settings => "More",
            AppView::Thanks => "Thanks",
        }
    }
}

impl fmt::Display for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current view plus a back stack. The stack is bounded: once full, the
/// oldest entry is dropped to make room.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: AppView,
    history: VecDeque<AppView>,
    limit: usize,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl Navigator {
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            current: AppView::Dashboard,
            history: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    pub fn current(&self) -> AppView {
        self.current
    }

    pub fn history(&self) -> impl Iterator<Item = AppView> + '_ {
        self.history.iter().copied()
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Returns `false` when `view` is already current; history is untouched.
    pub fn navigate_to(&mut self, view: AppView) -> bool {
        if view == self.current {
            return false;
        }
        if self.history.len() == self.limit {
            self.history.pop_front();
        }
        self.history.push_back(self.current);
        self.current = view;
        true
    }

    pub fn go_back(&mut self) -> AppView {
        self.current = self.history.pop_back().unwrap_or(AppView::Dashboard);
        self.current
    }
}
