use crate::models::{
    AnalyticsResponse, AppData, AppTheme, AttendanceRange, AttendanceStatus, ClassDetails,
    DashboardResponse, DayOfWeek, Holiday, StatusCounts,
};
use crate::navigation::AppView;
use crate::stats::date_key;
use chrono::NaiveDate;
use std::fmt::Write;

/// Bottom navigation, in display order.
const NAV_ITEMS: [AppView; 5] = [
    AppView::Dashboard,
    AppView::AttendanceLog,
    AppView::Classes,
    AppView::Analytics,
    AppView::Settings,
];

pub fn render_page(view: AppView, theme: AppTheme, clock: &str, body: &str) -> String {
    let mut nav = String::new();
    for item in NAV_ITEMS {
        let active = if item == view { " active" } else { "" };
        let _ = write!(
            nav,
            r#"<form method="post" action="/nav/{item}"><button class="nav-item{active}">{}</button></form>"#,
            item.title()
        );
    }

    PAGE_HTML
        .replace("{{THEME}}", theme.as_str())
        .replace("{{TITLE}}", view.title())
        .replace("{{CLOCK}}", &escape(clock))
        .replace("{{NAV}}", &nav)
        .replace("{{BODY}}", body)
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.0}%"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn status_buttons(date: &str, class_id: &str, current: Option<AttendanceStatus>) -> String {
    let mut out = String::new();
    for status in AttendanceStatus::ALL {
        let active = if current == Some(status) { " active" } else { "" };
        let _ = write!(
            out,
            r#"<form method="post" action="/attendance/mark">
  <input type="hidden" name="date" value="{date}" />
  <input type="hidden" name="class_id" value="{}" />
  <input type="hidden" name="status" value="{status}" />
  <input type="hidden" name="keep_existing" value="1" />
  <button class="chip {status}{active}">{status}</button>
</form>"#,
            escape(class_id),
            status = status.as_str(),
        );
    }
    out
}

fn counts_row(counts: &StatusCounts) -> String {
    format!(
        r#"<span class="chip attended">{} attended</span><span class="chip missed">{} missed</span><span class="chip cancelled">{} cancelled</span><span class="chip holiday">{} holiday</span>"#,
        counts.attended, counts.missed, counts.cancelled, counts.holiday
    )
}

pub fn dashboard(summary: &DashboardResponse) -> String {
    let mut out = format!(
        r#"<section data-view="dashboard">
<header class="view-head"><h2>{weekday}</h2><p class="subtitle">{date}</p></header>
<div class="panel">
  <div class="stat"><span class="label">Overall</span><span class="value">{overall}</span></div>
  <div class="stat"><span class="label">Today</span><span class="value">{count} classes</span></div>
</div>
"#,
        weekday = summary.weekday,
        date = summary.date,
        overall = percent(summary.overall_percentage),
        count = summary.classes_today.len(),
    );

    if let Some(holiday) = &summary.holiday {
        let _ = write!(
            out,
            r#"<p class="banner">Holiday: {}</p>"#,
            escape(&holiday.description)
        );
    }

    let biometric = if summary.biometric_marked {
        "Biometric done"
    } else {
        "Mark biometric"
    };
    let _ = write!(
        out,
        r#"<form method="post" action="/biometrics/toggle">
  <input type="hidden" name="date" value="{}" />
  <button class="btn{}">{biometric}</button>
</form>
"#,
        summary.date,
        if summary.biometric_marked { " done" } else { "" }
    );

    if summary.classes_today.is_empty() {
        out.push_str(r#"<p class="empty">Nothing scheduled today.</p>"#);
    }
    for class in &summary.classes_today {
        let _ = write!(
            out,
            r#"<article class="card">
  <h3>{name}</h3>
  <p class="subtitle">{start} to {end} &middot; {room} &middot; {teacher}</p>
  <div class="chips">{buttons}</div>
</article>
"#,
            name = escape(&class.name),
            start = escape(&class.start_time),
            end = escape(&class.end_time),
            room = escape(&class.room),
            teacher = escape(&class.teacher),
            buttons = status_buttons(&summary.date, &class.class_id, class.status),
        );
    }
    out.push_str("</section>");
    out
}

pub fn classes(classes: &[ClassDetails]) -> String {
    let mut out = String::from(
        r#"<section data-view="classes">
<header class="view-head"><h2>Subjects</h2></header>
"#,
    );

    if classes.is_empty() {
        out.push_str(r#"<p class="empty">No subjects yet.</p>"#);
    }
    for class in classes {
        let days: Vec<&str> = class.schedule.iter().map(|day| day.as_str()).collect();
        let notes = class
            .important_notes
            .as_deref()
            .map(|notes| format!(r#"<p class="notes">{}</p>"#, escape(notes)))
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<article class="card">
  <h3>{name}</h3>
  <p class="subtitle">{days} &middot; {start} to {end}</p>
  <p class="subtitle">{room} &middot; {teacher}</p>
  {notes}
  <form method="post" action="/classes/delete"><input type="hidden" name="id" value="{id}" /><button class="btn danger">Delete</button></form>
</article>
"#,
            name = escape(&class.name),
            days = days.join(", "),
            start = escape(&class.start_time),
            end = escape(&class.end_time),
            room = escape(&class.room),
            teacher = escape(&class.teacher),
            id = escape(&class.id),
        );
    }

    let mut day_boxes = String::new();
    for day in DayOfWeek::ALL {
        let _ = write!(
            day_boxes,
            r#"<label><input type="checkbox" name="{}" /> {}</label>"#,
            day.as_str().to_lowercase(),
            &day.as_str()[..3]
        );
    }
    let _ = write!(
        out,
        r#"<form class="card form" method="post" action="/classes">
  <h3>Add subject</h3>
  <input name="name" placeholder="Name" required />
  <input name="room" placeholder="Room" />
  <input name="teacher" placeholder="Teacher" />
  <div class="row"><input type="time" name="start_time" required /><input type="time" name="end_time" required /></div>
  <div class="days">{day_boxes}</div>
  <textarea name="important_notes" placeholder="Notes"></textarea>
  <button class="btn">Save</button>
</form>
</section>"#
    );
    out
}

pub fn attendance_log(data: &AppData, today: NaiveDate) -> String {
    let today = date_key(today);
    let mut out = String::from(
        r#"<section data-view="attendance_log">
<header class="view-head"><h2>Logs</h2></header>
"#,
    );

    let mut class_options = String::new();
    for class in &data.classes {
        let _ = write!(
            class_options,
            r#"<option value="{}">{}</option>"#,
            escape(&class.id),
            escape(&class.name)
        );
    }
    let mut status_options = String::new();
    for status in AttendanceStatus::ALL {
        let _ = write!(
            status_options,
            r#"<option value="{0}">{0}</option>"#,
            status.as_str()
        );
    }
    let _ = write!(
        out,
        r#"<form class="card form" method="post" action="/attendance/mark">
  <h3>Log attendance</h3>
  <input type="date" name="date" value="{today}" required />
  <select name="class_id">{class_options}</select>
  <select name="status">{status_options}</select>
  <input name="note" placeholder="Note" />
  <label><input type="checkbox" name="biometric_done" /> Biometric done</label>
  <button class="btn">Save</button>
</form>
"#
    );

    let mut records: Vec<_> = data.attendance.iter().collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));
    if records.is_empty() {
        out.push_str(r#"<p class="empty">No attendance logged.</p>"#);
    }
    for record in records {
        let name = data
            .class(&record.class_id)
            .map(|class| escape(&class.name))
            .unwrap_or_else(|| format!("Deleted subject ({})", escape(&record.class_id)));
        let note = record
            .note
            .as_deref()
            .map(|note| format!(" &middot; {}", escape(note)))
            .unwrap_or_default();
        let biometric = if record.biometric_done { " &middot; biometric" } else { "" };
        let _ = write!(
            out,
            r#"<article class="card row-card">
  <div><h3>{name}</h3><p class="subtitle">{date}{note}{biometric}</p></div>
  <span class="chip {status} active">{status}</span>
  <form method="post" action="/attendance/delete">
    <input type="hidden" name="date" value="{date}" />
    <input type="hidden" name="class_id" value="{class_id}" />
    <button class="btn danger">Remove</button>
  </form>
</article>
"#,
            date = escape(&record.date),
            status = record.status.as_str(),
            class_id = escape(&record.class_id),
        );
    }
    out.push_str("</section>");
    out
}

pub fn holidays(holidays: &[Holiday], today: NaiveDate) -> String {
    let mut out = String::from(
        r#"<section data-view="holidays">
<header class="view-head"><h2>Holidays</h2></header>
"#,
    );

    let mut sorted: Vec<&Holiday> = holidays.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    if sorted.is_empty() {
        out.push_str(r#"<p class="empty">No holidays marked.</p>"#);
    }
    for holiday in sorted {
        let _ = write!(
            out,
            r#"<article class="card row-card">
  <div><h3>{description}</h3><p class="subtitle">{date}</p></div>
  <form method="post" action="/holidays/delete"><input type="hidden" name="id" value="{id}" /><button class="btn danger">Delete</button></form>
</article>
"#,
            description = escape(&holiday.description),
            date = escape(&holiday.date),
            id = escape(&holiday.id),
        );
    }

    let _ = write!(
        out,
        r#"<form class="card form" method="post" action="/holidays">
  <h3>Add holiday</h3>
  <input type="date" name="date" value="{}" required />
  <input name="description" placeholder="Description" required />
  <button class="btn">Save</button>
</form>
</section>"#,
        date_key(today)
    );
    out
}

pub fn analytics(stats: &AnalyticsResponse) -> String {
    let mut tabs = String::new();
    for range in AttendanceRange::ALL {
        let active = if range.as_str() == stats.range { " active" } else { "" };
        let _ = write!(
            tabs,
            r#"<a class="tab{active}" href="/?range={0}">{0}</a>"#,
            range.as_str()
        );
    }

    let mut out = format!(
        r#"<section data-view="analytics">
<header class="view-head"><h2>Stats</h2><p class="subtitle">{start} to {end}</p></header>
<nav class="tabs">{tabs}</nav>
<div class="panel">
  <div class="stat"><span class="label">In range</span><span class="value">{overall}</span></div>
  <div class="stat"><span class="label">All time</span><span class="value">{all_time}</span></div>
  <div class="stat"><span class="label">Holidays</span><span class="value">{holidays}</span></div>
</div>
<div class="chips">{counts}</div>
"#,
        start = stats.start_date,
        end = stats.end_date,
        overall = percent(stats.overall_percentage),
        all_time = percent(stats.all_time_percentage),
        holidays = stats.holidays_in_range,
        counts = counts_row(&stats.overall),
    );

    for entry in &stats.per_class {
        let name = entry
            .name
            .as_deref()
            .map(escape)
            .unwrap_or_else(|| format!("Deleted subject ({})", escape(&entry.class_id)));
        let width = entry.percentage.unwrap_or(0.0).clamp(0.0, 100.0);
        let _ = write!(
            out,
            r#"<article class="card">
  <h3>{name} <small>{pct}</small></h3>
  <div class="bar"><span style="width:{width:.0}%"></span></div>
  <div class="chips">{counts}</div>
</article>
"#,
            pct = percent(entry.percentage),
            counts = counts_row(&entry.counts),
        );
    }

    out.push_str(r#"<table class="series"><tr><th>Week</th><th>Attended</th><th>Missed</th><th>Rate</th></tr>"#);
    for week in &stats.weekly_totals {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            week.week,
            week.counts.attended,
            week.counts.missed,
            percent(week.percentage)
        );
    }
    out.push_str("</table></section>");
    out
}

pub fn settings(data: &AppData) -> String {
    let mut themes = String::new();
    for theme in AppTheme::ALL {
        let active = if theme == data.theme { " active" } else { "" };
        let _ = write!(
            themes,
            r#"<form method="post" action="/theme"><input type="hidden" name="theme" value="{0}" /><button class="chip{active}">{0}</button></form>"#,
            theme.as_str()
        );
    }

    format!(
        r#"<section data-view="settings">
<header class="view-head"><h2>More</h2></header>
<article class="card"><h3>Theme</h3><div class="chips">{themes}</div></article>
<article class="card">
  <h3>Data</h3>
  <p class="subtitle">{classes} subjects &middot; {records} records &middot; {holidays} holidays</p>
  <a class="btn" href="/api/data" download="attendify.json">Export JSON</a>
  <form method="post" action="/nav/holidays"><button class="btn">Holidays</button></form>
  <form method="post" action="/reset" onsubmit="return confirm('Erase all data?')"><button class="btn danger">Reset everything</button></form>
</article>
<form method="post" action="/nav/thanks"><button class="btn">Credits</button></form>
</section>"#,
        classes = data.classes.len(),
        records = data.attendance.len(),
        holidays = data.holidays.len(),
    )
}

pub fn thanks() -> String {
    r#"<section data-view="thanks">
<header class="view-head"><h2>Thanks</h2></header>
<article class="card"><p>Attendify keeps every record on this machine. Thanks for using it.</p></article>
</section>"#
        .to_string()
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Attendify &middot; {{TITLE}}</title>
  <style>
    :root, [data-theme="cosmic"] {
      --bg-1: #1b1038;
      --bg-2: #3b1d6e;
      --ink: #f3efff;
      --muted: rgba(243, 239, 255, 0.6);
      --accent: #ff7aa2;
      --card: rgba(255, 255, 255, 0.06);
    }

    [data-theme="onyx"] {
      --bg-1: #0b0b0d;
      --bg-2: #1d1d22;
      --ink: #f5f5f5;
      --muted: rgba(245, 245, 245, 0.55);
      --accent: #f5b942;
      --card: rgba(255, 255, 255, 0.05);
    }

    [data-theme="cloud"] {
      --bg-1: #f4f6fb;
      --bg-2: #dfe7f5;
      --ink: #1f2937;
      --muted: #6b7280;
      --accent: #3b82f6;
      --card: rgba(255, 255, 255, 0.9);
    }

    [data-theme="aurora"] {
      --bg-1: #06292d;
      --bg-2: #0f5257;
      --ink: #e8fffb;
      --muted: rgba(232, 255, 251, 0.6);
      --accent: #4ade80;
      --card: rgba(255, 255, 255, 0.07);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg-1), var(--bg-2));
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
    }

    .app {
      width: min(520px, 100%);
      margin: 0 auto;
      padding: 24px 20px 140px;
      display: grid;
      gap: 18px;
    }

    .top {
      display: flex;
      align-items: center;
      justify-content: space-between;
    }

    .top h1 {
      margin: 0;
      font-size: 1.1rem;
      letter-spacing: 0.2em;
      text-transform: uppercase;
    }

    .clock {
      padding: 6px 14px;
      border-radius: 999px;
      background: rgba(0, 0, 0, 0.3);
      font-size: 0.75rem;
      font-weight: 700;
      color: var(--muted);
    }

    section {
      display: grid;
      gap: 14px;
    }

    .view-head h2 {
      margin: 0;
    }

    .subtitle, .empty, .notes {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 0.9rem;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 12px;
    }

    .stat, .card {
      background: var(--card);
      border: 1px solid rgba(255, 255, 255, 0.08);
      border-radius: 18px;
      padding: 16px;
    }

    .stat .label {
      display: block;
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    .stat .value {
      display: block;
      font-size: 1.5rem;
      font-weight: 700;
    }

    .card h3 {
      margin: 0;
    }

    .row-card {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 10px;
    }

    .form {
      display: grid;
      gap: 10px;
    }

    .row, .days, .chips {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    input, select, textarea {
      width: 100%;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(255, 255, 255, 0.15);
      background: rgba(0, 0, 0, 0.2);
      color: var(--ink);
    }

    .days input, label input[type="checkbox"] {
      width: auto;
    }

    button, .btn {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-weight: 700;
      cursor: pointer;
      background: var(--accent);
      color: #fff;
      text-decoration: none;
      display: inline-block;
    }

    .btn.danger {
      background: #b91c1c;
    }

    .btn.done {
      background: #15803d;
    }

    .chip {
      padding: 6px 12px;
      border-radius: 999px;
      font-size: 0.8rem;
      background: rgba(255, 255, 255, 0.08);
      color: var(--ink);
    }

    .chip.active.attended, span.chip.attended { background: #15803d; }
    .chip.active.missed, span.chip.missed { background: #b91c1c; }
    .chip.active.cancelled, span.chip.cancelled { background: #6b7280; }
    .chip.active.holiday, span.chip.holiday { background: #b45309; }
    .chip.active { outline: 2px solid var(--accent); }

    .banner {
      padding: 12px 16px;
      border-radius: 14px;
      background: #b45309;
    }

    .tabs {
      display: flex;
      gap: 6px;
    }

    .tab {
      padding: 8px 14px;
      border-radius: 999px;
      color: var(--muted);
      text-decoration: none;
      text-transform: capitalize;
    }

    .tab.active {
      background: var(--card);
      color: var(--ink);
    }

    .bar {
      height: 8px;
      margin: 10px 0;
      border-radius: 999px;
      background: rgba(255, 255, 255, 0.1);
      overflow: hidden;
    }

    .bar span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    .series {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.85rem;
    }

    .series td, .series th {
      padding: 6px;
      text-align: left;
      border-bottom: 1px solid rgba(255, 255, 255, 0.08);
    }

    .bottom-nav {
      position: fixed;
      bottom: 24px;
      left: 50%;
      transform: translateX(-50%);
      width: min(420px, 92%);
      display: flex;
      justify-content: space-between;
      padding: 10px;
      border-radius: 999px;
      background: rgba(0, 0, 0, 0.45);
      backdrop-filter: blur(10px);
    }

    .nav-item {
      background: transparent;
      color: var(--muted);
    }

    .nav-item.active {
      background: var(--accent);
      color: #fff;
    }
  </style>
</head>
<body>
  <main class="app">
    <header class="top">
      <form method="post" action="/nav/back"><button aria-label="Back">&larr;</button></form>
      <h1>Attendify</h1>
      <span id="clock" class="clock">{{CLOCK}}</span>
    </header>
    {{BODY}}
  </main>
  <nav class="bottom-nav">{{NAV}}</nav>
  <script>
    const clock = document.getElementById("clock");
    const tick = () => {
      clock.textContent = new Date().toLocaleTimeString([], { hour: "2-digit", minute: "2-digit", hour12: true });
    };
    const timer = setInterval(tick, 1000);
    window.addEventListener("pagehide", () => clearInterval(timer));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn page_marks_active_nav_and_theme() {
        let html = render_page(AppView::Analytics, AppTheme::Onyx, "09:41 AM", "<p>body</p>");
        assert!(html.contains(r#"data-theme="onyx""#));
        assert!(html.contains(r#"action="/nav/analytics"><button class="nav-item active">"#));
        assert!(html.contains("09:41 AM"));
        assert!(html.contains("<p>body</p>"));
        assert!(!html.contains("{{"));
    }
}
