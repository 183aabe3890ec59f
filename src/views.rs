use crate::models::{AppData, AttendanceRange};
use crate::navigation::AppView;
use crate::stats::{build_analytics_at, build_dashboard_at};
use crate::ui;
use chrono::NaiveDate;

/// Everything a view may need to render.
pub struct ViewContext<'a> {
    pub data: &'a AppData,
    pub today: NaiveDate,
    pub range: AttendanceRange,
}

pub fn render_view(view: AppView, ctx: &ViewContext<'_>) -> String {
    match view {
        AppView::Dashboard => ui::dashboard(&build_dashboard_at(ctx.today, ctx.data)),
        AppView::Classes => ui::classes(&ctx.data.classes),
        AppView::AttendanceLog => ui::attendance_log(ctx.data, ctx.today),
        AppView::Holidays => ui::holidays(&ctx.data.holidays, ctx.today),
        AppView::Analytics => ui::analytics(&build_analytics_at(ctx.today, ctx.range, ctx.data)),
        AppView::Settings => ui::settings(ctx.data),
        AppView::Thanks => ui::thanks(),
    }
}
