//! Colored terminal rendering for calsync-core types.

use calsync_core::{CalendarEvent, Notification, NotificationLevel};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Notification {
    fn render(&self) -> String {
        match self.level {
            NotificationLevel::Success => format!("{} {}", self.title.green().bold(), self.message.green()),
            NotificationLevel::Info => format!("{} {}", self.title.bold(), self.message.dimmed()),
            NotificationLevel::Error => format!("{} {}", self.title.red().bold(), self.message.red()),
        }
    }
}

/// One line per event: time, title, owner and id.
pub fn render_event(event: &CalendarEvent, tz: Tz) -> String {
    let id = format!("[{}]", event.id.as_deref().unwrap_or("unsaved"));
    let owner = event
        .owner_name
        .as_deref()
        .map(|name| format!(" ({name})"))
        .unwrap_or_default();

    format!(
        "  {} {}{} {}",
        format_time(event, tz),
        event.title,
        owner.dimmed(),
        id.dimmed()
    )
}

/// Events grouped under a label per local day, in list order.
pub fn render_agenda(events: &[CalendarEvent], tz: Tz, today: NaiveDate) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_date: Option<NaiveDate> = None;

    for event in events {
        let date = local_date(&event.start, tz);

        if current_date != Some(date) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(format_date_label(date, today).bold().to_string());
            current_date = Some(date);
        }

        lines.push(render_event(event, tz));
    }

    lines
}

fn local_date(dt: &DateTime<Utc>, tz: Tz) -> NaiveDate {
    dt.with_timezone(&tz).date_naive()
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}

/// Format the time span of an event (e.g. "15:00-16:00" or "all-day")
fn format_time(event: &CalendarEvent, tz: Tz) -> String {
    if event.all_day {
        return format!("{:>11}", "all-day");
    }

    let start = event.start.with_timezone(&tz);
    let end = event.end.with_timezone(&tz);
    format!("{:>11}", format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            id: Some(format!("id-{title}")),
            title: title.to_string(),
            start,
            end,
            all_day: false,
            description: None,
            related_to: None,
            owner_name: None,
        }
    }

    #[test]
    fn groups_events_by_local_day() {
        let tz: Tz = chrono_tz::America::New_York;
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let events = vec![
            // 2024-01-02 03:00 UTC is still Jan 1 in New York
            event(
                "Late",
                Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 2, 4, 0, 0).unwrap(),
            ),
            event(
                "Next",
                Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 2, 16, 0, 0).unwrap(),
            ),
        ];

        let lines = render_agenda(&events, tz, today);

        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("Today"));
        assert!(lines[1].contains("22:00-23:00"));
        assert!(lines[3].contains("Tomorrow"));
        assert!(lines[4].contains("Next"));
    }

    #[test]
    fn all_day_events_have_no_clock_time() {
        let mut e = event(
            "Holiday",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        );
        e.all_day = true;

        let line = render_event(&e, chrono_tz::UTC);
        assert!(line.contains("all-day"));
        assert!(line.contains("[id-Holiday]"));
    }

    #[test]
    fn distant_dates_are_spelled_out() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        assert_eq!(format_date_label(date, today), "Wed Feb 14 2024");
    }
}
