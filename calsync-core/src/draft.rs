//! User-entered event drafts and their validation.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::event::{CalendarEvent, Relation};
use crate::time::{is_date_only, parse_timestamp, to_canonical};

/// A new event as typed into the form, before validation.
///
/// Timestamps are kept as entered; [`Draft::validate`] normalizes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub description: Option<String>,
    /// Record this event should be attached to
    #[serde(default)]
    pub scope_id: Option<String>,
}

/// Form pre-filled from a range selection in the calendar view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftForm {
    pub title: String,
    pub start: String,
    pub end: String,
    pub all_day: bool,
    pub scope_id: Option<String>,
}

impl From<DraftForm> for Draft {
    fn from(form: DraftForm) -> Self {
        Draft {
            title: form.title,
            start: form.start,
            end: form.end,
            all_day: form.all_day,
            description: None,
            scope_id: form.scope_id,
        }
    }
}

impl Draft {
    pub fn new(title: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Draft {
            title: title.into(),
            start: start.into(),
            end: end.into(),
            ..Default::default()
        }
    }

    /// Validate and normalize into an unsaved event.
    ///
    /// The title is trimmed, timestamps are parsed in `tz` and must satisfy
    /// `start <= end`. A draft whose start and end are bare dates is all-day
    /// regardless of the flag.
    pub fn validate(&self, tz: Tz, related_to: Option<Relation>) -> Result<CalendarEvent, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let start = parse_timestamp(&self.start, tz)?;
        let end = parse_timestamp(&self.end, tz)?;

        let event = CalendarEvent {
            id: None,
            title: title.to_string(),
            start,
            end,
            all_day: self.all_day || (is_date_only(&self.start) && is_date_only(&self.end)),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            related_to,
            owner_name: None,
        };
        event.validate()?;

        Ok(event)
    }
}

impl DraftForm {
    /// Build a form for a selected range, timestamps in canonical form.
    pub fn for_range(
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
        all_day: bool,
        scope_id: Option<String>,
    ) -> Self {
        DraftForm {
            title: String::new(),
            start: to_canonical(&start),
            end: to_canonical(&end),
            all_day,
            scope_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn demo_draft_normalizes() {
        let draft = Draft::new("Demo", "2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z");
        let event = draft.validate(chrono_tz::UTC, None).unwrap();
        assert_eq!(event.id, None);
        assert_eq!(event.title, "Demo");
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        assert!(!event.all_day);
    }

    #[test]
    fn bad_draft_is_rejected() {
        let draft = Draft::new("Bad", "2024-01-01T10:00:00Z", "2024-01-01T09:00:00Z");
        assert!(matches!(
            draft.validate(chrono_tz::UTC, None),
            Err(ValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn title_is_trimmed() {
        let draft = Draft::new("  Lunch  ", "2024-01-01T12:00", "2024-01-01T13:00");
        assert_eq!(draft.validate(chrono_tz::UTC, None).unwrap().title, "Lunch");
    }

    #[test]
    fn missing_title_is_rejected() {
        let draft = Draft::new("", "2024-01-01T12:00", "2024-01-01T13:00");
        assert_eq!(draft.validate(chrono_tz::UTC, None), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn bare_dates_make_all_day() {
        let draft = Draft::new("Offsite", "2024-05-02", "2024-05-03");
        assert!(draft.validate(chrono_tz::UTC, None).unwrap().all_day);
    }

    #[test]
    fn blank_description_is_dropped() {
        let mut draft = Draft::new("Call", "2024-01-01T12:00", "2024-01-01T13:00");
        draft.description = Some("   ".into());
        assert_eq!(draft.validate(chrono_tz::UTC, None).unwrap().description, None);
    }

    #[test]
    fn range_form_is_canonical() {
        let form = DraftForm::for_range(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
            false,
            Some("001A".into()),
        );
        assert_eq!(form.start, "2024-01-01T09:00:00.000Z");
        assert_eq!(form.end, "2024-01-01T09:30:00.000Z");
        assert!(form.title.is_empty());
    }
}
