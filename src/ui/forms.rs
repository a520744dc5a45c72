use std::collections::BTreeSet;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use rusqlite::types::Value;
use tracing::warn;

use crate::config::{DATE_FORMAT, SCORE_MAX, SCORE_MIN, TIME_FORMAT};
use crate::models::{Item, ItemScores, ITEM_COUNT};

use super::helpers::score_gauge;

/// Width reserved for field labels so the sliders line up.
const LABEL_WIDTH: usize = 14;

/// Fields of the questionnaire form in focus order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormField {
    Date,
    Time,
    Score(Item),
}

impl Default for FormField {
    fn default() -> Self {
        FormField::Score(Item::ALL[0])
    }
}

impl FormField {
    pub(crate) const COUNT: usize = ITEM_COUNT + 2;

    fn index(self) -> usize {
        match self {
            FormField::Date => 0,
            FormField::Time => 1,
            FormField::Score(item) => {
                2 + Item::ALL
                    .iter()
                    .position(|candidate| *candidate == item)
                    .unwrap_or(0)
            }
        }
    }

    fn from_index(index: usize) -> Self {
        match index {
            0 => FormField::Date,
            1 => FormField::Time,
            n => FormField::Score(Item::ALL[(n - 2).min(ITEM_COUNT - 1)]),
        }
    }
}

/// Live, uncommitted questionnaire values.
///
/// `summary` is recomputed eagerly whenever an item changes, so it always
/// matches `scores`. Date and time are kept as the text the user typed and
/// are only parsed when a snapshot is taken.
#[derive(Clone, Debug)]
pub(crate) struct BeckForm {
    pub(crate) date: String,
    pub(crate) time: String,
    pub(crate) scores: ItemScores,
    pub(crate) summary: i64,
    pub(crate) active: FormField,
    pub(crate) error: Option<String>,
}

impl BeckForm {
    /// Fresh form stamped with the current local date and time.
    pub(crate) fn new() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub(crate) fn at(now: NaiveDateTime) -> Self {
        let mut form = Self {
            date: String::new(),
            time: String::new(),
            scores: ItemScores::default(),
            summary: 0,
            active: FormField::default(),
            error: None,
        };
        form.reset_at(now);
        form
    }

    /// Store `value` for `item`, clamped to the accepted score range, and
    /// return what was actually stored.
    pub(crate) fn set(&mut self, item: Item, value: i64) -> i64 {
        let clamped = value.clamp(SCORE_MIN, SCORE_MAX);
        self.scores.set(item, clamped);
        self.recompute_summary();
        clamped
    }

    /// Slider-style nudge.
    pub(crate) fn step(&mut self, item: Item, delta: i64) -> i64 {
        let current = self.scores.get(item);
        self.set(item, current.saturating_add(delta))
    }

    pub(crate) fn recompute_summary(&mut self) {
        self.summary = self.scores.summary();
    }

    /// Values in `beck_table` column order: date, time, the twelve items, and
    /// the summary. A date or time that does not parse is logged and left out,
    /// so the result can be shorter than the insert expects; the store rejects
    /// such a snapshot before executing.
    pub(crate) fn snapshot(&self) -> Vec<Value> {
        let mut values = Vec::with_capacity(FormField::COUNT + 1);

        match NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT) {
            Ok(date) => values.push(Value::Text(date.format(DATE_FORMAT).to_string())),
            Err(err) => {
                warn!(field = "beck_date", value = %self.date, error = %err, "unable to read form field");
            }
        }

        match NaiveTime::parse_from_str(self.time.trim(), TIME_FORMAT) {
            Ok(time) => values.push(Value::Text(time.format(TIME_FORMAT).to_string())),
            Err(err) => {
                warn!(field = "beck_time", value = %self.time, error = %err, "unable to read form field");
            }
        }

        values.extend(self.scores.values().into_iter().map(Value::Integer));
        values.push(Value::Integer(self.summary));
        values
    }

    /// Clear the form back to "now" with every item at zero.
    pub(crate) fn reset(&mut self) {
        self.reset_at(Local::now().naive_local());
    }

    pub(crate) fn reset_at(&mut self, now: NaiveDateTime) {
        self.date = now.date().format(DATE_FORMAT).to_string();
        self.time = now.time().format(TIME_FORMAT).to_string();
        self.scores = ItemScores::default();
        self.summary = 0;
        self.error = None;
    }

    pub(crate) fn focus(&mut self, field: FormField) {
        self.active = field;
    }

    pub(crate) fn focus_next(&mut self) {
        let next = (self.active.index() + 1) % FormField::COUNT;
        self.active = FormField::from_index(next);
    }

    pub(crate) fn focus_prev(&mut self) {
        let prev = (self.active.index() + FormField::COUNT - 1) % FormField::COUNT;
        self.active = FormField::from_index(prev);
    }

    /// Feed a typed character to the focused field. Digits set a score
    /// directly (clamped); date and time accept digits and their separator.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            FormField::Date => push_limited(&mut self.date, ch, '-', 10),
            FormField::Time => push_limited(&mut self.time, ch, ':', 8),
            FormField::Score(item) => match ch.to_digit(10) {
                Some(digit) => {
                    self.set(item, i64::from(digit));
                    true
                }
                None => false,
            },
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            FormField::Date => {
                self.date.pop();
            }
            FormField::Time => {
                self.time.pop();
            }
            FormField::Score(item) => {
                self.set(item, SCORE_MIN);
            }
        }
    }

    /// Whether the focused field is free text (date/time).
    pub(crate) fn editing_text(&self) -> bool {
        matches!(self.active, FormField::Date | FormField::Time)
    }

    /// Render one form row. The focused row is highlighted in yellow.
    pub(crate) fn build_line(&self, field: FormField) -> Line<'static> {
        let is_active = self.active == field;
        let pointer = if is_active { "▶ " } else { "  " };
        let label_style = if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let (label, value) = match field {
            FormField::Date => ("Date", self.date.clone()),
            FormField::Time => ("Time", self.time.clone()),
            FormField::Score(item) => {
                let score = self.scores.get(item);
                (
                    item.label(),
                    format!("{} {score}", score_gauge(score, SCORE_MAX)),
                )
            }
        };

        let value_style = if is_active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(pointer),
            Span::styled(format!("{label:<LABEL_WIDTH$}"), label_style),
            Span::styled(value, value_style),
        ])
    }

    /// Read-only summary row shown under the sliders.
    pub(crate) fn summary_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("{:<LABEL_WIDTH$}", "Summary"),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                self.summary.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])
    }
}

fn push_limited(field: &mut String, ch: char, separator: char, max_len: usize) -> bool {
    if (ch.is_ascii_digit() || ch == separator) && field.chars().count() < max_len {
        field.push(ch);
        true
    } else {
        false
    }
}

/// State for confirming deletion of the selected table rows.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmEntryDelete {
    pub(crate) ids: BTreeSet<i64>,
    /// Timestamp of the first selected entry, for the dialog text.
    pub(crate) first_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn set_clamps_to_range() {
        let mut form = BeckForm::at(fixed_now());
        for item in Item::ALL {
            assert_eq!(form.set(item, 7), SCORE_MAX);
            assert_eq!(form.scores.get(item), SCORE_MAX);
            assert_eq!(form.set(item, -4), SCORE_MIN);
            assert_eq!(form.scores.get(item), SCORE_MIN);
        }
    }

    #[test]
    fn summary_tracks_every_change() {
        let mut form = BeckForm::at(fixed_now());
        let values = [0, 1, 2, 0, 3, 0, 0, 0, 0, 0, 0, 0];
        for (item, value) in Item::ALL.into_iter().zip(values) {
            form.set(item, value);
        }
        assert_eq!(form.summary, 6);

        form.step(Item::Sleep, 1);
        assert_eq!(form.summary, 7);
        form.step(Item::Sleep, -5);
        assert_eq!(form.scores.sleep, 0);
        assert_eq!(form.summary, 6);
    }

    #[test]
    fn snapshot_is_in_column_order() {
        let mut form = BeckForm::at(fixed_now());
        form.set(Item::Sadness, 3);
        form.set(Item::Sleep, 1);

        let values = form.snapshot();
        assert_eq!(values.len(), 15);
        assert_eq!(values[0], Value::Text("2024-01-15".into()));
        assert_eq!(values[1], Value::Text("09:30:00".into()));
        assert_eq!(values[2], Value::Integer(3));
        assert_eq!(values[13], Value::Integer(1));
        assert_eq!(values[14], Value::Integer(4));
    }

    #[test]
    fn unreadable_date_is_left_out_of_snapshot() {
        let mut form = BeckForm::at(fixed_now());
        form.date = "2024-13-".into();

        let values = form.snapshot();
        assert_eq!(values.len(), 14);
        assert_eq!(values[0], Value::Text("09:30:00".into()));
    }

    #[test]
    fn reset_at_clears_scores_and_stamps_time() {
        let mut form = BeckForm::at(fixed_now());
        form.set(Item::Guilt, 2);
        form.error = Some("boom".into());

        let later = fixed_now() + Duration::hours(3);
        form.reset_at(later);
        assert_eq!(form.date, "2024-01-15");
        assert_eq!(form.time, "12:30:00");
        assert_eq!(form.scores, ItemScores::default());
        assert_eq!(form.summary, 0);
        assert!(form.error.is_none());
    }

    #[test]
    fn reset_uses_the_current_clock() {
        let mut form = BeckForm::at(fixed_now());
        form.set(Item::Effort, 3);

        let before = Local::now().naive_local() - Duration::seconds(1);
        form.reset();
        let after = Local::now().naive_local();

        let stamped = NaiveDateTime::parse_from_str(
            &format!("{} {}", form.date, form.time),
            "%Y-%m-%d %H:%M:%S",
        )
        .unwrap();
        assert!(stamped >= before && stamped <= after);
        assert!(form.scores.values().iter().all(|v| *v == 0));
        assert_eq!(form.summary, 0);
    }

    #[test]
    fn typed_digits_drive_the_focused_field() {
        let mut form = BeckForm::at(fixed_now());
        form.focus(FormField::Score(Item::Hygiene));
        assert!(form.push_char('9'));
        assert_eq!(form.scores.hygiene, SCORE_MAX);
        assert!(!form.push_char('x'));
        form.backspace();
        assert_eq!(form.scores.hygiene, 0);

        form.focus(FormField::Date);
        form.date.clear();
        for ch in "2024-02-29x".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.date, "2024-02-29");
        assert!(!form.push_char('1'));
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = BeckForm::at(fixed_now());
        form.focus(FormField::Date);
        form.focus_prev();
        assert_eq!(form.active, FormField::Score(Item::Sleep));
        form.focus_next();
        assert_eq!(form.active, FormField::Date);
        form.focus_next();
        form.focus_next();
        assert_eq!(form.active, FormField::Score(Item::Sadness));
    }
}
