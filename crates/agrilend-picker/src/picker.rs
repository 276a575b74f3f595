//! Open/close and selection state of a date picker.

use agrilend_browser::{DateRange, FilterValue, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PickerError, Result};
use crate::position::{compute_position, Point, Position, Rect, Size};

/// Trigger text when nothing is selected.
pub const PLACEHOLDER: &str = "Pick a date";

const LABEL_FORMAT: &str = "%b %d, %Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerMode {
    #[default]
    Single,
    Range,
}

/// What the picker currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PickedDates {
    #[default]
    Empty,
    Single {
        date: NaiveDate,
    },
    /// `to` is `None` while the second click is pending.
    Range {
        from: NaiveDate,
        to: Option<NaiveDate>,
    },
}

impl PickedDates {
    pub fn is_empty(&self) -> bool {
        matches!(self, PickedDates::Empty)
    }

    /// Filter value for the browser, `None` when nothing is picked.
    pub fn to_filter_value(&self) -> Option<FilterValue> {
        match *self {
            PickedDates::Empty => None,
            PickedDates::Single { date } => Some(FilterValue::Date(Timestamp::from_date(date))),
            PickedDates::Range { from, to } => Some(FilterValue::Range(DateRange::new(
                Some(Timestamp::from_date(from)),
                to.map(Timestamp::from_date),
            ))),
        }
    }

    /// Trigger text: `"Jan 05, 2024"` or `"Jan 05, 2024 - Jan 09, 2024"`.
    pub fn label(&self) -> String {
        match *self {
            PickedDates::Empty => PLACEHOLDER.to_string(),
            PickedDates::Single { date } | PickedDates::Range { from: date, to: None } => {
                date.format(LABEL_FORMAT).to_string()
            }
            PickedDates::Range { from, to: Some(to) } => format!(
                "{} - {}",
                from.format(LABEL_FORMAT),
                to.format(LABEL_FORMAT)
            ),
        }
    }
}

/// Reads a `YYYY-MM-DD` day as typed into the picker's text field.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|source| PickerError::InvalidDate {
        input: input.to_string(),
        source,
    })
}

/// A trigger button plus its floating calendar.
///
/// In range mode the first pick starts a partial range and marks the picker
/// as selecting; the second pick completes the range and closes it. Closing
/// by any route ends the selecting phase.
///
/// ```
/// use agrilend_picker::{DatePicker, PickerMode, Rect, Size};
/// use chrono::NaiveDate;
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let mut picker = DatePicker::new(PickerMode::Range);
///
/// let trigger = Rect::new(10.0, 10.0, 200.0, 36.0);
/// picker.open(trigger, Size::new(300.0, 320.0), Size::new(1024.0, 768.0));
/// picker.pick(day(9));
/// assert!(picker.is_selecting());
/// picker.pick(day(5));
///
/// assert!(!picker.is_open());
/// assert_eq!(picker.label(), "Jan 05, 2024 - Jan 09, 2024");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatePicker {
    mode: PickerMode,
    value: PickedDates,
    selecting: bool,
    open: Option<OpenSurface>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenSurface {
    trigger: Rect,
    surface: Rect,
}

impl DatePicker {
    pub fn new(mode: PickerMode) -> Self {
        DatePicker {
            mode,
            ..Default::default()
        }
    }

    /// Starts with `value` already picked.
    pub fn with_value(mut self, value: PickedDates) -> Self {
        self.value = value;
        self
    }

    pub fn mode(&self) -> PickerMode {
        self.mode
    }

    pub fn value(&self) -> PickedDates {
        self.value
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// `true` between the two picks of a range.
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Opens the calendar next to `trigger` and returns where it was placed.
    pub fn open(&mut self, trigger: Rect, surface: Size, viewport: Size) -> Position {
        let position = compute_position(trigger, surface, viewport);
        self.open = Some(OpenSurface {
            trigger,
            surface: position.rect(surface),
        });
        let (vertical, horizontal) = (position.vertical, position.horizontal);
        log::debug!("picker opened {vertical:?}/{horizontal:?}");
        position
    }

    pub fn close(&mut self) {
        if self.open.take().is_some() {
            log::debug!("picker closed");
        }
        self.selecting = false;
    }

    /// Pointer pressed somewhere on the page. A press outside both the trigger
    /// and the surface closes the picker; returns whether it did.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        match self.open {
            Some(open) if !open.trigger.contains(point) && !open.surface.contains(point) => {
                self.close();
                true
            }
            _ => false,
        }
    }

    /// A day was clicked in the calendar.
    pub fn pick(&mut self, date: NaiveDate) {
        match self.mode {
            PickerMode::Single => {
                self.value = PickedDates::Single { date };
                self.close();
            }
            PickerMode::Range => match self.value {
                PickedDates::Range { from, to: None } if self.selecting => {
                    let (from, to) = (from.min(date), from.max(date));
                    self.value = PickedDates::Range { from, to: Some(to) };
                    self.close();
                }
                _ => {
                    self.value = PickedDates::Range {
                        from: date,
                        to: None,
                    };
                    self.selecting = true;
                }
            },
        }
    }

    /// Sets a complete range directly, as from typed inputs.
    pub fn set_range(&mut self, from: NaiveDate, to: Option<NaiveDate>) -> Result<()> {
        if let Some(to) = to {
            if to < from {
                return Err(PickerError::InvertedRange {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        self.value = match self.mode {
            PickerMode::Single => PickedDates::Single { date: from },
            PickerMode::Range => PickedDates::Range { from, to },
        };
        self.selecting = false;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.value = PickedDates::Empty;
        self.selecting = false;
    }

    pub fn label(&self) -> String {
        self.value.label()
    }

    pub fn to_filter_value(&self) -> Option<FilterValue> {
        self.value.to_filter_value()
    }
}
