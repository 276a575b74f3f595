//! Picker - Date and date-range picker model.
//!
//! Two pieces, both free of any UI toolkit:
//!
//! - [`compute_position`] decides where the floating calendar goes so that it
//!   stays on screen.
//! - [`DatePicker`] tracks open/closed state and the picked day or range, and
//!   turns the selection into a browser [`FilterValue`](agrilend_browser::FilterValue).
//!
//! ```rust
//! use agrilend_picker::{DatePicker, PickerMode, Point, Rect, Size};
//! use chrono::NaiveDate;
//!
//! let mut picker = DatePicker::new(PickerMode::Single);
//! assert_eq!(picker.label(), "Pick a date");
//!
//! picker.open(Rect::new(20.0, 20.0, 180.0, 36.0), Size::new(300.0, 320.0), Size::new(800.0, 600.0));
//! assert!(picker.pointer_down(Point::new(790.0, 590.0)));
//! assert!(!picker.is_open());
//!
//! picker.pick(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
//! assert_eq!(picker.label(), "Mar 07, 2024");
//! ```

mod error;
mod picker;
mod position;

pub use error::{PickerError, Result};
pub use picker::{parse_day, DatePicker, PickedDates, PickerMode, PLACEHOLDER};
pub use position::{compute_position, Horizontal, Point, Position, Rect, Size, Vertical, MARGIN};
