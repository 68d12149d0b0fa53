//! Fixed-table text metrics.
//!
//! Node sizes must be known before the tree is arranged, so header strings are
//! measured from a per-character width table instead of a live text layout
//! pass. Output is single-line only.

use crate::model::ViewError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Font size the built-in width table is scaled to.
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// First character code covered by the built-in table (space).
const DEFAULT_START_CODE: u32 = 32;

/// Advance widths (thousandths of an em) of a Helvetica-like face for the
/// printable ASCII range `' '..='~'`.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Width table describing a single-line font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Line height in pixels, reported for every measured string.
    pub height: f64,
    /// Character code of `widths[0]`.
    pub start_code: u32,
    /// Width used for codes outside the table.
    pub default_width: f64,
    /// Per-character advance widths in pixels.
    pub widths: Vec<f64>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            height: 15.0,
            start_code: DEFAULT_START_CODE,
            default_width: 7.0,
            widths: HELVETICA_WIDTHS
                .iter()
                .map(|w| f64::from(*w) * DEFAULT_FONT_SIZE / 1000.0)
                .collect(),
        }
    }
}

impl FontSpec {
    /// Monospace spec: every character is `char_width` wide.
    pub fn monospace(char_width: f64, height: f64) -> Self {
        Self {
            height,
            start_code: 0,
            default_width: char_width,
            widths: Vec::new(),
        }
    }

    /// Measure a string with this font.
    pub fn measure(&self, text: &str) -> TextSize {
        // UTF-16 code units, matching how width tables are usually authored
        let width = text
            .encode_utf16()
            .map(|unit| self.char_width(u32::from(unit)))
            .sum();
        TextSize {
            width,
            height: self.height,
        }
    }

    fn char_width(&self, code: u32) -> f64 {
        code.checked_sub(self.start_code)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| self.widths.get(index).copied())
            .unwrap_or(self.default_width)
    }
}

/// Measured extent of a single line of text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TextSize {
    /// Sum of the character widths.
    pub width: f64,
    /// The font's line height.
    pub height: f64,
}

/// Measure `text` with `font`.
///
/// `None` text measures as the empty string; any other value is measured via
/// its `Display` representation.
///
/// # Errors
///
/// Returns [`ViewError::Config`] when `font` is `None`.
///
/// # Examples
///
/// ```
/// use topoview::layout::metrics::{measure_text, FontSpec};
///
/// let font = FontSpec::monospace(7.0, 14.0);
/// let size = measure_text(Some(&42), Some(&font)).unwrap();
/// assert_eq!(size.width, 14.0);
/// assert_eq!(size.height, 14.0);
/// ```
pub fn measure_text<T>(text: Option<&T>, font: Option<&FontSpec>) -> Result<TextSize, ViewError>
where
    T: fmt::Display + ?Sized,
{
    let font = font.ok_or(ViewError::Config("font spec"))?;
    let text = text.map(ToString::to_string).unwrap_or_default();
    Ok(font.measure(&text))
}
