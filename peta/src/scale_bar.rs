//! Choosing the length of the map scale bar.

use serde::{Deserialize, Serialize};

/// How the bar length is rounded from a fifth of the visible map width.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleBarRounding {
    /// Nearest of 1, 2, 5 or 10 times the power of ten below the raw length. Ties go to the shorter bar.
    #[default]
    OneTwoFive,
    /// Raw length rounded to an integer multiple of the power of ten below it.
    IntegerMultiple,
}

impl ScaleBarRounding {
    /// Bar length in map units for the given visible width (map units, usually meters).
    ///
    /// Returns `None` for a width that is not positive and finite; no bar should be drawn then.
    pub fn length(&self, visible_width: f64) -> Option<f64> {
        if !visible_width.is_finite() || visible_width <= 0.0 {
            return None;
        }

        let approx = visible_width / 5.0;
        let power = 10f64.powi(approx.log10().floor() as i32);
        let length = match self {
            ScaleBarRounding::OneTwoFive => [1.0, 2.0, 5.0, 10.0]
                .into_iter()
                .map(|step| step * power)
                .fold(None, |best: Option<f64>, candidate| match best {
                    Some(b) if (b - approx).abs() <= (candidate - approx).abs() => Some(b),
                    _ => Some(candidate),
                })?,
            ScaleBarRounding::IntegerMultiple => (approx / power).round() * power,
        };

        Some(length)
    }
}

/// Bar length in map units using the default rounding. See [`ScaleBarRounding::length`].
pub fn nice_length(visible_width: f64) -> Option<f64> {
    ScaleBarRounding::default().length(visible_width)
}

/// Label at the end of the bar: the length in kilometers with one decimal.
pub fn length_label(length_m: f64) -> String {
    format!("{:.1} km", length_m / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn one_two_five() {
        assert_relative_eq!(nice_length(4300.0).unwrap(), 1000.0);
        assert_relative_eq!(nice_length(25_000.0).unwrap(), 5000.0);
        assert_relative_eq!(nice_length(7_500.0).unwrap(), 1000.0);
        assert_relative_eq!(nice_length(8_000.0).unwrap(), 2000.0);
        assert_relative_eq!(nice_length(40_000.0).unwrap(), 10_000.0);
        assert_relative_eq!(nice_length(3.0).unwrap(), 0.5);
    }

    #[test]
    fn integer_multiple() {
        let rounding = ScaleBarRounding::IntegerMultiple;
        assert_relative_eq!(rounding.length(4300.0).unwrap(), 900.0);
        assert_relative_eq!(rounding.length(25_000.0).unwrap(), 5000.0);
    }

    #[test]
    fn invalid_width() {
        assert_eq!(nice_length(0.0), None);
        assert_eq!(nice_length(-10.0), None);
        assert_eq!(nice_length(f64::NAN), None);
        assert_eq!(nice_length(f64::INFINITY), None);
    }

    #[test]
    fn label() {
        assert_eq!(length_label(1000.0), "1.0 km");
        assert_eq!(length_label(500.0), "0.5 km");
    }
}
