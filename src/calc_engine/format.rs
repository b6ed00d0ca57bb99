//! Renders results within a fixed character budget.
//!
//! Precision is lowered one significant digit at a time, first in general
//! notation (plain decimals unless the exponent is far from zero) and then,
//! only if nothing fits, in scientific notation. The first rendering that
//! fits wins, so the most precise plain form is always preferred.

use super::error::FormatError;

pub const MAX_OUTPUT_LEN: usize = 15;
const MAX_PRECISION: usize = 15;

pub fn format_result(value: f64) -> Result<String, FormatError> {
    if value.is_nan() {
        return Err(FormatError::NotANumber);
    }
    if value.is_infinite() {
        return Err(FormatError::MagnitudeTooLarge);
    }
    // -0 prints as 0
    let value = if value == 0.0 { 0.0 } else { value };

    let general = (1..=MAX_PRECISION).rev().map(|p| render_general(value, p));
    let scientific = (1..=MAX_PRECISION).rev().map(|p| render_scientific(value, p));

    general
        .chain(scientific)
        .find(|s| s.chars().count() <= MAX_OUTPUT_LEN)
        .ok_or(FormatError::UnrepresentableWithinBudget(value))
}

/// `precision` significant digits; exponent form only below 1e-4 or at
/// 10^precision and above.
fn render_general(value: f64, precision: usize) -> String {
    let exponent = decimal_exponent(value, precision);
    if exponent < -4 || exponent >= precision as i32 {
        render_scientific(value, precision - 1)
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_trailing_zeros(&format!("{:.*}", decimals, value))
    }
}

/// `decimals` digits after the point, exponent written as `e+NN`.
fn render_scientific(value: f64, decimals: usize) -> String {
    let rendered = format!("{:.*e}", decimals, value);
    let text = match rendered.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => rendered,
    };
    trim_trailing_zeros(&text)
}

/// Exponent of `value` once rounded to `precision` significant digits.
fn decimal_exponent(value: f64, precision: usize) -> i32 {
    let rendered = format!("{:.*e}", precision.saturating_sub(1), value);
    rendered
        .split_once('e')
        .and_then(|(_, exponent)| exponent.parse().ok())
        .unwrap_or(0)
}

fn trim_trailing_zeros(s: &str) -> String {
    let (mantissa, exponent) = match s.find('e') {
        Some(pos) => s.split_at(pos),
        None => (s, ""),
    };
    if !mantissa.contains('.') {
        return s.to_string();
    }
    let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", mantissa, exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value: f64) -> String {
        format_result(value).unwrap()
    }

    #[test]
    fn integers_and_short_decimals() {
        assert_eq!(fmt(0.0), "0");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(14.0), "14");
        assert_eq!(fmt(-4.0), "-4");
        assert_eq!(fmt(2.5), "2.5");
        assert_eq!(fmt(120.0), "120");
        assert_eq!(fmt(0.0001), "0.0001");
    }

    #[test]
    fn floating_noise_is_hidden() {
        assert_eq!(fmt(0.1 + 0.2), "0.3");
        assert_eq!(fmt(1.0 - 0.9), "0.1");
    }

    #[test]
    fn precision_drops_until_it_fits() {
        assert_eq!(fmt(1.0 / 3.0), "0.3333333333333");
        assert_eq!(fmt(2.0 / 3.0), "0.6666666666667");
        assert_eq!(fmt(-1.0 / 3.0), "-0.333333333333");
        assert_eq!(fmt(std::f64::consts::PI), "3.1415926535898");
        assert_eq!(fmt(123456789012345.0), "123456789012345");
    }

    #[test]
    fn exponent_form_for_extreme_magnitudes() {
        assert_eq!(fmt(1e20), "1e+20");
        assert_eq!(fmt(1e-5), "1e-05");
        assert_eq!(fmt(-1.5e300), "-1.5e+300");
        assert_eq!(fmt(123456789012345678.0), "1.23456789e+17");
        assert_eq!(fmt(1234567890123456.0), "1.23456789e+15");
    }

    #[test]
    fn never_longer_than_budget() {
        let samples = [
            f64::MAX,
            f64::MIN,
            f64::MIN_POSITIVE,
            -f64::MIN_POSITIVE,
            5e-324,
            -5e-324,
            1.0 / 7.0,
            -123456.789012345,
            9.999999999999999e99,
            0.000123456789012345,
        ];
        for value in samples {
            let s = fmt(value);
            assert!(s.chars().count() <= MAX_OUTPUT_LEN, "{value} -> {s}");
        }
    }

    #[test]
    fn rejects_nan_and_infinity() {
        assert_eq!(format_result(f64::NAN), Err(FormatError::NotANumber));
        assert_eq!(
            format_result(f64::INFINITY),
            Err(FormatError::MagnitudeTooLarge)
        );
        assert_eq!(
            format_result(f64::NEG_INFINITY),
            Err(FormatError::MagnitudeTooLarge)
        );
    }

    #[test]
    fn trims_only_fractional_zeros() {
        assert_eq!(trim_trailing_zeros("100"), "100");
        assert_eq!(trim_trailing_zeros("1.500"), "1.5");
        assert_eq!(trim_trailing_zeros("2.000"), "2");
        assert_eq!(trim_trailing_zeros("1.200e+05"), "1.2e+05");
        assert_eq!(trim_trailing_zeros("3.0e-10"), "3e-10");
    }
}
