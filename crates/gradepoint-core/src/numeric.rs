//! Float hygiene and display formatting.
//!
//! Sums are cleaned to six decimal places after every accumulation. Display
//! values are truncated, never rounded, so a shown GPA never overstates the
//! computed one.

/// Decimal places shown for credit and quality-point figures.
pub const CREDIT_DECIMALS: u32 = 2;

/// Decimal places shown for GPA figures.
pub const GPA_DECIMALS: u32 = 3;

/// Round to six decimal places. Non-finite input becomes `0.0`.
pub fn clean(n: f64) -> f64 {
    if !n.is_finite() {
        return 0.0;
    }
    (n * 1_000_000.0).round() / 1_000_000.0
}

/// Round half away from zero to `decimals` places.
pub fn round_to(n: f64, decimals: u32) -> f64 {
    if !n.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    (n * factor).round() / factor
}

/// Truncate toward negative infinity at `decimals` places.
pub fn truncate(n: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    // Clean the scaled value too: 11.1 * 100 is 1109.9999999999998.
    clean(clean(n) * factor).floor() / factor
}

/// Format a credit or quality-point figure (two places, truncated).
pub fn fmt_credits(n: f64) -> String {
    format!("{:.*}", CREDIT_DECIMALS as usize, truncate(n, CREDIT_DECIMALS))
}

/// Format a GPA (three places, truncated).
pub fn fmt_gpa(n: f64) -> String {
    format!("{:.*}", GPA_DECIMALS as usize, truncate(n, GPA_DECIMALS))
}

/// Coerce a unit count: negative, NaN and infinite values become zero.
pub fn coerce_units(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

/// Parse a unit count from free text, defaulting to zero.
pub fn parse_units(text: &str) -> f64 {
    text.trim().parse::<f64>().map(coerce_units).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_suppresses_drift() {
        assert_eq!(clean(0.1 + 0.2), 0.3);
        assert_eq!(clean(f64::NAN), 0.0);
        assert_eq!(clean(f64::INFINITY), 0.0);
    }

    #[test]
    fn truncate_never_rounds_up() {
        assert_eq!(truncate(3.4567, 3), 3.456);
        assert_eq!(truncate(2.999_9, 2), 2.99);
        assert_eq!(truncate(11.1, 2), 11.1);
    }

    #[test]
    fn formatting() {
        assert_eq!(fmt_gpa(4.0), "4.000");
        assert_eq!(fmt_gpa(3.333_333_3), "3.333");
        assert_eq!(fmt_gpa(2.666_666_6), "2.666");
        assert_eq!(fmt_credits(12.0), "12.00");
        assert_eq!(fmt_credits(10.199), "10.19");
        assert_eq!(fmt_gpa(f64::NAN), "0.000");
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(3.0 * 3.7, 2), 11.1);
        assert_eq!(round_to(1.005_01, 2), 1.01);
    }

    #[test]
    fn unit_coercion() {
        assert_eq!(parse_units("3"), 3.0);
        assert_eq!(parse_units(" 4.5 "), 4.5);
        assert_eq!(parse_units("three"), 0.0);
        assert_eq!(parse_units(""), 0.0);
        assert_eq!(parse_units("-2"), 0.0);
        assert_eq!(coerce_units(f64::NAN), 0.0);
    }
}
