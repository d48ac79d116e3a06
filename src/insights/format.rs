//! Number formatting for insight sentences.

use num_format::{Locale, ToFormattedString};

/// Float text that always shows a fractional part: `118.0`, `118.5`.
pub fn float_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Thousands-separated amount; whole amounts print without decimals.
pub fn money_text(v: f64) -> String {
    if !v.is_finite() {
        return format!("{}", v);
    }
    let sign = if v < 0.0 { "-" } else { "" };
    let cents = (v.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_formatted_string(&Locale::en);
    match cents % 100 {
        0 => format!("{}{}", sign, whole),
        frac => format!("{}{}.{:02}", sign, whole, frac),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_text() {
        assert_eq!(float_text(118.0), "118.0");
        assert_eq!(float_text(118.5), "118.5");
    }

    #[test]
    fn test_money_text() {
        assert_eq!(money_text(2_923_706_026.0), "2,923,706,026");
        assert_eq!(money_text(1234.5), "1,234.50");
        assert_eq!(money_text(-1500.0), "-1,500");
        assert_eq!(money_text(0.0), "0");
    }
}
