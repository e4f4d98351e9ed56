use chrono::{DateTime, Local, Utc};

/// Group digits in threes with `.`, es-ES style: 1234567 -> "1.234.567".
pub fn format_int(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Two decimals with `,` as decimal separator: 1234.5 -> "1.234,50".
pub fn format_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{},{:02}", format_int(cents / 100), cents % 100)
}

pub fn format_signed(value: i64) -> String {
    if value > 0 {
        format!("+{}", format_int(value.unsigned_abs()))
    } else if value < 0 {
        format!("-{}", format_int(value.unsigned_abs()))
    } else {
        "0".to_string()
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_grouped() {
        assert_eq!(format_int(0), "0");
        assert_eq!(format_int(999), "999");
        assert_eq!(format_int(1_000), "1.000");
        assert_eq!(format_int(1_234_567), "1.234.567");
    }

    #[test]
    fn money_two_decimals() {
        assert_eq!(format_money(12.0), "12,00");
        assert_eq!(format_money(1234.5), "1.234,50");
        assert_eq!(format_money(0.005), "0,01");
        assert_eq!(format_money(-3.2), "-3,20");
    }

    #[test]
    fn signed_counts() {
        assert_eq!(format_signed(3), "+3");
        assert_eq!(format_signed(-1200), "-1.200");
        assert_eq!(format_signed(0), "0");
    }

    #[test]
    fn long_names_truncated() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long description", 10), "a very ...");
    }
}
