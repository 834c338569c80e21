//! Field-level coercion rules

use chrono::{NaiveDate, NaiveTime};

/// Marker for "no value" in the source files
pub const SENTINEL: &str = "\\N";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// `None` for empty or sentinel fields, the trimmed value otherwise
pub fn present(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value == SENTINEL {
        None
    } else {
        Some(value)
    }
}

/// Integer fields; accepts a float spelling with no fractional part ("44.0")
pub fn parse_integer(value: &str) -> Option<i32> {
    let value = present(value)?;
    if let Ok(n) = value.parse::<i32>() {
        return Some(n);
    }

    let f = value.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Some(f as i32)
    } else {
        None
    }
}

/// Points, truncated toward zero; `None` when absent or not numeric
pub fn parse_points(value: &str) -> Option<i32> {
    let f = present(value)?.parse::<f64>().ok()?;
    if f.is_finite() && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Some(f.trunc() as i32)
    } else {
        None
    }
}

/// Race dates in any of the accepted layouts
pub fn parse_race_date(value: &str) -> Option<NaiveDate> {
    let value = present(value)?;
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Lap times written `M:SS.fff` or `H:MM:SS.fff`
pub fn parse_lap_time(value: &str) -> Option<NaiveTime> {
    let value = present(value)?;
    let parts: Vec<&str> = value.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0, m.parse::<u32>().ok()?, *s),
        [h, m, s] => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?, *s),
        _ => return None,
    };

    let (whole, frac) = seconds.split_once('.').unwrap_or((seconds, ""));
    let secs = whole.parse::<u32>().ok()?;
    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let nanos = if frac.is_empty() {
        0
    } else {
        format!("{:0<9}", frac).parse::<u32>().ok()?
    };

    if minutes >= 60 || secs >= 60 {
        return None;
    }

    NaiveTime::from_hms_nano_opt(hours, minutes, secs, nanos)
}

/// Text fields; empty or sentinel become the empty string
pub fn text(value: &str) -> String {
    present(value).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present() {
        assert_eq!(present("\\N"), None);
        assert_eq!(present("  "), None);
        assert_eq!(present(" 7 "), Some("7"));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("44"), Some(44));
        assert_eq!(parse_integer("44.0"), Some(44));
        assert_eq!(parse_integer("44.5"), None);
        assert_eq!(parse_integer("\\N"), None);
        assert_eq!(parse_integer("abc"), None);
    }

    #[test]
    fn test_parse_points() {
        assert_eq!(parse_points("25"), Some(25));
        assert_eq!(parse_points("4.5"), Some(4));
        assert_eq!(parse_points("0.5"), Some(0));
        assert_eq!(parse_points("\\N"), None);
        assert_eq!(parse_points("n/a"), None);
        assert_eq!(parse_points("NaN"), None);
    }

    #[test]
    fn test_parse_race_date() {
        let expected = NaiveDate::from_ymd_opt(2009, 3, 29);
        assert_eq!(parse_race_date("2009-03-29"), expected);
        assert_eq!(parse_race_date("2009/03/29"), expected);
        assert_eq!(parse_race_date("29/03/2009"), expected);
        assert_eq!(parse_race_date("2009-02-30"), None);
        assert_eq!(parse_race_date("\\N"), None);
    }

    #[test]
    fn test_parse_lap_time() {
        assert_eq!(
            parse_lap_time("1:27.452"),
            NaiveTime::from_hms_milli_opt(0, 1, 27, 452)
        );
        assert_eq!(
            parse_lap_time("1:02:03.5"),
            NaiveTime::from_hms_milli_opt(1, 2, 3, 500)
        );
        assert_eq!(parse_lap_time("1:27"), NaiveTime::from_hms_opt(0, 1, 27));
        assert_eq!(parse_lap_time("\\N"), None);
        assert_eq!(parse_lap_time("1:75.000"), None);
        assert_eq!(parse_lap_time("fast"), None);
    }

    #[test]
    fn test_text() {
        assert_eq!(text("\\N"), "");
        assert_eq!(text(" McLaren "), "McLaren");
    }
}
