//! Day-name and time-of-day arithmetic for event creation.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use tracing::warn;

/// Parse an English or Spanish day name.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "monday" | "lunes" => Some(Weekday::Mon),
        "tuesday" | "martes" => Some(Weekday::Tue),
        "wednesday" | "miércoles" | "miercoles" => Some(Weekday::Wed),
        "thursday" | "jueves" => Some(Weekday::Thu),
        "friday" | "viernes" => Some(Weekday::Fri),
        "saturday" | "sábado" | "sabado" => Some(Weekday::Sat),
        "sunday" | "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Parse a day name, falling back to Monday for anything unrecognized.
pub fn resolve_weekday(name: &str) -> Weekday {
    parse_weekday(name).unwrap_or_else(|| {
        warn!("Unrecognized day name '{}', using Monday", name);
        Weekday::Mon
    })
}

/// Next date strictly after `today` that falls on `target`.
///
/// The same weekday as today resolves to one week ahead.
pub fn next_occurrence(today: NaiveDate, target: Weekday) -> NaiveDate {
    let mut days_ahead = i64::from(target.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday());
    if days_ahead <= 0 {
        days_ahead += 7;
    }
    today + Duration::days(days_ahead)
}

/// Parse `HH:MM`.
pub fn parse_time_of_day(time: &str) -> Option<NaiveTime> {
    let (hour, minute) = time.trim().split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_weekday_languages() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("MIÉRCOLES"), Some(Weekday::Wed));
        assert_eq!(parse_weekday("miercoles"), Some(Weekday::Wed));
        assert_eq!(parse_weekday("Sábado"), Some(Weekday::Sat));
        assert_eq!(parse_weekday(" domingo "), Some(Weekday::Sun));
        assert_eq!(parse_weekday("someday"), None);
    }

    #[test]
    fn test_unknown_day_resolves_to_monday() {
        assert_eq!(resolve_weekday("Caturday"), Weekday::Mon);
    }

    #[test]
    fn test_next_occurrence_later_this_week() {
        // 2024-10-14 is a Monday.
        let monday = date(2024, 10, 14);
        assert_eq!(next_occurrence(monday, Weekday::Wed), date(2024, 10, 16));
        assert_eq!(next_occurrence(monday, Weekday::Sun), date(2024, 10, 20));
    }

    #[test]
    fn test_next_occurrence_same_day_is_next_week() {
        let monday = date(2024, 10, 14);
        assert_eq!(next_occurrence(monday, Weekday::Mon), date(2024, 10, 21));
    }

    #[test]
    fn test_next_occurrence_earlier_weekday_wraps() {
        let friday = date(2024, 10, 18);
        assert_eq!(next_occurrence(friday, Weekday::Tue), date(2024, 10, 22));
    }

    #[test]
    fn test_next_occurrence_always_in_future() {
        let start = date(2024, 12, 28);
        for offset in 0..7 {
            let today = start + Duration::days(offset);
            for target in [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ] {
                let next = next_occurrence(today, target);
                let ahead = (next - today).num_days();
                assert!((1..=7).contains(&ahead));
                assert_eq!(next.weekday(), target);
            }
        }
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("10:00"), NaiveTime::from_hms_opt(10, 0, 0));
        assert_eq!(parse_time_of_day("9:5"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day("10"), None);
        assert_eq!(parse_time_of_day("ten:thirty"), None);
    }
}
