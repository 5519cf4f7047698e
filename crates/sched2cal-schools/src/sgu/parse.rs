//! SGU timetable rows to schedule entries.
//!
//! Row layout (cells): 0 code, 1 name, 3 credits, 4 class list, 8 weekday,
//! 9 first period, 10 period count, 11 room, 12 lecturer, 13 week pattern.

use chrono::{Duration, NaiveDate};

use sched2cal_core::PortalError;

use super::constants::{class_time, weekday_offset, LESSON_MINUTES};
use crate::entry::{non_blank, ScheduleEntry};

const MIN_CELLS: usize = 14;

fn parse_number(cells: &[String], index: usize, what: &str) -> Result<u32, PortalError> {
    cells[index]
        .trim()
        .parse()
        .map_err(|_| PortalError::MalformedRow(format!("{} '{}' is not a number", what, cells[index])))
}

/// Build an entry from one `tr[height=22px]` row.
///
/// Each character of the week pattern is one teaching week; leading non-digit
/// characters are weeks without class.
pub fn parse_row(cells: &[String], semester_start: NaiveDate) -> Result<ScheduleEntry, PortalError> {
    if cells.len() < MIN_CELLS {
        return Err(PortalError::MalformedRow(format!(
            "expected {} cells, got {}",
            MIN_CELLS,
            cells.len()
        )));
    }

    let start_period = parse_number(cells, 9, "start period")?;
    let period_count = parse_number(cells, 10, "period count")?;

    let weekday = cells[8].trim().to_string();
    let offset = weekday_offset(&weekday)
        .ok_or_else(|| PortalError::MalformedRow(format!("unknown weekday '{}'", weekday)))?;
    let start_time = class_time(start_period)
        .ok_or_else(|| PortalError::MalformedRow(format!("unknown period {}", start_period)))?;

    let pattern = cells[13].trim();
    let weeks = pattern.chars().count() as i64;
    let idle_weeks = pattern.chars().take_while(|c| !c.is_ascii_digit()).count() as i64;

    let first_day = semester_start.and_time(start_time);
    let to_date = first_day
        + Duration::days(7 * weeks + offset)
        + Duration::minutes(LESSON_MINUTES * i64::from(period_count));
    let from_date = first_day + Duration::days(7 * idle_weeks + offset);

    let class = cells[4].split(", ").next().and_then(non_blank);

    Ok(ScheduleEntry {
        code: non_blank(&cells[0]),
        name: cells[1].trim().to_string(),
        credits: non_blank(&cells[3]),
        class,
        weekday,
        start_period,
        end_period: start_period + period_count,
        room: cells[11].trim().to_string(),
        lecturer: non_blank(&cells[12]),
        from_date,
        to_date,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::NaiveDateTime;

    fn row(weekday: &str, start: &str, count: &str, pattern: &str) -> Vec<String> {
        [
            "841020",
            "Lập trình web",
            "01",
            "3",
            "DCT1211, DCT1212",
            "",
            "",
            "",
            weekday,
            start,
            count,
            "C.A106",
            "Nguyễn Văn A",
            pattern,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn semester_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 9, 4).unwrap()
    }

    #[test]
    fn test_full_pattern() {
        let entry = parse_row(&row("Ba", "1", "3", "1234567890123456"), semester_start()).unwrap();

        assert_eq!(entry.code.as_deref(), Some("841020"));
        assert_eq!(entry.class.as_deref(), Some("DCT1211"));
        assert_eq!(entry.start_period, 1);
        assert_eq!(entry.end_period, 4);
        assert_eq!(entry.from_date, at("2023-09-05 07:00"));
        // 16 weeks + 1 day after the semester start, plus 3 lessons
        assert_eq!(entry.to_date, at("2023-12-26 09:30"));
    }

    #[test]
    fn test_leading_idle_weeks_shift_first_session() {
        let entry = parse_row(&row("Hai", "6", "2", "--34567890"), semester_start()).unwrap();

        assert_eq!(entry.from_date, at("2023-09-18 13:00"));
        assert_eq!(entry.to_date, at("2023-11-13 14:40"));
    }

    #[test]
    fn test_saturday_classes() {
        let entry = parse_row(&row("Bảy", "1", "2", "1"), semester_start()).unwrap();
        assert_eq!(entry.from_date, at("2023-09-09 07:00"));
    }

    #[test]
    fn test_unknown_weekday() {
        let result = parse_row(&row("Mon", "1", "2", "1"), semester_start());
        assert!(matches!(result, Err(PortalError::MalformedRow(_))));
    }

    #[test]
    fn test_unknown_period() {
        let result = parse_row(&row("Hai", "14", "2", "1"), semester_start());
        assert!(matches!(result, Err(PortalError::MalformedRow(_))));
    }

    #[test]
    fn test_short_row() {
        let cells = vec!["841020".to_string()];
        assert!(matches!(
            parse_row(&cells, semester_start()),
            Err(PortalError::MalformedRow(_))
        ));
    }

    #[test]
    fn test_blank_optional_fields() {
        let mut cells = row("Tư", "3", "2", "123");
        cells[0] = " ".into();
        cells[12] = "".into();
        let entry = parse_row(&cells, semester_start()).unwrap();
        assert_eq!(entry.code, None);
        assert_eq!(entry.lecturer, None);
    }
}
