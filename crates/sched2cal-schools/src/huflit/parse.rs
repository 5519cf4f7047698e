//! HUFLIT timetable rows to schedule entries.
//!
//! Row layout (cells): 1 code, 2 name, 3 credits, 4 class, 5 weekday,
//! 6 periods "a - b", 7 room, 8 lecturer, 9 dates "(dd/mm/yyyy - dd/mm/yyyy)".

use chrono::{Duration, NaiveDate};

use sched2cal_core::PortalError;

use super::constants::{class_time, LESSON_MINUTES};
use crate::entry::{non_blank, ScheduleEntry};

pub const MIN_CELLS: usize = 10;

const DATE_FORMAT: &str = "%d/%m/%Y";

fn split_pair(value: &str, what: &str) -> Result<(String, String), PortalError> {
    let trimmed = value.trim().trim_start_matches('(').trim_end_matches(')');
    let mut parts = trimmed.split('-').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) if !a.is_empty() && !b.is_empty() => {
            Ok((a.to_string(), b.to_string()))
        }
        _ => Err(PortalError::MalformedRow(format!(
            "{} '{}' is not a range",
            what, value
        ))),
    }
}

fn parse_period(value: &str) -> Result<u32, PortalError> {
    value
        .parse()
        .map_err(|_| PortalError::MalformedRow(format!("period '{}' is not a number", value)))
}

fn parse_date(value: &str) -> Result<NaiveDate, PortalError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| PortalError::MalformedRow(format!("date '{}' is not dd/mm/yyyy", value)))
}

/// Build an entry from one timetable row.
///
/// The series ends one week after the last listed date; each event lasts
/// one lesson per period step between the first and last period.
pub fn parse_row(cells: &[String]) -> Result<ScheduleEntry, PortalError> {
    if cells.len() < MIN_CELLS {
        return Err(PortalError::MalformedRow(format!(
            "expected {} cells, got {}",
            MIN_CELLS,
            cells.len()
        )));
    }

    let (first, last) = split_pair(&cells[6], "periods")?;
    let start_period = parse_period(&first)?;
    let end_period = parse_period(&last)?;
    if end_period < start_period {
        return Err(PortalError::MalformedRow(format!(
            "periods '{}' end before they start",
            cells[6]
        )));
    }

    let start_time = class_time(start_period)
        .ok_or_else(|| PortalError::MalformedRow(format!("unknown period {}", start_period)))?;

    let (from_day, to_day) = split_pair(&cells[9], "dates")?;
    let from_date = parse_date(&from_day)?.and_time(start_time);
    let to_date = parse_date(&to_day)?.and_time(start_time)
        + Duration::days(7)
        + Duration::minutes(LESSON_MINUTES * i64::from(end_period - start_period));

    Ok(ScheduleEntry {
        code: non_blank(&cells[1]),
        name: cells[2].trim().to_string(),
        credits: non_blank(&cells[3]),
        class: non_blank(&cells[4]),
        weekday: cells[5].trim().to_string(),
        start_period,
        end_period,
        room: cells[7].trim().to_string(),
        lecturer: non_blank(&cells[8]),
        from_date,
        to_date,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::NaiveDateTime;

    fn row(periods: &str, dates: &str) -> Vec<String> {
        [
            "1",
            "AI1001",
            "Trí tuệ nhân tạo",
            "3",
            "22DH01",
            "Thứ Hai",
            periods,
            "CS3.B.04.03",
            "Trần Thị B",
            dates,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_parse_row() {
        let entry = parse_row(&row("1 - 3", "(04/09/2023 - 11/12/2023)")).unwrap();

        assert_eq!(entry.code.as_deref(), Some("AI1001"));
        assert_eq!(entry.name, "Trí tuệ nhân tạo");
        assert_eq!(entry.class.as_deref(), Some("22DH01"));
        assert_eq!(entry.start_period, 1);
        assert_eq!(entry.end_period, 3);
        assert_eq!(entry.room, "CS3.B.04.03");
        assert_eq!(entry.from_date, at("2023-09-04 06:45"));
        assert_eq!(entry.to_date, at("2023-12-18 08:25"));
    }

    #[test]
    fn test_afternoon_periods() {
        let entry = parse_row(&row("7 - 9", "(05/09/2023 - 05/09/2023)")).unwrap();
        assert_eq!(entry.from_date, at("2023-09-05 12:45"));
        assert_eq!(entry.to_date, at("2023-09-12 14:25"));
    }

    #[test]
    fn test_bad_periods() {
        assert!(matches!(
            parse_row(&row("3 - 1", "(04/09/2023 - 11/12/2023)")),
            Err(PortalError::MalformedRow(_))
        ));
        assert!(matches!(
            parse_row(&row("x - 3", "(04/09/2023 - 11/12/2023)")),
            Err(PortalError::MalformedRow(_))
        ));
    }

    #[test]
    fn test_bad_dates() {
        assert!(matches!(
            parse_row(&row("1 - 3", "(2023-09-04 - 2023-12-11)")),
            Err(PortalError::MalformedRow(_))
        ));
    }
}
