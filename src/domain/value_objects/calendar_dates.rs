use chrono::NaiveDate;
use thiserror::Error;

/// Wire format for every date the service accepts or emits.
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarDateError {
    #[error("{field} must use the YYYY-MM-DD format, got {value:?}")]
    InvalidFormat { field: &'static str, value: String },
    #[error("{field} is not a valid calendar date: {value}")]
    InvalidDate { field: &'static str, value: String },
}

/// Parses a fixed-width `YYYY-MM-DD` date. `field` names the input in the error message.
pub fn parse_calendar_date(field: &'static str, raw: &str) -> Result<NaiveDate, CalendarDateError> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 4 || index == 7 || byte.is_ascii_digit());

    if !well_formed {
        return Err(CalendarDateError::InvalidFormat {
            field,
            value: raw.to_string(),
        });
    }

    NaiveDate::parse_from_str(raw, CALENDAR_DATE_FORMAT).map_err(|_| {
        CalendarDateError::InvalidDate {
            field,
            value: raw.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_calendar_dates() {
        let date = parse_calendar_date("start_date", "2024-01-31").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());

        let leap_day = parse_calendar_date("start_date", "2024-02-29").unwrap();
        assert_eq!(leap_day, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn rejects_non_fixed_width_text() {
        for raw in [
            "",
            "2024-1-01",
            "2024-01-1",
            "01-2024",
            "2024/01/01",
            "20240101",
            " 2024-01-01",
            "2024-01-01T00:00:00",
            "yyyy-mm-dd",
        ] {
            let err = parse_calendar_date("start_date", raw).unwrap_err();
            assert!(
                matches!(err, CalendarDateError::InvalidFormat { .. }),
                "expected format error for {raw:?}, got: {err}"
            );
        }
    }

    #[test]
    fn rejects_impossible_calendar_values() {
        for raw in ["2023-02-29", "2024-02-30", "2024-13-01", "2024-00-10", "2024-04-31"] {
            let err = parse_calendar_date("end_date", raw).unwrap_err();
            assert!(
                matches!(err, CalendarDateError::InvalidDate { .. }),
                "expected calendar error for {raw:?}, got: {err}"
            );
        }
    }

    #[test]
    fn error_message_names_the_field() {
        let err = parse_calendar_date("from_date", "06-2024").unwrap_err();
        assert!(err.to_string().starts_with("from_date"), "got: {err}");
    }
}
