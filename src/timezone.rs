use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Get today's date in the given timezone.
///
/// # Errors
///
/// This function will return an [Error::InvalidTimezoneError] if
/// `canonical_timezone` is not a known canonical timezone name.
pub fn current_local_date(canonical_timezone: &str) -> Result<Date, Error> {
    let Some(local_offset) = get_local_offset(canonical_timezone) else {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        return Err(Error::InvalidTimezoneError(canonical_timezone.to_owned()));
    };

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

#[cfg(test)]
mod timezone_tests {
    use time::OffsetDateTime;

    use crate::Error;

    use super::current_local_date;

    #[test]
    fn current_local_date_in_utc_is_today() {
        let date = current_local_date("Etc/UTC").unwrap();

        assert_eq!(date, OffsetDateTime::now_utc().date());
    }

    #[test]
    fn current_local_date_rejects_unknown_timezone() {
        let result = current_local_date("Middle/Earth");

        assert_eq!(
            result,
            Err(Error::InvalidTimezoneError("Middle/Earth".to_owned()))
        );
    }
}
