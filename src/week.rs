use crate::model::WeekKey;
use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Weekday};

/// ISO-8601 week of the timestamp, evaluated in the timestamp's own offset.
pub fn week_key<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> WeekKey {
    iso_week_of(timestamp.date_naive())
}

pub fn iso_week_of(date: NaiveDate) -> WeekKey {
    let iso = date.iso_week();
    WeekKey::new(iso.year(), iso.week())
}

/// The Sunday one day before the Monday that opens the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let from_monday = u64::from(date.weekday().num_days_from_monday());
    date - Days::new(from_monday + 1)
}

impl WeekKey {
    /// Sunday preceding this week's Monday, or `None` if the week does not
    /// exist in that ISO year.
    pub fn week_start(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
            .and_then(|monday| monday.checked_sub_days(Days::new(1)))
    }
}
