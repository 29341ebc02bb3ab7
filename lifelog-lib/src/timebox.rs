//! The fixed grid of 15-minute slots that make up a day.
//!
//! Every slot maps to exactly one UTC instant for a given calendar date: UTC midnight of the
//! date plus the slot's hour and minute. The mapping deliberately ignores the viewer's time
//! zone, so the same `HH:MM` label always refers to the same stored instant.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Timelike, Utc};
use thiserror::Error;

pub const SLOT_MINUTES: u8 = 15;
pub const SLOTS_PER_HOUR: u8 = 4;
pub const SLOTS_PER_DAY: usize = 96;

/// A single 15-minute slot of the day, from `00:00` to `23:45`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    hour: u8,
    quarter: u8,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("`{0}` is not a 15-minute slot, expected HH:MM with minutes 00, 15, 30 or 45")]
pub struct SlotParseError(String);

impl Slot {
    /// Returns `None` unless `hour` is in `0..24` and `minute` is one of 0, 15, 30 or 45.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour >= 24 {
            return None;
        }

        (0..SLOTS_PER_HOUR)
            .find(|quarter| quarter * SLOT_MINUTES == minute)
            .map(|quarter| Self { hour, quarter })
    }

    /// The slot an instant falls on, if it lies exactly on the 15-minute grid.
    pub fn of(instant: &DateTime<Utc>) -> Option<Self> {
        if instant.second() != 0 || instant.nanosecond() != 0 {
            return None;
        }

        let hour = u8::try_from(instant.hour()).ok()?;
        let minute = u8::try_from(instant.minute()).ok()?;

        Self::new(hour, minute)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.quarter * SLOT_MINUTES
    }

    /// Position of this slot within the day, `0..96`.
    pub fn index(&self) -> usize {
        usize::from(self.hour) * usize::from(SLOTS_PER_HOUR) + usize::from(self.quarter)
    }

    pub fn label(&self) -> String {
        self.to_string()
    }

    /// The canonical instant of this slot on `date`.
    pub fn instant_on(&self, date: NaiveDate) -> DateTime<Utc> {
        date.and_time(self.start()).and_utc()
    }

    fn start(&self) -> NaiveTime {
        let minutes = i64::from(self.hour) * 60 + i64::from(self.minute());
        let (time, _) = NaiveTime::MIN.overflowing_add_signed(TimeDelta::minutes(minutes));

        time
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute())
    }
}

impl FromStr for Slot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SlotParseError(s.to_string());

        let (hour, minute) = s.trim().split_once(':').ok_or_else(err)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(err());
        }

        let hour = hour.parse().map_err(|_| err())?;
        let minute = minute.parse().map_err(|_| err())?;

        Slot::new(hour, minute).ok_or_else(err)
    }
}

/// All 96 slots of a day in chronological order.
pub fn slots() -> impl Iterator<Item = Slot> {
    (0..24u8).flat_map(|hour| (0..SLOTS_PER_HOUR).map(move |quarter| Slot { hour, quarter }))
}

/// UTC midnight of `date` plus `hour` hours and `minute` minutes, or `None` when either is
/// out of range for a time of day.
pub fn canonical_instant(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    date.and_hms_opt(hour, minute, 0).map(|t| t.and_utc())
}

/// Inclusive bounds of the UTC day `date`: `00:00:00.000` to `23:59:59.999`.
///
/// Both ends stay on `date`, so this holds for every date chrono can represent.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let (last, _) = NaiveTime::MIN
        .overflowing_add_signed(TimeDelta::days(1) - TimeDelta::milliseconds(1));

    (midnight(date), date.and_time(last).and_utc())
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_slots_cover_day() {
        let all: Vec<Slot> = slots().collect();

        assert_eq!(all.len(), SLOTS_PER_DAY);
        assert_eq!(all.first().unwrap().label(), "00:00");
        assert_eq!(all.last().unwrap().label(), "23:45");

        let labels: HashSet<String> = all.iter().map(Slot::label).collect();
        assert_eq!(labels.len(), SLOTS_PER_DAY);

        for (i, slot) in all.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn test_slots_are_fifteen_minutes_apart() {
        let day = date(2024, 1, 1);
        let instants: Vec<_> = slots().map(|s| s.instant_on(day)).collect();

        for pair in instants.windows(2) {
            if let [a, b] = pair {
                assert_eq!(*b - *a, TimeDelta::minutes(15));
            }
        }
    }

    #[test]
    fn test_canonical_instant_is_utc_anchored() {
        let instant = canonical_instant(date(2024, 1, 1), 9, 0).unwrap();

        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        assert_eq!(instant, Slot::new(9, 0).unwrap().instant_on(date(2024, 1, 1)));
        assert_eq!(crate::instant::format(&instant), "2024-01-01T09:00:00.000Z");

        assert_eq!(canonical_instant(date(2024, 1, 1), 24, 0), None);
        assert_eq!(canonical_instant(date(2024, 1, 1), 9, 60), None);
    }

    #[test]
    fn test_day_bounds() {
        let (start, end) = day_bounds(date(2024, 2, 29));

        assert_eq!(crate::instant::format(&start), "2024-02-29T00:00:00.000Z");
        assert_eq!(crate::instant::format(&end), "2024-02-29T23:59:59.999Z");
    }

    #[test]
    fn test_last_representable_day() {
        let (start, end) = day_bounds(NaiveDate::MAX);
        assert_eq!(end - start, TimeDelta::days(1) - TimeDelta::milliseconds(1));

        let last = Slot::new(23, 45).unwrap().instant_on(NaiveDate::MAX);
        assert_eq!(last.date_naive(), NaiveDate::MAX);
        assert_eq!(Slot::of(&last), Slot::new(23, 45));
    }

    #[test]
    fn test_slot_of_instant() {
        let on_grid = Utc.with_ymd_and_hms(2024, 1, 1, 13, 45, 0).unwrap();
        assert_eq!(Slot::of(&on_grid), Slot::new(13, 45));

        let off_grid = Utc.with_ymd_and_hms(2024, 1, 1, 13, 40, 0).unwrap();
        assert_eq!(Slot::of(&off_grid), None);

        let with_seconds = Utc.with_ymd_and_hms(2024, 1, 1, 13, 45, 1).unwrap();
        assert_eq!(Slot::of(&with_seconds), None);
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!("09:15".parse::<Slot>().unwrap(), Slot::new(9, 15).unwrap());
        assert_eq!("23:45".parse::<Slot>().unwrap().index(), 95);

        assert!("9:15".parse::<Slot>().is_err());
        assert!("24:00".parse::<Slot>().is_err());
        assert!("10:10".parse::<Slot>().is_err());
        assert!("nope".parse::<Slot>().is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-01"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date(" 2024-12-31 "), Some(date(2024, 12, 31)));
        assert_eq!(parse_date("01/01/2024"), None);
        assert_eq!(format_date(date(2024, 1, 1)), "2024-01-01");
    }
}
