//! MS-DOS date and time encoding used by ZIP records.
//!
//! - Time: bits 0-4 = second/2, bits 5-10 = minute, bits 11-15 = hour
//! - Date: bits 0-4 = day, bits 5-8 = month, bits 9-15 = year-1980
//!
//! Years outside 1980..=2107 cannot be represented; their date encodes as 0.

use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Timelike};

/// A packed DOS timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// Encode a wall-clock date and time.
    pub fn from_naive(value: NaiveDateTime) -> Self {
        let time = (value.second() / 2) | (value.minute() << 5) | (value.hour() << 11);
        let date = if (1980..=2107).contains(&value.year()) {
            value.day() | (value.month() << 5) | (((value.year() - 1980) as u32) << 9)
        } else {
            0
        };
        Self {
            time: time as u16,
            date: date as u16,
        }
    }

    /// Encode a system time in the local time zone, as file managers show it.
    pub fn from_system_time(time: SystemTime) -> Self {
        Self::from_naive(DateTime::<Local>::from(time).naive_local())
    }

    /// Date in the high half, time in the low half.
    #[inline]
    pub fn to_u32(self) -> u32 {
        ((self.date as u32) << 16) | self.time as u32
    }

    /// Decode the timestamp, if the date is set and every field is in range.
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        let day = (self.date & 0x1F) as u32;
        let month = ((self.date >> 5) & 0x0F) as u32;
        let year = 1980 + (self.date >> 9) as i32;
        let second = ((self.time & 0x1F) * 2) as u32;
        let minute = ((self.time >> 5) & 0x3F) as u32;
        let hour = (self.time >> 11) as u32;
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_known_timestamp() {
        let dos = DosDateTime::from_naive(at(2021, 3, 14, 16, 9, 26));
        assert_eq!(dos.date, (41 << 9) | (3 << 5) | 14);
        assert_eq!(dos.time, (16 << 11) | (9 << 5) | 13);
        assert_eq!(dos.to_naive(), Some(at(2021, 3, 14, 16, 9, 26)));
    }

    #[test]
    fn test_odd_seconds_round_down() {
        let dos = DosDateTime::from_naive(at(2000, 2, 29, 23, 59, 59));
        assert_eq!(dos.to_naive(), Some(at(2000, 2, 29, 23, 59, 58)));
    }

    #[test]
    fn test_system_time_uses_local_wall_clock() {
        let local = at(2021, 3, 14, 16, 9, 26)
            .and_local_timezone(Local)
            .earliest()
            .unwrap();
        let dos = DosDateTime::from_system_time(SystemTime::from(local));
        assert_eq!(dos.to_naive(), Some(at(2021, 3, 14, 16, 9, 26)));
    }

    #[test]
    fn test_year_range() {
        assert_eq!(DosDateTime::from_naive(at(1979, 12, 31, 0, 0, 0)).date, 0);
        assert_eq!(DosDateTime::from_naive(at(2108, 1, 1, 0, 0, 0)).date, 0);
        assert_ne!(DosDateTime::from_naive(at(1980, 1, 1, 0, 0, 0)).date, 0);
        assert_ne!(DosDateTime::from_naive(at(2107, 12, 31, 0, 0, 0)).date, 0);
        // Time of day is kept even when the date is out of range
        assert_eq!(
            DosDateTime::from_naive(at(1970, 1, 1, 1, 2, 4)).time,
            (1 << 11) | (2 << 5) | 2
        );
        assert_eq!(DosDateTime::default().to_naive(), None);
    }

    #[test]
    fn test_packed_layout() {
        let dos = DosDateTime::from_naive(at(1980, 1, 1, 0, 0, 0));
        assert_eq!(dos.date, 0x0021);
        assert_eq!(dos.to_u32(), 0x0021_0000);
    }
}
