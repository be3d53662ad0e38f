//! Static KHGT month table for 1447 H.
//!
//! Dates follow the Muhammadiyah unified global Hijri calendar (KHGT) as
//! published for 1447 H. Ranges are inclusive on both ends.

use std::sync::LazyLock;

use chrono::NaiveDate;

use super::{HijriCalendarTable, HijriMonthEntry};

/// Latin (Indonesian) month names, index 0 = Muharram.
pub const MONTH_NAMES_LATIN: [&str; 12] = [
    "Muharram",
    "Shafar",
    "Rabiul Awal",
    "Rabiul Akhir",
    "Jumadil Awal",
    "Jumadil Akhir",
    "Rajab",
    "Syakban",
    "Ramadan",
    "Syawal",
    "Zulkaidah",
    "Zulhijah",
];

/// Arabic month names, index 0 = Muharram.
pub const MONTH_NAMES_ARABIC: [&str; 12] = [
    "محرم",
    "صفر",
    "ربيع الأول",
    "ربيع الآخر",
    "جمادى الأولى",
    "جمادى الآخرة",
    "رجب",
    "شعبان",
    "رمضان",
    "شوال",
    "ذو القعدة",
    "ذو الحجة",
];

/// Covered Hijri year.
pub const KHGT_YEAR: u32 = 1447;

type Ymd = (i32, u32, u32);

/// (month, start, end) for each month of 1447 H.
const KHGT_1447_RANGES: [(u32, Ymd, Ymd); 12] = [
    (1, (2025, 6, 27), (2025, 7, 26)),
    (2, (2025, 7, 27), (2025, 8, 24)),
    (3, (2025, 8, 25), (2025, 9, 23)),
    (4, (2025, 9, 24), (2025, 10, 22)),
    (5, (2025, 10, 23), (2025, 11, 21)),
    (6, (2025, 11, 22), (2025, 12, 20)),
    (7, (2025, 12, 21), (2026, 1, 19)),
    (8, (2026, 1, 20), (2026, 2, 17)),
    (9, (2026, 2, 18), (2026, 3, 19)),
    (10, (2026, 3, 20), (2026, 4, 17)),
    (11, (2026, 4, 18), (2026, 5, 17)),
    (12, (2026, 5, 18), (2026, 6, 15)),
];

/// Zulhijah 1446 H, the month immediately before the table.
const ZULHIJAH_1446: (Ymd, Ymd) = ((2025, 5, 28), (2025, 6, 26));

fn ymd((y, m, d): Ymd) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("KHGT table literal must be a valid date")
}

fn entry(month: u32, start: Ymd, end: Ymd) -> HijriMonthEntry {
    let idx = (month - 1) as usize;
    HijriMonthEntry {
        month,
        name_latin: MONTH_NAMES_LATIN[idx],
        name_arabic: MONTH_NAMES_ARABIC[idx],
        gregorian_start: ymd(start),
        gregorian_end: ymd(end),
    }
}

/// Process-wide KHGT 1447 H table, built on first use and never mutated.
pub static KHGT_1447: LazyLock<HijriCalendarTable> = LazyLock::new(|| {
    let months = KHGT_1447_RANGES
        .iter()
        .map(|&(month, start, end)| entry(month, start, end))
        .collect();

    HijriCalendarTable::new(
        KHGT_YEAR,
        months,
        Some(entry(12, ZULHIJAH_1446.0, ZULHIJAH_1446.1)),
    )
});
