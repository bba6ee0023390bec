use chrono::NaiveDate;

/// Fast parse of a year axis cell into a `NaiveDate`.
///
/// Accepts a bare 4-digit year (`"1987"`, mapped to Jan 1 of that year) or a
/// full `YYYY-MM-DD` / `YYYY/MM/DD` date. Trailing time-of-day text after a
/// full date is ignored.
pub fn parse_year_or_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim().trim_matches('"');

    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    // minimal length + separator check, same shape for "-" and "/"
    if s.len() >= 10 {
        let sep = &s[4..5];
        if (sep == "-" || sep == "/") && &s[7..8] == sep {
            let year: i32 = s[0..4].parse().ok()?;
            let month: u32 = s[5..7].parse().ok()?;
            let day: u32 = s[8..10].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    None
}
