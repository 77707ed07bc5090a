//! Natural date and time arithmetic.
//!
//! A date is a day number: the Julian day number minus `RATADIE`, plus
//! 365. A time counts tenths of a second on the same epoch, so
//! `time / TICKS_PER_DAY` is the date of the time.

/// Julian day number of 0001-01-01.
const RATADIE: i64 = 1_721_426;
/// Offset of the natural epoch in days.
const EPOCH_DAYS: i64 = 365;
/// Tenth-of-second ticks per day.
pub const TICKS_PER_DAY: i64 = 864_000;

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}

fn julian_day(year: i64, month: i64, day: i64) -> i64 {
    let (m, y) = if month > 2 {
        (month - 3, year)
    } else {
        (month + 9, year - 1)
    };
    let c = y.div_euclid(100);
    let ya = y - 100 * c;
    (146_097 * c).div_euclid(4)
        + (1461 * ya).div_euclid(4)
        + (153 * m + 2).div_euclid(5)
        + day
        + 1_721_119
}

fn civil_from_value(value: i64) -> (i64, i64, i64) {
    let j = value - EPOCH_DAYS + RATADIE - 1_721_120;
    let b = (4 * j + 3).div_euclid(146_097);
    let c = j - (146_097 * b).div_euclid(4);
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2).div_euclid(153);
    let day = e - (153 * m + 2).div_euclid(5) + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = 100 * b + d + m / 10;
    (year, month, day)
}

fn value_from_civil(year: i64, month: i64, day: i64) -> i64 {
    julian_day(year, month, day) - RATADIE + EPOCH_DAYS
}

/// Format a date value as `YYYY/MM/DD`.
pub fn date_to_string(value: i64) -> String {
    let (year, month, day) = civil_from_value(value);
    format!("{:04}/{:02}/{:02}", year, month, day)
}

/// Format a time value as `YYYY/MM/DD HH:MM:SS.f`.
pub fn time_to_string(value: i64) -> String {
    let days = value.div_euclid(TICKS_PER_DAY);
    let ticks = value.rem_euclid(TICKS_PER_DAY);
    let hour = ticks / 36_000;
    let minute = ticks % 36_000 / 600;
    let second = ticks % 600 / 10;
    let tenth = ticks % 10;
    format!(
        "{} {:02}:{:02}:{:02}.{}",
        date_to_string(days),
        hour,
        minute,
        second,
        tenth
    )
}

/// Parse `YYYY/MM/DD` into a date value.
///
/// A trailing time part is accepted and ignored.
pub fn string_to_date(text: &str) -> Option<i64> {
    let parsed = parse(text)?;
    Some(value_from_civil(parsed.year, parsed.month, parsed.day))
}

/// Parse `YYYY/MM/DD[ HH:MM[:SS[.f]]]` into a time value.
pub fn string_to_time(text: &str) -> Option<i64> {
    let p = parse(text)?;
    let days = value_from_civil(p.year, p.month, p.day);
    let ticks = p.hour * 36_000 + p.minute * 600 + p.second * 10 + p.tenth;
    days.checked_mul(TICKS_PER_DAY)?.checked_add(ticks)
}

#[derive(Debug, Default)]
struct Parsed {
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
    tenth: i64,
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn eat(&mut self, ch: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_digits(&mut self) {
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
    }

    /// Read `min..=max` digits; `max == 0` means unbounded.
    fn digits(&mut self, min: usize, max: usize) -> Option<(i64, usize)> {
        let start = self.pos;
        let mut value: i64 = 0;
        while let Some(b) = self.bytes.get(self.pos) {
            if !b.is_ascii_digit() || (max > 0 && self.pos - start == max) {
                break;
            }
            value = value.checked_mul(10)?.checked_add((b - b'0') as i64)?;
            self.pos += 1;
        }
        let count = self.pos - start;
        if count < min {
            return None;
        }
        Some((value, count))
    }
}

fn parse(text: &str) -> Option<Parsed> {
    let mut s = Scanner::new(text.trim());
    let mut p = Parsed {
        year: s.digits(1, 0)?.0,
        ..Parsed::default()
    };
    if !s.eat(b'/') {
        return None;
    }
    p.month = s.digits(1, 2)?.0;
    if !s.eat(b'/') {
        return None;
    }
    p.day = s.digits(1, 2)?.0;

    if s.eat(b' ') {
        p.hour = s.digits(1, 2)?.0;
        if !s.eat(b':') {
            return None;
        }
        p.minute = s.digits(1, 2)?.0;
        if s.eat(b':') {
            p.second = s.digits(1, 2)?.0;
        }
        if s.eat(b'.') {
            // Only the first fractional digit counts.
            p.tenth = s.digits(1, 1)?.0;
            s.skip_digits();
        }
    }
    if !s.at_end() {
        return None;
    }

    let valid = (1..=12).contains(&p.month)
        && p.day >= 1
        && p.day <= days_in_month(p.year, p.month)
        && p.hour < 24
        && p.minute < 60
        && p.second < 60;
    valid.then_some(p)
}
