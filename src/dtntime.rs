//! Timepoint and timedelta values on the DTN epoch (2000-01-01T00:00:00Z).
//!
//! A [`DtnTime`] is a signed count of nanoseconds. Text forms accept plain
//! (possibly fractional) seconds, ISO 8601 date-times for timepoints, and
//! ISO 8601 durations for timedeltas; canonical emission is always seconds.

use core::fmt;

use crate::error::{AriError, ErrorCode, Pos};

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Days between 1970-01-01 and the DTN epoch 2000-01-01.
const DTN_EPOCH_DAYS_FROM_UNIX: i64 = 10_957;

/// A signed time value with nanosecond precision.
///
/// For TP this is an offset from the DTN epoch; for TD it is a duration.
/// Whole seconds are bounded to the `i64` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DtnTime {
    nanos: i128,
}

impl DtnTime {
    /// A time value of whole seconds.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self {
            nanos: secs as i128 * NANOS_PER_SEC,
        }
    }

    /// A time value from seconds and a same-sign nanosecond part.
    ///
    /// # Errors
    ///
    /// Returns `TimeOutOfRange` if `subsec_nanos` is not below one second or
    /// disagrees in sign with `secs`.
    pub fn new(secs: i64, subsec_nanos: i32) -> Result<Self, AriError> {
        let err = AriError::at(ErrorCode::TimeOutOfRange, Pos::default());
        if subsec_nanos.unsigned_abs() >= 1_000_000_000 {
            return Err(err);
        }
        if (secs > 0 && subsec_nanos < 0) || (secs < 0 && subsec_nanos > 0) {
            return Err(err);
        }
        Ok(Self {
            nanos: i128::from(secs) * NANOS_PER_SEC + i128::from(subsec_nanos),
        })
    }

    pub(crate) const fn from_raw_nanos(nanos: i128) -> Self {
        Self { nanos }
    }

    /// Whole seconds, truncated toward zero.
    #[inline]
    #[must_use]
    pub const fn secs(self) -> i64 {
        (self.nanos / NANOS_PER_SEC) as i64
    }

    /// Sub-second part in nanoseconds, same sign as the value.
    #[inline]
    #[must_use]
    pub const fn subsec_nanos(self) -> i32 {
        (self.nanos % NANOS_PER_SEC) as i32
    }

    /// Returns `true` when the value is an exact whole number of seconds.
    #[inline]
    #[must_use]
    pub const fn is_whole_secs(self) -> bool {
        self.nanos % NANOS_PER_SEC == 0
    }

    /// Decimal-fraction view: `(exponent, mantissa)` with the smallest
    /// magnitude exponent in `-9..=0` such that `self = mantissa * 10^exp`
    /// seconds.
    ///
    /// # Errors
    ///
    /// Returns `TimeOutOfRange` when the mantissa does not fit an `i64`.
    pub fn to_decfrac(self) -> Result<(i32, i64), AriError> {
        let mut exp = -9i32;
        let mut mant = self.nanos;
        while exp < 0 && mant % 10 == 0 {
            mant /= 10;
            exp += 1;
        }
        let mant = i64::try_from(mant)
            .map_err(|_| AriError::at(ErrorCode::TimeOutOfRange, Pos::default()))?;
        Ok((exp, mant))
    }

    /// Build from a decimal-fraction `(exponent, mantissa)` pair.
    ///
    /// # Errors
    ///
    /// Returns `TimeOutOfRange` for exponents outside `-9..=0` or values
    /// outside the representable second range.
    pub fn from_decfrac(exp: i32, mant: i64) -> Result<Self, AriError> {
        let err = AriError::at(ErrorCode::TimeOutOfRange, Pos::default());
        if !(-9..=0).contains(&exp) {
            return Err(err);
        }
        let scale = 10i128.pow((9 + exp) as u32);
        let nanos = i128::from(mant) * scale;
        if nanos / NANOS_PER_SEC > i128::from(i64::MAX) || nanos / NANOS_PER_SEC < i128::from(i64::MIN)
        {
            return Err(err);
        }
        Ok(Self { nanos })
    }

    /// Parse a timepoint text form: decimal DTN-epoch seconds or an ISO 8601
    /// date-time (`YYYY-MM-DDThh:mm:ss[.frac][Z]`).
    ///
    /// # Errors
    ///
    /// Returns `BadTimeText` on malformed input, `TimeOutOfRange` when the
    /// value cannot be represented.
    pub fn parse_tp(text: &str) -> Result<Self, AriError> {
        if text.contains('T') || text.contains('t') {
            parse_iso_datetime(text)
        } else {
            parse_decimal_secs(text)
        }
    }

    /// Parse a timedelta text form: decimal seconds or an ISO 8601 duration
    /// (`[-]P[nD][T[nH][nM][n[.frac]S]]`).
    ///
    /// # Errors
    ///
    /// Returns `BadTimeText` on malformed input, `TimeOutOfRange` when the
    /// value cannot be represented.
    pub fn parse_td(text: &str) -> Result<Self, AriError> {
        let body = text.strip_prefix('-');
        let (neg, bare) = match body {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if bare.starts_with(['P', 'p']) {
            let v = parse_iso_duration(&bare[1..])?;
            Ok(Self {
                nanos: if neg { -v.nanos } else { v.nanos },
            })
        } else {
            parse_decimal_secs(text)
        }
    }
}

impl fmt::Display for DtnTime {
    /// Canonical form: integer seconds, or decimal seconds with the shortest
    /// fraction.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos < 0 {
            f.write_str("-")?;
        }
        let abs = self.nanos.unsigned_abs();
        let secs = abs / NANOS_PER_SEC as u128;
        let frac = abs % NANOS_PER_SEC as u128;
        if frac == 0 {
            return write!(f, "{secs}");
        }
        let mut digits = format!("{frac:09}");
        while digits.ends_with('0') {
            digits.pop();
        }
        write!(f, "{secs}.{digits}")
    }
}

fn bad(text_err: ErrorCode) -> AriError {
    AriError::at(text_err, Pos::default())
}

/// Parse `[+-]?digits[.digits]` seconds.
fn parse_decimal_secs(text: &str) -> Result<DtnTime, AriError> {
    let (neg, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, fr)) => (i, Some(fr)),
        None => (body, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad(ErrorCode::BadTimeText));
    }
    let secs: i128 = int_part
        .parse()
        .map_err(|_| bad(ErrorCode::TimeOutOfRange))?;
    let mut nanos = secs
        .checked_mul(NANOS_PER_SEC)
        .ok_or_else(|| bad(ErrorCode::TimeOutOfRange))?;
    if let Some(fr) = frac_part {
        if fr.is_empty() || fr.len() > 9 || !fr.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad(ErrorCode::BadTimeText));
        }
        let mut sub: i128 = fr.parse().map_err(|_| bad(ErrorCode::BadTimeText))?;
        sub *= 10i128.pow((9 - fr.len()) as u32);
        nanos += sub;
    }
    if neg {
        nanos = -nanos;
    }
    if nanos / NANOS_PER_SEC > i128::from(i64::MAX) || nanos / NANOS_PER_SEC < i128::from(i64::MIN) {
        return Err(bad(ErrorCode::TimeOutOfRange));
    }
    Ok(DtnTime::from_raw_nanos(nanos))
}

/// Days from 1970-01-01 for a proleptic Gregorian civil date.
const fn days_from_civil(y: i64, m: u32, d: u32) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy as i64;
    era * 146_097 + doe - 719_468
}

fn parse_fixed_u32(s: &str) -> Result<u32, AriError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad(ErrorCode::BadTimeText));
    }
    s.parse().map_err(|_| bad(ErrorCode::BadTimeText))
}

fn parse_iso_datetime(text: &str) -> Result<DtnTime, AriError> {
    let body = text
        .strip_suffix('Z')
        .or_else(|| text.strip_suffix('z'))
        .unwrap_or(text);
    let (date, time) = body
        .split_once(['T', 't'])
        .ok_or_else(|| bad(ErrorCode::BadTimeText))?;

    let mut dit = date.splitn(3, '-');
    let year: i64 = dit
        .next()
        .filter(|s| s.len() == 4)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| bad(ErrorCode::BadTimeText))?;
    let month = parse_fixed_u32(dit.next().ok_or_else(|| bad(ErrorCode::BadTimeText))?)?;
    let day = parse_fixed_u32(dit.next().ok_or_else(|| bad(ErrorCode::BadTimeText))?)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(bad(ErrorCode::BadTimeText));
    }

    let (hms, frac) = match time.split_once('.') {
        Some((h, fr)) => (h, Some(fr)),
        None => (time, None),
    };
    let mut tit = hms.splitn(3, ':');
    let hour = parse_fixed_u32(tit.next().ok_or_else(|| bad(ErrorCode::BadTimeText))?)?;
    let minute = parse_fixed_u32(tit.next().ok_or_else(|| bad(ErrorCode::BadTimeText))?)?;
    let second = parse_fixed_u32(tit.next().ok_or_else(|| bad(ErrorCode::BadTimeText))?)?;
    if hour > 23 || minute > 59 || second > 60 {
        return Err(bad(ErrorCode::BadTimeText));
    }

    let days = days_from_civil(year, month, day) - DTN_EPOCH_DAYS_FROM_UNIX;
    let secs = days * 86_400 + i64::from(hour) * 3_600 + i64::from(minute) * 60 + i64::from(second);
    let mut nanos = i128::from(secs) * NANOS_PER_SEC;
    if let Some(fr) = frac {
        if fr.is_empty() || fr.len() > 9 || !fr.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad(ErrorCode::BadTimeText));
        }
        let sub: i128 = fr.parse().map_err(|_| bad(ErrorCode::BadTimeText))?;
        nanos += sub * 10i128.pow((9 - fr.len()) as u32);
    }
    Ok(DtnTime::from_raw_nanos(nanos))
}

/// Parse the body of an ISO duration after the `P`.
fn parse_iso_duration(body: &str) -> Result<DtnTime, AriError> {
    let mut nanos: i128 = 0;
    let mut rest = body;
    let mut in_time = false;
    let mut seen_any = false;

    while !rest.is_empty() {
        if let Some(r) = rest.strip_prefix(['T', 't']) {
            if in_time {
                return Err(bad(ErrorCode::BadTimeText));
            }
            in_time = true;
            rest = r;
            continue;
        }
        let num_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();
        if num_len == 0 {
            return Err(bad(ErrorCode::BadTimeText));
        }
        let (num, tail) = rest.split_at(num_len);
        let unit = tail
            .chars()
            .next()
            .ok_or_else(|| bad(ErrorCode::BadTimeText))?;
        rest = &tail[unit.len_utf8()..];
        seen_any = true;

        let unit_secs: i128 = match unit.to_ascii_uppercase() {
            'D' if !in_time => 86_400,
            'H' if in_time => 3_600,
            'M' if in_time => 60,
            'S' if in_time => 1,
            _ => return Err(bad(ErrorCode::BadTimeText)),
        };
        if unit == 'S' || unit == 's' {
            let v = parse_decimal_secs(num)?;
            nanos += v.nanos;
        } else {
            if num.contains('.') {
                return Err(bad(ErrorCode::BadTimeText));
            }
            let n: i128 = num.parse().map_err(|_| bad(ErrorCode::BadTimeText))?;
            nanos = nanos
                .checked_add(n * unit_secs * NANOS_PER_SEC)
                .ok_or_else(|| bad(ErrorCode::TimeOutOfRange))?;
        }
    }
    if !seen_any {
        return Err(bad(ErrorCode::BadTimeText));
    }
    Ok(DtnTime::from_raw_nanos(nanos))
}

#[cfg(test)]
mod tests {
    use super::DtnTime;

    #[test]
    fn whole_seconds_display() {
        assert_eq!(DtnTime::from_secs(1_685_728_970).to_string(), "1685728970");
        assert_eq!(DtnTime::from_secs(-3).to_string(), "-3");
    }

    #[test]
    fn fractional_display_trims_zeros() {
        let t = DtnTime::new(12, 500_000_000).unwrap();
        assert_eq!(t.to_string(), "12.5");
        let t = DtnTime::new(-1, -250_000_000).unwrap();
        assert_eq!(t.to_string(), "-1.25");
    }

    #[test]
    fn decimal_parse_roundtrip() {
        let t = DtnTime::parse_td("12.5").unwrap();
        assert_eq!(t, DtnTime::new(12, 500_000_000).unwrap());
        assert_eq!(DtnTime::parse_td("-4").unwrap(), DtnTime::from_secs(-4));
    }

    #[test]
    fn iso_datetime_at_epoch() {
        let t = DtnTime::parse_tp("2000-01-01T00:00:00Z").unwrap();
        assert_eq!(t, DtnTime::from_secs(0));
    }

    #[test]
    fn iso_datetime_known_instant() {
        // 2023-06-02T19:22:50Z is 1685728970 seconds after the DTN epoch.
        let t = DtnTime::parse_tp("2023-06-02T19:22:50Z").unwrap();
        assert_eq!(t, DtnTime::from_secs(1_685_728_970));
    }

    #[test]
    fn iso_duration_forms() {
        assert_eq!(
            DtnTime::parse_td("PT1H30M").unwrap(),
            DtnTime::from_secs(5_400)
        );
        assert_eq!(DtnTime::parse_td("P1D").unwrap(), DtnTime::from_secs(86_400));
        assert_eq!(
            DtnTime::parse_td("-PT0.5S").unwrap(),
            DtnTime::new(0, -500_000_000).unwrap()
        );
    }

    #[test]
    fn decfrac_roundtrip() {
        let t = DtnTime::new(4, 250_000_000).unwrap();
        let (exp, mant) = t.to_decfrac().unwrap();
        assert_eq!((exp, mant), (-2, 425));
        assert_eq!(DtnTime::from_decfrac(exp, mant).unwrap(), t);
    }

    #[test]
    fn rejects_malformed() {
        assert!(DtnTime::parse_tp("2000-13-01T00:00:00Z").is_err());
        assert!(DtnTime::parse_td("P").is_err());
        assert!(DtnTime::parse_td("1.1234567890").is_err());
    }
}
