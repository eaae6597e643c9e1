// src/data/datetime.rs

//! Functions to transform datetime substrings into milliseconds since the
//! Unix epoch, and the [`ScanWindow`] those milliseconds are compared to.
//!
//! A user-supplied timestamp format is one of:
//! - sentinel `"X"`, epoch seconds
//! - sentinel `"x"`, epoch milliseconds
//! - a date-token format string, e.g. `"yyyy-MM-dd HH:mm:ss.SSS"`, which is
//!   translated once into a `chrono` [`strftime`] string by
//!   [`StructuredFormat::new`]
//! - a `chrono` [`strftime`] string, recognized by containing a `%`
//!
//! All parsing is done in UTC. A format without an offset specifier is
//! presumed to be UTC. A format without date specifiers is presumed to be
//! the Unix epoch day, `1970-01-01`.
//!
//! [`strftime`]: https://docs.rs/chrono/latest/chrono/format/strftime/index.html

#![allow(non_camel_case_types)]

use crate::common::EpochMillis;
use crate::debug::printers::str_to_String_noraw;

use std::fmt;

#[doc(hidden)]
pub use ::chrono::{
    DateTime,
    FixedOffset,
    NaiveDate,
    NaiveDateTime,
    SecondsFormat,
    TimeZone,
    Timelike,
    Utc,
};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// format specifiers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A user-supplied timestamp format specifier, e.g. `"HH:mm:ss"` or `"X"`.
pub type FormatSpecifier_str = str;

/// A `chrono` [`strftime`] format string.
///
/// [`strftime`]: https://docs.rs/chrono/latest/chrono/format/strftime/index.html
pub type DateTimePattern_str = str;

/// Format sentinel for epoch seconds.
pub const FORMAT_EPOCH_SECONDS: &FormatSpecifier_str = "X";
/// Format sentinel for epoch milliseconds.
pub const FORMAT_EPOCH_MILLIS: &FormatSpecifier_str = "x";

/// Separator between injected default values, never part of a token.
const INJECT_SEP: char = '\u{1F}';

/// A format specifier could not be translated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormatError {
    pub specifier: String,
    pub reason: String,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bad format specifier {:?}: {}", self.specifier, self.reason)
    }
}

impl std::error::Error for FormatError {}

/// Date-token to `strftime` mapping.
///
/// Longest tokens first so that `"MMMM"` is found before `"MM"`.
/// The run-length of fractional-second `S` tokens is handled separately in
/// [`StructuredFormat::new`].
const TOKEN_MAP: &[(&str, &DateTimePattern_str, Component)] = &[
    ("yyyy", "%Y", Component::Year),
    ("yy", "%y", Component::Year),
    ("y", "%Y", Component::Year),
    ("MMMM", "%B", Component::Month),
    ("MMM", "%b", Component::Month),
    ("MM", "%m", Component::Month),
    ("M", "%m", Component::Month),
    ("dd", "%d", Component::Day),
    ("d", "%d", Component::Day),
    ("EEEE", "%A", Component::Weekday),
    ("EEE", "%a", Component::Weekday),
    ("HH", "%H", Component::Hour24),
    ("H", "%H", Component::Hour24),
    ("hh", "%I", Component::Hour12),
    ("h", "%I", Component::Hour12),
    ("mm", "%M", Component::Minute),
    ("m", "%M", Component::Minute),
    ("ss", "%S", Component::Second),
    ("s", "%S", Component::Second),
    ("a", "%p", Component::AmPm),
    ("ZZZ", "%z", Component::Offset),
    ("ZZ", "%:z", Component::Offset),
    ("Z", "%#z", Component::Offset),
];

/// Which datetime component a format token provides.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Component {
    Year,
    Month,
    Day,
    Weekday,
    Hour24,
    Hour12,
    AmPm,
    Minute,
    Second,
    Fraction,
    Offset,
}

/// A structured date/time format translated to `strftime` along with a
/// record of which datetime components it provides.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct StructuredFormat {
    /// the user-supplied specifier
    specifier: String,
    /// the translated `strftime` pattern
    pattern: String,
    has_year: bool,
    has_month: bool,
    has_day: bool,
    has_hour24: bool,
    has_hour12: bool,
    has_ampm: bool,
    has_minute: bool,
    has_second: bool,
    has_offset: bool,
    /// multiplier from a `%f` parsed value to nanoseconds, for an
    /// undotted fraction of other than 3, 6, or 9 digits
    fraction_scale: Option<u32>,
}

impl fmt::Debug for StructuredFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredFormat")
            .field("specifier", &self.specifier)
            .field("pattern", &self.pattern)
            .field("has_offset", &self.has_offset)
            .finish()
    }
}

impl StructuredFormat {
    /// Translate a format specifier to a `StructuredFormat`.
    ///
    /// A specifier containing `%` is taken to be a `strftime` pattern
    /// as-is.
    pub fn new(specifier: &FormatSpecifier_str) -> Result<StructuredFormat, FormatError> {
        defn!("({:?})", specifier);
        if specifier.is_empty() {
            defx!("empty");
            return Err(FormatError {
                specifier: specifier.to_string(),
                reason: String::from("empty format"),
            });
        }
        let mut sf = StructuredFormat {
            specifier: specifier.to_string(),
            ..Default::default()
        };
        if specifier.contains('%') {
            sf.pattern = specifier.to_string();
            sf.scan_strftime_components();
            defx!("strftime {:?}", sf);
            return Ok(sf);
        }

        let chars: Vec<char> = specifier.chars().collect();
        let mut pattern = String::with_capacity(specifier.len() * 2);
        let mut at: usize = 0;
        'outer: while at < chars.len() {
            let c = chars[at];
            // quoted literal, `''` is an escaped single quote
            if c == '\'' {
                if chars.get(at + 1) == Some(&'\'') {
                    pattern.push('\'');
                    at += 2;
                    continue;
                }
                let mut end = at + 1;
                while end < chars.len() && chars[end] != '\'' {
                    push_literal(&mut pattern, chars[end]);
                    end += 1;
                }
                if end >= chars.len() {
                    defx!("unterminated quote");
                    return Err(FormatError {
                        specifier: specifier.to_string(),
                        reason: String::from("unterminated quoted literal"),
                    });
                }
                at = end + 1;
                continue;
            }
            // fractional seconds, `S` repeated
            if c == 'S' {
                let mut run: usize = 0;
                while at + run < chars.len() && chars[at + run] == 'S' {
                    run += 1;
                }
                if run > 9 {
                    defx!("too many S");
                    return Err(FormatError {
                        specifier: specifier.to_string(),
                        reason: format!("fractional seconds token of length {}", run),
                    });
                }
                if pattern.ends_with('.') {
                    // `%.f` takes the `.` and any count of digits
                    pattern.pop();
                    pattern.push_str("%.f");
                } else {
                    match run {
                        3 => pattern.push_str("%3f"),
                        6 => pattern.push_str("%6f"),
                        9 => pattern.push_str("%9f"),
                        _ => {
                            // `%f` reads the digits as nanoseconds
                            pattern.push_str("%f");
                            sf.fraction_scale = Some(10_u32.pow(9 - run as u32));
                        }
                    }
                }
                sf.set_component(Component::Fraction);
                at += run;
                continue;
            }
            for (token, strftime, component) in TOKEN_MAP.iter() {
                let tlen = token.len();
                if at + tlen <= chars.len()
                    && chars[at..at + tlen]
                        .iter()
                        .copied()
                        .eq(token.chars())
                {
                    // a token must not be followed by more of the same letter,
                    // e.g. `MMMMM` is not `MMMM` + `M`
                    if tlen == 4 && chars.get(at + tlen) == Some(&c) {
                        return Err(FormatError {
                            specifier: specifier.to_string(),
                            reason: format!("unsupported token run at index {}", at),
                        });
                    }
                    pattern.push_str(strftime);
                    sf.set_component(*component);
                    at += tlen;
                    continue 'outer;
                }
            }
            push_literal(&mut pattern, c);
            at += 1;
        }
        sf.pattern = pattern;
        defx!("{:?}", sf);

        Ok(sf)
    }

    fn set_component(
        &mut self,
        component: Component,
    ) {
        match component {
            Component::Year => self.has_year = true,
            Component::Month => self.has_month = true,
            Component::Day => self.has_day = true,
            Component::Hour24 => self.has_hour24 = true,
            Component::Hour12 => self.has_hour12 = true,
            Component::AmPm => self.has_ampm = true,
            Component::Minute => self.has_minute = true,
            Component::Second => self.has_second = true,
            Component::Offset => self.has_offset = true,
            Component::Weekday | Component::Fraction => {}
        }
    }

    /// Set the component flags for a raw `strftime` pattern.
    fn scan_strftime_components(&mut self) {
        let mut iter = self.pattern.clone().into_bytes().into_iter().peekable();
        while let Some(b) = iter.next() {
            if b != b'%' {
                continue;
            }
            // skip flags and modifiers, e.g. `%-d`, `%:z`, `%3f`
            let mut conversion = iter.next();
            while matches!(conversion, Some(b'-' | b'_' | b'0' | b':' | b'#' | b'.' | b'1'..=b'9')) {
                conversion = iter.next();
            }
            match conversion {
                Some(b'Y' | b'y' | b'G' | b'g') => self.set_component(Component::Year),
                Some(b'm' | b'b' | b'B' | b'h') => self.set_component(Component::Month),
                Some(b'd' | b'e') => self.set_component(Component::Day),
                Some(b'H' | b'k') => self.set_component(Component::Hour24),
                Some(b'I' | b'l') => self.set_component(Component::Hour12),
                Some(b'p' | b'P') => self.set_component(Component::AmPm),
                Some(b'M') => self.set_component(Component::Minute),
                Some(b'S') => self.set_component(Component::Second),
                Some(b'z' | b'Z') => self.set_component(Component::Offset),
                Some(b'F' | b'D' | b'x') => {
                    self.set_component(Component::Year);
                    self.set_component(Component::Month);
                    self.set_component(Component::Day);
                }
                Some(b'T' | b'X') => {
                    self.set_component(Component::Hour24);
                    self.set_component(Component::Minute);
                    self.set_component(Component::Second);
                }
                Some(b'R') => {
                    self.set_component(Component::Hour24);
                    self.set_component(Component::Minute);
                }
                Some(b's') => {
                    // `%s` is a full instant, nothing may be injected
                    self.has_year = true;
                    self.has_month = true;
                    self.has_day = true;
                    self.has_hour24 = true;
                    self.has_minute = true;
                    self.has_second = true;
                }
                _ => {}
            }
        }
    }

    /// The user-supplied specifier.
    pub fn specifier(&self) -> &FormatSpecifier_str {
        self.specifier.as_str()
    }

    /// The translated `strftime` pattern.
    pub fn pattern(&self) -> &DateTimePattern_str {
        self.pattern.as_str()
    }

    /// Parse `data` entirely, filling in any datetime components this
    /// format does not provide, and return epoch milliseconds.
    pub fn parse_millis(
        &self,
        data: &str,
    ) -> Option<EpochMillis> {
        defn!("(pattern {:?}, data {:?})", self.pattern, str_to_String_noraw(data));
        // inject default values for missing components ahead of the data
        let mut data_ = String::with_capacity(data.len() + 32);
        let mut pattern_ = String::with_capacity(self.pattern.len() + 32);
        let mut inject = |value: &str, directive: &str| {
            data_.push_str(value);
            data_.push(INJECT_SEP);
            pattern_.push_str(directive);
            pattern_.push(INJECT_SEP);
        };
        if !self.has_year {
            inject("1970", "%Y");
        }
        if !self.has_month {
            inject("01", "%m");
        }
        if !self.has_day {
            inject("01", "%d");
        }
        if !self.has_hour24 && !self.has_hour12 {
            inject("00", "%H");
        } else if self.has_hour12 && !self.has_ampm {
            inject("AM", "%p");
        }
        if !self.has_minute {
            inject("00", "%M");
        }
        if !self.has_second {
            inject("00", "%S");
        }
        data_.push_str(data);
        pattern_.push_str(self.pattern.as_str());

        let dtn: Option<NaiveDateTime> = if self.has_offset {
            match DateTime::parse_from_str(data_.as_str(), pattern_.as_str()) {
                Ok(dt) => Some(dt.naive_utc()),
                Err(_err) => {
                    defo!("DateTime::parse_from_str failed {}", _err);
                    None
                }
            }
        } else {
            match NaiveDateTime::parse_from_str(data_.as_str(), pattern_.as_str()) {
                Ok(dtn) => Some(dtn),
                Err(_err) => {
                    defo!("NaiveDateTime::parse_from_str failed {}", _err);
                    None
                }
            }
        };
        let millis: Option<EpochMillis> = dtn
            .and_then(|dtn| self.scale_fraction(dtn))
            .map(|dtn| Utc.from_utc_datetime(&dtn).timestamp_millis());
        defx!("return {:?}", millis);

        millis
    }

    /// Apply `fraction_scale` to the parsed nanoseconds. `None` if the
    /// data had more fraction digits than the format.
    fn scale_fraction(
        &self,
        dtn: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        let scale: u32 = match self.fraction_scale {
            Some(scale) => scale,
            None => return Some(dtn),
        };
        let nanos: u32 = dtn
            .nanosecond()
            .checked_mul(scale)
            .filter(|nanos| *nanos < 1_000_000_000)?;
        defñ!("nanoseconds {} × {} = {}", dtn.nanosecond(), scale, nanos);

        dtn.with_nanosecond(nanos)
    }
}

/// Push a literal `char` to a `strftime` pattern, escaping `%`.
fn push_literal(
    pattern: &mut String,
    c: char,
) {
    if c == '%' {
        pattern.push_str("%%");
    } else {
        pattern.push(c);
    }
}

/// How a matched timestamp substring is interpreted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TimestampFormat {
    /// sentinel `"X"`
    EpochSeconds,
    /// sentinel `"x"`
    EpochMillis,
    /// any other specifier
    Structured(StructuredFormat),
    /// the implicit fallback, an ISO-8601 instant
    Iso8601,
}

impl TimestampFormat {
    /// Create a `TimestampFormat` from a user-supplied specifier.
    pub fn from_specifier(specifier: &FormatSpecifier_str) -> Result<TimestampFormat, FormatError> {
        match specifier {
            FORMAT_EPOCH_SECONDS => Ok(TimestampFormat::EpochSeconds),
            FORMAT_EPOCH_MILLIS => Ok(TimestampFormat::EpochMillis),
            _ => Ok(TimestampFormat::Structured(StructuredFormat::new(specifier)?)),
        }
    }

    /// Interpret `data` per this format.
    /// Returns `None` if `data` is not a valid instant.
    pub fn parse_millis(
        &self,
        data: &str,
    ) -> Option<EpochMillis> {
        let millis = match self {
            TimestampFormat::EpochSeconds => epoch_seconds_to_millis(data),
            TimestampFormat::EpochMillis => data.trim().parse::<EpochMillis>().ok(),
            TimestampFormat::Structured(sf) => sf.parse_millis(data),
            TimestampFormat::Iso8601 => parse_iso8601_millis(data),
        }?;
        // must be representable as a datetime
        millis_to_datetime(millis)?;

        Some(millis)
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampFormat::EpochSeconds => write!(f, "{}", FORMAT_EPOCH_SECONDS),
            TimestampFormat::EpochMillis => write!(f, "{}", FORMAT_EPOCH_MILLIS),
            TimestampFormat::Structured(sf) => write!(f, "{}", sf.specifier()),
            TimestampFormat::Iso8601 => write!(f, "ISO-8601"),
        }
    }
}

/// Epoch seconds, possibly with a fractional part, to epoch milliseconds.
fn epoch_seconds_to_millis(data: &str) -> Option<EpochMillis> {
    let data = data.trim();
    if let Ok(secs) = data.parse::<i64>() {
        return secs.checked_mul(1000);
    }
    match data.parse::<f64>() {
        Ok(secs) if secs.is_finite() => {
            let millis = (secs * 1000.0).round();
            if millis < (i64::MIN as f64) || millis > (i64::MAX as f64) {
                return None;
            }
            Some(millis as EpochMillis)
        }
        _ => None,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ISO-8601
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Regular expression for the implicit fallback rule, a bare ISO-8601
/// instant found anywhere in a line.
pub const ISO8601_REGEX: &str =
    r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|z|[+-]\d{2}:?\d{2})?";

/// ISO-8601 forms with an offset that are not RFC 3339.
const ISO8601_PATTERNS_TZ: &[&DateTimePattern_str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%:z",
];

/// ISO-8601 forms without an offset, presumed UTC.
const ISO8601_PATTERNS_NAIVE: &[&DateTimePattern_str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-8601 instant or date to epoch milliseconds.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS[.fff]]` with an optional `Z`
/// or numeric offset (no offset is UTC), and a bare `YYYY-MM-DD` (midnight
/// UTC).
pub fn parse_iso8601_millis(data: &str) -> Option<EpochMillis> {
    let data = data.trim();
    defñ!("({:?})", data);
    if let Ok(dt) = DateTime::parse_from_rfc3339(data) {
        return Some(dt.timestamp_millis());
    }
    // chrono `%z` does not accept `Z`
    let (data_, zulu) = match data.strip_suffix('Z').or_else(|| data.strip_suffix('z')) {
        Some(d) => (d, true),
        None => (data, false),
    };
    if !zulu {
        for pattern in ISO8601_PATTERNS_TZ.iter() {
            if let Ok(dt) = DateTime::parse_from_str(data_, pattern) {
                return Some(dt.timestamp_millis());
            }
        }
    }
    for pattern in ISO8601_PATTERNS_NAIVE.iter() {
        if let Ok(dtn) = NaiveDateTime::parse_from_str(data_, pattern) {
            return Some(Utc.from_utc_datetime(&dtn).timestamp_millis());
        }
    }
    if !zulu {
        if let Ok(date) = NaiveDate::parse_from_str(data_, "%Y-%m-%d") {
            let dtn: NaiveDateTime = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&dtn).timestamp_millis());
        }
    }

    None
}

/// Epoch milliseconds to a `DateTime<Utc>`, `None` if out of range.
pub fn millis_to_datetime(millis: EpochMillis) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Epoch milliseconds to an RFC 3339 string, for printing.
pub fn millis_to_rfc3339(millis: EpochMillis) -> String {
    match millis_to_datetime(millis) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => format!("@{}ms", millis),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ScanWindow
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where a timestamp falls relative to a [`ScanWindow`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Result_Filter_Window {
    /// like Pass
    InRange,
    /// like Fail
    BeforeRange,
    /// like Fail
    AfterRange,
}

impl Result_Filter_Window {
    #[inline(always)]
    pub const fn is_pass(&self) -> bool {
        matches!(*self, Result_Filter_Window::InRange)
    }

    #[inline(always)]
    pub const fn is_fail(&self) -> bool {
        !self.is_pass()
    }
}

/// An inclusive `[start_epoch, end_epoch]` range of epoch milliseconds.
///
/// An inverted window, `start_epoch > end_epoch`, is allowed and contains
/// nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ScanWindow {
    pub start_epoch: EpochMillis,
    pub end_epoch: EpochMillis,
}

impl ScanWindow {
    pub const fn new(
        start_epoch: EpochMillis,
        end_epoch: EpochMillis,
    ) -> ScanWindow {
        ScanWindow {
            start_epoch,
            end_epoch,
        }
    }

    /// A window containing every representable instant.
    pub const fn all() -> ScanWindow {
        ScanWindow::new(EpochMillis::MIN, EpochMillis::MAX)
    }

    pub const fn is_inverted(&self) -> bool {
        self.start_epoch > self.end_epoch
    }

    /// Compare `millis` to this window, bounds inclusive.
    ///
    /// For an inverted window a timestamp may be both before the start and
    /// after the end; it is reported as `BeforeRange`.
    pub const fn position(
        &self,
        millis: EpochMillis,
    ) -> Result_Filter_Window {
        if millis < self.start_epoch {
            Result_Filter_Window::BeforeRange
        } else if millis > self.end_epoch {
            Result_Filter_Window::AfterRange
        } else {
            Result_Filter_Window::InRange
        }
    }

    #[inline(always)]
    pub const fn contains(
        &self,
        millis: EpochMillis,
    ) -> bool {
        self.position(millis).is_pass()
    }
}

impl fmt::Display for ScanWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}]",
            millis_to_rfc3339(self.start_epoch),
            millis_to_rfc3339(self.end_epoch)
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// window bounds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Forms accepted for a user-passed window bound, besides ISO-8601 and
/// `@` epoch seconds. All are UTC.
const WINDOW_BOUND_PATTERNS: &[&DateTimePattern_str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a user-passed window bound to epoch milliseconds.
///
/// Accepts RFC 3339 and the ISO-8601 forms of [`parse_iso8601_millis`],
/// `YYYY-MM-DD HH:MM[:SS[.fff]]` (UTC), or `@` followed by epoch seconds,
/// e.g. `"@1672531200"`.
pub fn parse_window_bound(data: &str) -> Option<EpochMillis> {
    let data = data.trim();
    if let Some(secs) = data.strip_prefix('@') {
        return epoch_seconds_to_millis(secs);
    }
    if let Some(millis) = parse_iso8601_millis(data) {
        return Some(millis);
    }
    for pattern in WINDOW_BOUND_PATTERNS.iter() {
        if let Ok(dtn) = NaiveDateTime::parse_from_str(data, pattern) {
            return Some(Utc.from_utc_datetime(&dtn).timestamp_millis());
        }
    }

    None
}
