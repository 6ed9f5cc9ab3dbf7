//! Literal payloads carried by tokens and AST nodes.
//!
//! Literals are cooked by the lexer: a token never holds raw digits or
//! escape sequences, only the value they denote. [`Literal::render`] goes
//! the other way and produces text that lexes back to an equal literal.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use uuid::Uuid;

use crate::{Name, StringInterner};

/// Dotted version number with up to four components.
///
/// Missing trailing components compare as zero, so `1.2` equals `1.2.0`.
#[derive(Copy, Clone, Default)]
pub struct VersionNumber {
    parts: [u32; 4],
    len: u8,
}

impl VersionNumber {
    pub const MAX_PARTS: usize = 4;

    /// Build from components; `None` when empty or longer than four.
    pub fn new(parts: &[u32]) -> Option<Self> {
        if parts.is_empty() || parts.len() > Self::MAX_PARTS {
            return None;
        }
        let mut out = [0u32; 4];
        out[..parts.len()].copy_from_slice(parts);
        Some(VersionNumber {
            parts: out,
            // Bounded by MAX_PARTS above.
            len: u8::try_from(parts.len()).unwrap_or(4),
        })
    }

    pub fn major(self) -> u32 {
        self.parts[0]
    }

    pub fn parts(&self) -> &[u32] {
        &self.parts[..usize::from(self.len)]
    }

    /// Parse `1`, `1.2`, `1.2.3` or `1.2.3.4`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = Vec::with_capacity(4);
        for piece in text.split('.') {
            if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            parts.push(piece.parse().ok()?);
        }
        Self::new(&parts)
    }

    /// Same major version and at least as new as `requested`.
    pub fn satisfies(self, requested: VersionNumber) -> bool {
        self.major() == requested.major() && self >= requested
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for VersionNumber {}

impl Hash for VersionNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts().iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{self}")
    }
}

/// A cooked literal value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Literal {
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    String(Name),
    Char(char),
    Name(Name),
    DateTime(NaiveDateTime),
    TimeSpan(TimeDelta),
    Version(VersionNumber),
    Guid(Uuid),
}

impl Literal {
    /// Render as script text.
    pub fn render(&self, interner: &StringInterner) -> String {
        match self {
            Literal::Boolean(b) => b.to_string(),
            // The minimum has no positive decimal counterpart to negate.
            Literal::Integer(i32::MIN) => format!("0x{:X}", i32::MIN),
            Literal::Integer(n) => n.to_string(),
            Literal::Long(i64::MIN) => format!("0x{:X}L", i64::MIN),
            Literal::Long(n) => format!("{n}L"),
            Literal::Double(d) => format_double(*d),
            Literal::String(s) => quote(&interner.lookup(*s)),
            Literal::Char(c) => format!("{}c", quote(&c.to_string())),
            Literal::Name(n) => format!("{}n", quote(&interner.lookup(*n))),
            Literal::DateTime(dt) => format!("{}dt", quote(&format_datetime(*dt))),
            Literal::TimeSpan(ts) => format!("{}ts", quote(&format_timespan(*ts))),
            Literal::Version(v) => {
                // Fewer than three components would lex as a number.
                let mut parts = v.parts().to_vec();
                while parts.len() < 3 {
                    parts.push(0);
                }
                parts
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(".")
            }
            Literal::Guid(g) => format!("{}g", quote(&g.to_string())),
        }
    }
}

/// Shortest text that lexes back to the same `Double`.
pub fn format_double(d: f64) -> String {
    let text = format!("{d:?}");
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

/// Double-quoted string with C-style escapes.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `YYYY-MM-DDTHH:MM:SS[.fraction]`.
pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.f]` and
/// `YYYY-MM-DD HH:MM:SS[.f]`.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date(text))
}

/// Date at midnight.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Time of day as the span since midnight.
pub fn parse_time_of_day(text: &str) -> Option<TimeDelta> {
    let text = text.trim();
    let time = NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()?;
    Some(time.signed_duration_since(NaiveTime::from_hms_opt(0, 0, 0)?))
}

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// `[-][d.]HH:MM:SS[.fraction]`.
pub fn format_timespan(span: TimeDelta) -> String {
    let negative = span < TimeDelta::zero();
    let magnitude = span.abs();
    let total_seconds = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let days = total_seconds / SECONDS_PER_DAY;
    let hours = (total_seconds % SECONDS_PER_DAY) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Inverse of [`format_timespan`].
pub fn parse_timespan(text: &str) -> Option<TimeDelta> {
    let text = text.trim();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (days, clock) = match text.split_once('.') {
        Some((d, rest)) if !d.contains(':') => (d.parse::<i64>().ok()?, rest),
        _ => (0, text),
    };
    let (clock, fraction) = match clock.split_once('.') {
        Some((c, f)) => (c, Some(f)),
        None => (clock, None),
    };
    let mut fields = clock.split(':');
    let hours: i64 = fields.next()?.parse().ok()?;
    let minutes: i64 = fields.next()?.parse().ok()?;
    let seconds: i64 = match fields.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if fields.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    let nanos = match fraction {
        Some(f) if !f.is_empty() && f.len() <= 9 && f.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{f:0<9}").parse::<i64>().ok()?
        }
        Some(_) => return None,
        None => 0,
    };
    let whole = days
        .checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours.checked_mul(3600)?)?
        .checked_add(minutes * 60 + seconds)?;
    let total = whole.checked_mul(NANOS_PER_SECOND)?.checked_add(nanos)?;
    let span = TimeDelta::nanoseconds(total);
    Some(if negative { -span } else { span })
}
