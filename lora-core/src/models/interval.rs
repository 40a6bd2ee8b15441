//! Half-open time intervals over an instant domain extended with ±infinity.
//!
//! Both time axes (registration and virkning) use the same algebra. Bounds are
//! totally ordered: `-infinity < any instant < +infinity`, and two infinite
//! bounds of the same sign compare equal, so `[a, +inf)` and `[+inf, ..)` never
//! arise and adjacency/merging treat open ends uniformly.

use std::cmp::{max, min};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::TemporalError;

/// One end of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeBound {
    NegInfinity,
    At(DateTime<Utc>),
    PosInfinity,
}

impl TimeBound {
    pub fn is_finite(&self) -> bool {
        matches!(self, TimeBound::At(_))
    }

    /// The instant, if finite.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            TimeBound::At(t) => Some(*t),
            _ => None,
        }
    }

    /// Parse `-infinity`, `infinity` / `+infinity`, or an RFC 3339 timestamp.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "-infinity" => Ok(TimeBound::NegInfinity),
            "infinity" | "+infinity" => Ok(TimeBound::PosInfinity),
            other => DateTime::parse_from_rfc3339(other)
                .map(|dt| TimeBound::At(dt.with_timezone(&Utc)))
                .map_err(|e| format!("invalid time bound '{other}': {e}")),
        }
    }
}

impl From<DateTime<Utc>> for TimeBound {
    fn from(t: DateTime<Utc>) -> Self {
        TimeBound::At(t)
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBound::NegInfinity => f.write_str("-infinity"),
            TimeBound::At(t) => f.write_str(&t.to_rfc3339()),
            TimeBound::PosInfinity => f.write_str("infinity"),
        }
    }
}

impl Serialize for TimeBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TimeBound::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A non-empty half-open interval `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    from: TimeBound,
    to: TimeBound,
}

#[derive(Deserialize)]
struct RawInterval {
    from: TimeBound,
    to: TimeBound,
}

impl TryFrom<RawInterval> for Interval {
    type Error = TemporalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Interval::new(raw.from, raw.to)
    }
}

impl Interval {
    /// Build an interval. Fails with `InvalidInterval` unless `from < to`.
    pub fn new(from: impl Into<TimeBound>, to: impl Into<TimeBound>) -> Result<Self, TemporalError> {
        let (from, to) = (from.into(), to.into());
        if from >= to {
            return Err(TemporalError::InvalidInterval {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// `(-infinity, +infinity)`.
    pub fn always() -> Self {
        Self {
            from: TimeBound::NegInfinity,
            to: TimeBound::PosInfinity,
        }
    }

    /// `[t, +infinity)`.
    pub fn starting(t: DateTime<Utc>) -> Self {
        Self {
            from: TimeBound::At(t),
            to: TimeBound::PosInfinity,
        }
    }

    pub fn from(&self) -> TimeBound {
        self.from
    }

    pub fn to(&self) -> TimeBound {
        self.to
    }

    /// True when the interval has no end.
    pub fn is_open(&self) -> bool {
        self.to == TimeBound::PosInfinity
    }

    /// `from <= t < to`.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.contains_bound(TimeBound::At(t))
    }

    pub fn contains_bound(&self, t: TimeBound) -> bool {
        self.from <= t && t < self.to
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn covers(&self, other: &Interval) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.from < other.to && other.from < self.to
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let from = max(self.from, other.from);
        let to = min(self.to, other.to);
        (from < to).then_some(Interval { from, to })
    }

    /// The intervals touch without overlapping.
    pub fn is_adjacent(&self, other: &Interval) -> bool {
        self.to == other.from || other.to == self.from
    }

    /// Union of two overlapping or adjacent intervals.
    pub fn merge(&self, other: &Interval) -> Option<Interval> {
        if !(self.overlaps(other) || self.is_adjacent(other)) {
            return None;
        }
        Some(Interval {
            from: min(self.from, other.from),
            to: max(self.to, other.to),
        })
    }

    /// The parts of `self` not covered by `other`, in ascending order.
    pub fn subtract(&self, other: &Interval) -> Vec<Interval> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        let mut pieces = Vec::with_capacity(2);
        if self.from < other.from {
            pieces.push(Interval {
                from: self.from,
                to: other.from,
            });
        }
        if other.to < self.to {
            pieces.push(Interval {
                from: other.to,
                to: self.to,
            });
        }
        pieces
    }

    /// End the interval at `end`; `None` if nothing remains.
    pub fn truncate_at(&self, end: TimeBound) -> Option<Interval> {
        let to = min(self.to, end);
        (self.from < to).then_some(Interval { from: self.from, to })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}
