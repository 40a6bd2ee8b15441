//! Column encodings shared by the query modules.
//!
//! Time bounds are stored as INTEGER microseconds since the epoch, with
//! `i64::MIN` / `i64::MAX` standing for -infinity / +infinity, so interval
//! predicates are plain integer comparisons in SQL.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use lora_core::errors::{LoraResult, StorageError};
use lora_core::models::{Interval, TimeBound};

pub const NEG_INFINITY: i64 = i64::MIN;
pub const POS_INFINITY: i64 = i64::MAX;

pub fn bound_to_sql(bound: TimeBound) -> i64 {
    match bound {
        TimeBound::NegInfinity => NEG_INFINITY,
        TimeBound::At(t) => t.timestamp_micros(),
        TimeBound::PosInfinity => POS_INFINITY,
    }
}

pub fn instant_to_sql(t: DateTime<Utc>) -> i64 {
    t.timestamp_micros()
}

/// Drop sub-microsecond precision so an instant compares equal to its
/// stored form.
pub fn to_storage_precision(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(t.timestamp_micros()).unwrap_or(t)
}

/// Round a validity bound up to the next stored microsecond. Rounding both
/// ends up keeps every storable instant on the same side of the bound.
pub fn bound_to_storage_precision(bound: TimeBound) -> TimeBound {
    match bound {
        TimeBound::At(t) => {
            let floor = to_storage_precision(t);
            if floor == t {
                TimeBound::At(t)
            } else {
                TimeBound::At(floor.checked_add_signed(Duration::microseconds(1)).unwrap_or(floor))
            }
        }
        infinite => infinite,
    }
}

pub fn bound_from_sql(table: &str, micros: i64) -> LoraResult<TimeBound> {
    match micros {
        NEG_INFINITY => Ok(TimeBound::NegInfinity),
        POS_INFINITY => Ok(TimeBound::PosInfinity),
        m => instant_from_sql(table, m).map(TimeBound::At),
    }
}

pub fn instant_from_sql(table: &str, micros: i64) -> LoraResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| corrupt(table, format!("timestamp out of range: {micros}")))
}

pub fn interval_from_sql(table: &str, from: i64, to: i64) -> LoraResult<Interval> {
    let from = bound_from_sql(table, from)?;
    let to = bound_from_sql(table, to)?;
    Interval::new(from, to).map_err(|e| corrupt(table, e.to_string()))
}

pub fn uuid_from_sql(table: &str, s: &str) -> LoraResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| corrupt(table, format!("uuid '{s}': {e}")))
}

pub fn corrupt(table: &str, message: String) -> lora_core::LoraError {
    StorageError::CorruptRow {
        table: table.to_string(),
        message,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bounds_keep_their_order_in_sql() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap();
        let encoded = [
            bound_to_sql(TimeBound::NegInfinity),
            bound_to_sql(TimeBound::At(t)),
            bound_to_sql(TimeBound::PosInfinity),
        ];
        assert!(encoded[0] < encoded[1] && encoded[1] < encoded[2]);
        assert_eq!(bound_from_sql("t", encoded[1]).unwrap(), TimeBound::At(t));
        assert_eq!(bound_from_sql("t", encoded[2]).unwrap(), TimeBound::PosInfinity);
    }

    #[test]
    fn sub_microsecond_bounds_round_up() {
        let t = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
        let ragged = t + Duration::nanoseconds(999);
        assert_eq!(
            bound_to_storage_precision(TimeBound::At(ragged)),
            TimeBound::At(t + Duration::microseconds(1))
        );
        assert_eq!(bound_to_storage_precision(TimeBound::At(t)), TimeBound::At(t));
        assert_eq!(
            bound_to_storage_precision(TimeBound::PosInfinity),
            TimeBound::PosInfinity
        );
    }
}
