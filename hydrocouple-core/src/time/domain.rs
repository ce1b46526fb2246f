use super::calendar::{Calendar, CalendarDateTime};
use crate::errors::{CouplingError, CouplingResult};
use num::ToPrimitive;
use serde::{Deserialize, Serialize};

/// The temporal domain of a component.
///
/// A strictly increasing and regularly spaced sequence of timestamps on a given calendar.
/// The last timestamp closes the last interval, so a domain of `n` timestamps describes
/// `n - 1` steps.
///
/// Timestamps are held as whole seconds since 1970-01-01 of the calendar. Two domains
/// built from different reference dates, time units or numeric precisions are equal as
/// long as they describe the same instants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TimeDomainRepr")]
pub struct TimeDomain {
    calendar: Calendar,
    timestamps: Vec<i64>,
    step: i64,
}

/// Serialised form of a [`TimeDomain`], checked again when read back.
#[derive(Deserialize)]
struct TimeDomainRepr {
    calendar: Calendar,
    timestamps: Vec<i64>,
}

impl TryFrom<TimeDomainRepr> for TimeDomain {
    type Error = CouplingError;

    fn try_from(repr: TimeDomainRepr) -> CouplingResult<Self> {
        Self::from_timestamps(repr.timestamps, repr.calendar)
    }
}

impl TimeDomain {
    /// Build a domain from CF-style numeric timestamps.
    ///
    /// `units` has the form `"<seconds|minutes|hours|days> since <date-time>"`,
    /// e.g. `"days since 2019-01-01 09:00:00Z"`.
    pub fn new<T: ToPrimitive>(
        values: &[T],
        units: &str,
        calendar: Calendar,
    ) -> CouplingResult<Self> {
        let (unit_seconds, reference) = parse_time_units(units)?;
        let origin = calendar.seconds_since_epoch(&reference)?;

        let timestamps = values
            .iter()
            .map(|value| {
                let seconds = value
                    .to_f64()
                    .map(|v| (v * unit_seconds as f64).round())
                    .filter(|v| (i64::MIN as f64..i64::MAX as f64).contains(v))
                    .ok_or_else(|| {
                        CouplingError::InvalidDomain(
                            "timestamps must be finite numbers of seconds within the i64 range"
                                .into(),
                        )
                    })?;
                origin.checked_add(seconds as i64).ok_or_else(|| {
                    CouplingError::InvalidDomain(format!(
                        "timestamp {seconds} s after the reference date is out of range"
                    ))
                })
            })
            .collect::<CouplingResult<Vec<_>>>()?;

        Self::from_timestamps(timestamps, calendar)
    }

    /// Build a domain from seconds elapsed since 1970-01-01 of `calendar`.
    pub fn from_timestamps(timestamps: Vec<i64>, calendar: Calendar) -> CouplingResult<Self> {
        if timestamps.len() < 2 {
            return Err(CouplingError::InvalidDomain(
                "a temporal domain needs at least two timestamps".into(),
            ));
        }
        let steps = timestamps
            .windows(2)
            .map(|pair| pair[1].checked_sub(pair[0]).filter(|step| *step > 0))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                CouplingError::InvalidDomain("timestamps must be strictly increasing".into())
            })?;
        let step = steps[0];
        if let Some(other) = steps.iter().find(|s| **s != step) {
            return Err(CouplingError::InvalidDomain(format!(
                "irregular timestep: expected {step} s, found {other} s"
            )));
        }

        Ok(Self {
            calendar,
            timestamps,
            step,
        })
    }

    /// Build a domain spanning `start` to `end` inclusive, every `step_seconds`.
    pub fn from_start_end_step(
        start: CalendarDateTime,
        end: CalendarDateTime,
        step_seconds: i64,
        calendar: Calendar,
    ) -> CouplingResult<Self> {
        if step_seconds <= 0 {
            return Err(CouplingError::InvalidDomain(
                "the timestep must be positive".into(),
            ));
        }
        let first = calendar.seconds_since_epoch(&start)?;
        let last = calendar.seconds_since_epoch(&end)?;
        if (last - first) % step_seconds != 0 {
            return Err(CouplingError::InvalidDomain(format!(
                "the period from {start} to {end} is not a whole number of {step_seconds} s steps"
            )));
        }

        Self::from_timestamps((first..=last).step_by(step_seconds as usize).collect(), calendar)
    }

    pub fn from_datetime_sequence(
        datetimes: &[CalendarDateTime],
        calendar: Calendar,
    ) -> CouplingResult<Self> {
        let timestamps = datetimes
            .iter()
            .map(|datetime| calendar.seconds_since_epoch(datetime))
            .collect::<CouplingResult<Vec<_>>>()?;
        Self::from_timestamps(timestamps, calendar)
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Number of timestamps, including the one closing the last interval.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of steps to execute.
    pub fn steps(&self) -> usize {
        self.timestamps.len() - 1
    }

    pub fn timestep_seconds(&self) -> i64 {
        self.step
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn start(&self) -> i64 {
        self.timestamps[0]
    }

    pub fn end(&self) -> i64 {
        self.timestamps[self.timestamps.len() - 1]
    }

    /// Whether `timestamp` is one of the timestamps of this domain.
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start()
            && timestamp <= self.end()
            && (timestamp - self.start()) % self.step == 0
    }

    pub fn datetime_at(&self, index: usize) -> CouplingResult<CalendarDateTime> {
        let seconds = self.timestamps.get(index).ok_or_else(|| {
            CouplingError::InvalidDomain(format!(
                "index {index} is outside of a domain of {} timestamps",
                self.len()
            ))
        })?;
        self.calendar.datetime_from_seconds(*seconds)
    }

    /// Whether the time coordinate of a variable covers this domain.
    ///
    /// The coordinate may omit the trailing timestamp, which only closes the last
    /// interval and never has data of its own.
    pub fn is_time_equal_to(&self, coordinate: &TimeDomain) -> bool {
        self.calendar == coordinate.calendar
            && (coordinate.timestamps == self.timestamps
                || coordinate.timestamps[..] == self.timestamps[..self.len() - 1])
    }
}

impl PartialEq for TimeDomain {
    fn eq(&self, other: &Self) -> bool {
        self.calendar == other.calendar && self.timestamps == other.timestamps
    }
}

fn parse_time_units(units: &str) -> CouplingResult<(i64, CalendarDateTime)> {
    let invalid = || {
        CouplingError::InvalidDomain(format!(
            "time units '{units}' are not of the form '<unit> since <date-time>'"
        ))
    };
    let (unit, reference) = units.split_once(" since ").ok_or_else(invalid)?;
    let unit_seconds = match unit.trim().to_lowercase().as_str() {
        "seconds" | "second" | "secs" | "sec" | "s" => 1,
        "minutes" | "minute" | "mins" | "min" => 60,
        "hours" | "hour" | "hrs" | "hr" | "h" => 3600,
        "days" | "day" | "d" => 86_400,
        _ => return Err(invalid()),
    };
    Ok((unit_seconds, reference.parse()?))
}
