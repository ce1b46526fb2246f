//! Temporal domains and the clock synchronising components stepping at different
//! resolutions.

mod calendar;
mod clock;
mod domain;

pub use calendar::{Calendar, CalendarDateTime};
pub use clock::{Clock, Tick};
pub use domain::TimeDomain;
