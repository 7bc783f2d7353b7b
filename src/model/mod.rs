//! Domain value types.
//!
//! The request side ([`Employee`], [`Shift`], [`ScheduleRequest`]) is the
//! immutable input to a run; the result side ([`ScheduleResult`] and its
//! parts) is what every strategy returns. No type here performs I/O or
//! holds engine state.

mod request;
mod result;

pub use request::{AvailabilityWindow, Employee, ScheduleRequest, Shift};
pub use result::{
    Assignment, QualityMetrics, RunStats, ScheduleResult, Termination, UnmetSlot,
};
