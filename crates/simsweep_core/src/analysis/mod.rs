//! Sweep aggregation and experiment driving.
//!
//! `metrics` names what is measured, `aggregate` folds replicate trials
//! into per-point summaries, and `driver` walks the sweep and talks to the
//! simulator client.

mod aggregate;
mod driver;
mod metrics;

pub use aggregate::*;
pub use driver::*;
pub use metrics::*;
