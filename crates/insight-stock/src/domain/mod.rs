//! Domain types shared across the crate

pub mod entity;
pub mod narrative;
pub mod series;
pub mod symbol;

pub use entity::{EntityInfo, InstrumentClass};
pub use narrative::{Narrative, NarrativeView};
pub use series::{TimeSeries, TimeSeriesRow};
pub use symbol::Symbol;
