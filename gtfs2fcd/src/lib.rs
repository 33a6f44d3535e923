#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod gpsdat;
mod modes;
mod synthesize;
mod write;

pub use gpsdat::export_gpsdat;
pub use modes::{classify, Mode};
pub use synthesize::{build_trip, export_rows, Clock, PatternCache, Timestep, TripTrace};
pub use write::{trace_path, OutputFiles};
