//! Core data model: weather windows, accident records, the validated
//! request, and the response shapes scored by the rest of the crate.

pub mod accident;
pub mod prediction;
pub mod query;
pub mod weather;

pub use accident::{AccidentRecord, RouteType, Severity};
pub use prediction::{Influence, Prediction};
pub use query::RouteQuery;
pub use weather::{WeatherPattern, WeatherStats};
