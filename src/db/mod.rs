//! Accident store: the `accidents`/`weather_observations` schema and the
//! bulk queries the orchestrator runs against it.

pub mod models;
pub mod queries;
