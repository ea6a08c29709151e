//! Weather fetcher: the external forecast/climatology provider client.

pub mod client;

pub use client::WeatherClient;
