//! Outbound API clients (weather, maps, elevation).
//!
//! Every client degrades to a deterministic mock payload when its API key is
//! missing, the upstream call fails, or the payload cannot be parsed. Mock
//! payloads are flagged with `mock_data: true` so callers and probes can
//! tell them apart from live data.

pub mod elevation;
pub mod maps;
pub mod weather;

pub use elevation::{ElevationClient, ElevationSample};
pub use maps::{Directions, Geocoded, MapsClient};
pub use weather::{CurrentWeather, ForecastEntry, WeatherClient};
