//! Deterministic fleet and network analysis.

pub mod circular;
pub mod placement;

pub use circular::{analyze_fleet, CircularEconomyAnalysis, FleetBattery, HealthDistribution};
pub use placement::{optimize_placement, polygon_area_km2, PlacementPlan, RegionProfile};
