//! Station placement optimization for a region.
//!
//! Demand is scored from population density and traffic volume, then the
//! station count, coverage gain and payback period are derived with flat
//! per-station economics.

use serde::Serialize;

const INVESTMENT_PER_STATION: f64 = 250_000.0;
const REVENUE_PER_SWAP: f64 = 5.0;
const COVERAGE_PERCENT_PER_STATION: f64 = 15.0;

#[derive(Debug, Clone, Copy)]
pub struct RegionProfile {
    pub area_km2: f64,
    /// People per km2
    pub population_density: f64,
    /// Vehicles per day
    pub traffic_volume: f64,
    pub existing_stations: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementAnalysis {
    pub current_stations: u32,
    pub optimal_stations: u32,
    pub recommended_new: u32,
    pub demand_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementProjections {
    pub coverage_improvement_percent: f64,
    pub investment_required: f64,
    pub annual_revenue_projection: f64,
    pub roi_payback_years: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementPlan {
    pub analysis: PlacementAnalysis,
    pub projections: PlacementProjections,
    pub daily_swaps_per_station: f64,
    pub recommendations: Vec<String>,
}

/// Approximate area of a (lat, lon) polygon from its bounding extent.
/// Degenerate polygons fall back to a nominal 100 km2.
pub fn polygon_area_km2(bounds: &[(f64, f64)]) -> f64 {
    if bounds.len() < 3 {
        return 100.0;
    }

    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    for (lat, lon) in bounds {
        min_lat = min_lat.min(*lat);
        max_lat = max_lat.max(*lat);
        min_lon = min_lon.min(*lon);
        max_lon = max_lon.max(*lon);
    }

    // 1 degree is roughly 111 km
    (max_lat - min_lat) * (max_lon - min_lon) * 111.0 * 111.0
}

pub fn optimize_placement(region: &RegionProfile) -> PlacementPlan {
    let demand_score = region.population_density * 0.01 + region.traffic_volume * 0.0001;
    let optimal_stations = ((region.area_km2 * demand_score / 1000.0) as u32).max(1);
    let recommended_new = optimal_stations.saturating_sub(region.existing_stations);

    let coverage_improvement =
        (recommended_new as f64 * COVERAGE_PERCENT_PER_STATION).min(100.0);
    let daily_swaps_per_station = (demand_score * 10.0).min(50.0);
    let annual_revenue_per_station = daily_swaps_per_station * 365.0 * REVENUE_PER_SWAP;
    let roi_years = if annual_revenue_per_station > 0.0 {
        INVESTMENT_PER_STATION / annual_revenue_per_station
    } else {
        10.0
    };

    let recommendations = vec![
        format!("Deploy {recommended_new} new stations for optimal coverage"),
        format!(
            "Focus on areas with population density > {} per km²",
            region.population_density
        ),
        format!("Expected {daily_swaps_per_station:.0} daily swaps per station"),
        format!("Payback period: {roi_years:.1} years"),
    ];

    PlacementPlan {
        analysis: PlacementAnalysis {
            current_stations: region.existing_stations,
            optimal_stations,
            recommended_new,
            demand_score: round2(demand_score),
        },
        projections: PlacementProjections {
            coverage_improvement_percent: round1(coverage_improvement),
            investment_required: recommended_new as f64 * INVESTMENT_PER_STATION,
            annual_revenue_projection: (recommended_new as f64 * annual_revenue_per_station)
                .round(),
            roi_payback_years: round1(roi_years),
        },
        daily_swaps_per_station,
        recommendations,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_polygon_uses_default_area() {
        assert_eq!(polygon_area_km2(&[(19.0, 72.8)]), 100.0);
        assert_eq!(polygon_area_km2(&[]), 100.0);
    }

    #[test]
    fn test_polygon_area_from_extent() {
        // 0.1 x 0.1 degree box
        let bounds = [(19.0, 72.8), (19.1, 72.8), (19.1, 72.9), (19.0, 72.9)];
        let area = polygon_area_km2(&bounds);
        assert!((area - 123.21).abs() < 0.1);
    }

    #[test]
    fn test_dense_region_wants_more_stations() {
        let sparse = optimize_placement(&RegionProfile {
            area_km2: 500.0,
            population_density: 100.0,
            traffic_volume: 5000.0,
            existing_stations: 0,
        });
        let dense = optimize_placement(&RegionProfile {
            area_km2: 500.0,
            population_density: 5000.0,
            traffic_volume: 50000.0,
            existing_stations: 0,
        });
        assert!(dense.analysis.optimal_stations > sparse.analysis.optimal_stations);
    }

    #[test]
    fn test_existing_stations_reduce_recommendation() {
        let region = RegionProfile {
            area_km2: 2000.0,
            population_density: 1000.0,
            traffic_volume: 20000.0,
            existing_stations: 0,
        };
        let fresh = optimize_placement(&region);
        let built_out = optimize_placement(&RegionProfile {
            existing_stations: fresh.analysis.optimal_stations,
            ..region
        });
        assert_eq!(built_out.analysis.recommended_new, 0);
        assert_eq!(built_out.projections.investment_required, 0.0);
    }

    #[test]
    fn test_coverage_improvement_capped() {
        let plan = optimize_placement(&RegionProfile {
            area_km2: 100_000.0,
            population_density: 10_000.0,
            traffic_volume: 100_000.0,
            existing_stations: 0,
        });
        assert_eq!(plan.projections.coverage_improvement_percent, 100.0);
    }

    #[test]
    fn test_daily_swaps_capped_at_fifty() {
        let plan = optimize_placement(&RegionProfile {
            area_km2: 100.0,
            population_density: 100_000.0,
            traffic_volume: 1_000_000.0,
            existing_stations: 0,
        });
        assert_eq!(plan.daily_swaps_per_station, 50.0);
    }
}
