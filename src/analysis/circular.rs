//! Circular-economy analysis over the battery fleet.
//!
//! Buckets packs by state of health, estimates recoverable material mass
//! from total fleet capacity, and projects carbon savings from second-life
//! use and recycling.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Minimal per-pack projection needed for the analysis.
#[derive(Debug, Clone, Copy)]
pub struct FleetBattery {
    pub soh: f64,
    pub capacity_kwh: f64,
    pub age_days: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealthDistribution {
    pub healthy: usize,
    pub degraded: usize,
    pub end_of_life: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CarbonImpact {
    pub second_life_savings_tons: f64,
    pub recycling_savings_tons: f64,
    pub total_savings_tons: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircularEconomyAnalysis {
    pub total_batteries: usize,
    pub health_distribution: HealthDistribution,
    /// Material name -> kg contained in the fleet
    pub material_inventory: BTreeMap<String, f64>,
    /// Material name -> kg recoverable at industry rates
    pub recovery_potential: BTreeMap<String, f64>,
    pub carbon_impact: CarbonImpact,
    pub recommendations: Vec<String>,
}

/// Typical Li-ion composition, kg of material per kWh of pack capacity.
static MATERIAL_COMPOSITION: Lazy<BTreeMap<&'static str, f64>> = Lazy::new(|| {
    BTreeMap::from([
        ("lithium", 0.02),
        ("cobalt", 0.15),
        ("nickel", 0.35),
        ("aluminum", 0.25),
        ("copper", 0.15),
    ])
});

/// Industry-average recovery rates per material.
static RECOVERY_RATES: Lazy<BTreeMap<&'static str, f64>> = Lazy::new(|| {
    BTreeMap::from([
        ("lithium", 0.78),
        ("cobalt", 0.85),
        ("nickel", 0.92),
        ("aluminum", 0.95),
        ("copper", 0.98),
    ])
});

/// Lifecycle CO2 tons per pack.
const CARBON_PER_BATTERY_TONS: f64 = 2.5;

/// Returns `None` for an empty fleet.
pub fn analyze_fleet(batteries: &[FleetBattery]) -> Option<CircularEconomyAnalysis> {
    if batteries.is_empty() {
        return None;
    }

    let total_batteries = batteries.len();
    let healthy = batteries.iter().filter(|b| b.soh >= 80.0).count();
    let degraded = batteries
        .iter()
        .filter(|b| b.soh >= 50.0 && b.soh < 80.0)
        .count();
    let end_of_life = batteries.iter().filter(|b| b.soh < 50.0).count();

    let avg_capacity =
        batteries.iter().map(|b| b.capacity_kwh).sum::<f64>() / total_batteries as f64;
    let total_capacity = total_batteries as f64 * avg_capacity;

    let material_inventory: BTreeMap<String, f64> = MATERIAL_COMPOSITION
        .iter()
        .map(|(name, per_kwh)| (name.to_string(), round2(total_capacity * per_kwh)))
        .collect();

    let recovery_potential: BTreeMap<String, f64> = material_inventory
        .iter()
        .map(|(name, kg)| (name.clone(), round2(kg * RECOVERY_RATES[name.as_str()])))
        .collect();

    // Second life stretches a pack ~30%, recycling recovers ~20%.
    let second_life_savings = degraded as f64 * CARBON_PER_BATTERY_TONS * 0.3;
    let recycling_savings = end_of_life as f64 * CARBON_PER_BATTERY_TONS * 0.2;

    let lithium_recoverable = recovery_potential.get("lithium").copied().unwrap_or(0.0);
    let recommendations = vec![
        format!("{degraded} batteries suitable for second-life applications"),
        format!("{end_of_life} batteries ready for material recovery"),
        format!("Potential to recover {lithium_recoverable:.1}kg lithium"),
    ];

    Some(CircularEconomyAnalysis {
        total_batteries,
        health_distribution: HealthDistribution {
            healthy,
            degraded,
            end_of_life,
        },
        material_inventory,
        recovery_potential,
        carbon_impact: CarbonImpact {
            second_life_savings_tons: round2(second_life_savings),
            recycling_savings_tons: round2(recycling_savings),
            total_savings_tons: round2(second_life_savings + recycling_savings),
        },
        recommendations,
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> Vec<FleetBattery> {
        vec![
            FleetBattery { soh: 95.0, capacity_kwh: 50.0, age_days: 200 },
            FleetBattery { soh: 87.0, capacity_kwh: 50.0, age_days: 400 },
            FleetBattery { soh: 72.0, capacity_kwh: 50.0, age_days: 600 },
            FleetBattery { soh: 45.0, capacity_kwh: 50.0, age_days: 800 },
            FleetBattery { soh: 88.0, capacity_kwh: 50.0, age_days: 350 },
        ]
    }

    #[test]
    fn test_empty_fleet_yields_nothing() {
        assert!(analyze_fleet(&[]).is_none());
    }

    #[test]
    fn test_health_bucketing() {
        let analysis = analyze_fleet(&fleet()).unwrap();
        assert_eq!(analysis.total_batteries, 5);
        assert_eq!(analysis.health_distribution.healthy, 3);
        assert_eq!(analysis.health_distribution.degraded, 1);
        assert_eq!(analysis.health_distribution.end_of_life, 1);
    }

    #[test]
    fn test_boundary_soh_values() {
        let boundary = vec![
            FleetBattery { soh: 80.0, capacity_kwh: 50.0, age_days: 100 },
            FleetBattery { soh: 50.0, capacity_kwh: 50.0, age_days: 100 },
        ];
        let analysis = analyze_fleet(&boundary).unwrap();
        assert_eq!(analysis.health_distribution.healthy, 1);
        assert_eq!(analysis.health_distribution.degraded, 1);
        assert_eq!(analysis.health_distribution.end_of_life, 0);
    }

    #[test]
    fn test_material_inventory_scales_with_capacity() {
        let analysis = analyze_fleet(&fleet()).unwrap();
        // 250 kWh total * 0.02 kg lithium per kWh
        assert_eq!(analysis.material_inventory["lithium"], 5.0);
        assert_eq!(analysis.material_inventory["nickel"], 87.5);
        // recovery applies the per-material rate
        assert_eq!(analysis.recovery_potential["lithium"], 3.9);
    }

    #[test]
    fn test_carbon_impact_totals() {
        let analysis = analyze_fleet(&fleet()).unwrap();
        // 1 degraded * 2.5 * 0.3 + 1 end-of-life * 2.5 * 0.2
        assert_eq!(analysis.carbon_impact.second_life_savings_tons, 0.75);
        assert_eq!(analysis.carbon_impact.recycling_savings_tons, 0.5);
        assert_eq!(analysis.carbon_impact.total_savings_tons, 1.25);
    }
}
