//! Development seed data.
//!
//! Populates empty collections with the demo fleet so the API serves
//! something useful on first boot. Runs only when the environment is
//! `development`.

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

use super::Store;
use crate::auth::hash_password;
use crate::domain::{
    Battery, BatteryHealth, BatteryMetrics, BatteryStatus, Location, OperationalMetrics, Station,
    StationCapacity, StationStatus, StationType, SwapRecommendation, User, UserRecord, UserRole,
};

pub async fn seed_if_empty(store: &dyn Store) -> Result<()> {
    if store.list_batteries().await?.is_empty() {
        for battery in sample_batteries() {
            store.insert_battery(battery).await?;
        }
        info!("seeded sample batteries");
    }

    if store.list_stations().await?.is_empty() {
        for station in sample_stations() {
            store.insert_station(station).await?;
        }
        info!("seeded sample stations");
    }

    ensure_demo_users(store).await?;
    Ok(())
}

/// The five-pack demo fleet spread over the three seed stations.
pub fn sample_batteries() -> Vec<Battery> {
    let now = Utc::now();

    (0..5)
        .map(|i| {
            let idx = i as f64;
            let soh = 90.0 - idx * 3.0;
            let healthy = soh > 80.0;

            Battery {
                battery_id: format!("BAT{:03}", i + 1),
                station_id: format!("STN{:03}", (i % 3) + 1),
                manufacturer: "CATL".to_string(),
                model: format!("LFP-50-{i}"),
                chemistry: "LiFePO4".to_string(),
                capacity_kwh: 50.0,
                manufacturing_date: now - Duration::days(365 + i * 30),
                first_use_date: Some(now - Duration::days(300 + i * 20)),
                current_location: Some(format!("Station {}", (i % 3) + 1)),
                metrics: BatteryMetrics {
                    health: BatteryHealth {
                        soc: 85.0 + idx * 2.0,
                        soh,
                        voltage: 3.7 + idx * 0.1,
                        current: 2.5,
                        temperature: 25.0 + idx * 2.0,
                        cycle_count: 500 + (i as u32) * 100,
                        capacity_remaining: 48.0 - idx * 2.0,
                        internal_resistance: 0.1 + idx * 0.01,
                    },
                    status: if healthy {
                        BatteryStatus::Healthy
                    } else {
                        BatteryStatus::Degraded
                    },
                    swap_recommendation: if healthy {
                        SwapRecommendation::Recommended
                    } else {
                        SwapRecommendation::Caution
                    },
                    confidence_score: 95.0 - idx * 5.0,
                    predicted_range_km: 200.0 - idx * 10.0,
                    estimated_life_remaining_days: 2000 - i * 200,
                },
                maintenance_history: Vec::new(),
                created_at: now - Duration::days(300),
                updated_at: now,
            }
        })
        .collect()
}

/// Three seed stations: an urban hub, a commercial tech-park site and a
/// highway stop.
pub fn sample_stations() -> Vec<Station> {
    let now = Utc::now();

    let specs = [
        (
            "STN001",
            "Mumbai Central Swap Hub",
            Location {
                lat: 19.0760,
                lon: 72.8777,
                address: "Mumbai Central Railway Station, Mumbai".to_string(),
                city: "Mumbai".to_string(),
                state: "Maharashtra".to_string(),
                country: "India".to_string(),
                postal_code: None,
            },
            StationType::Urban,
            (20u32, 12u32, 18u32),
        ),
        (
            "STN002",
            "Pune Tech Park Station",
            Location {
                lat: 18.5204,
                lon: 73.8567,
                address: "Hinjewadi IT Park, Pune".to_string(),
                city: "Pune".to_string(),
                state: "Maharashtra".to_string(),
                country: "India".to_string(),
                postal_code: None,
            },
            StationType::Commercial,
            (15, 8, 13),
        ),
        (
            "STN003",
            "Highway Express Charging",
            Location {
                lat: 18.8000,
                lon: 73.2000,
                address: "Mumbai-Pune Expressway, Lonavala".to_string(),
                city: "Lonavala".to_string(),
                state: "Maharashtra".to_string(),
                country: "India".to_string(),
                postal_code: None,
            },
            StationType::Highway,
            (12, 9, 11),
        ),
    ];

    specs
        .into_iter()
        .enumerate()
        .map(|(i, (id, name, location, station_type, (total, available, healthy)))| {
            let idx = i as f64;
            let mut amenities = vec!["WiFi".to_string()];
            if i == 0 {
                amenities.extend(["Restroom".to_string(), "Cafe".to_string()]);
            }

            Station {
                station_id: id.to_string(),
                name: name.to_string(),
                location,
                station_type,
                status: StationStatus::Active,
                capacity: StationCapacity {
                    total_slots: total,
                    available_slots: available,
                    charging_slots: (total as f64 * 0.3) as u32,
                    maintenance_slots: 2,
                    battery_inventory: total,
                    healthy_batteries: healthy,
                    degraded_batteries: total - healthy,
                },
                metrics: OperationalMetrics {
                    daily_swaps: 150 + (i as u32) * 30,
                    monthly_swaps: 4500 + (i as u32) * 900,
                    average_swap_time_seconds: 90.0 + idx * 15.0,
                    utilization_rate: 0.75 - idx * 0.1,
                    customer_satisfaction: 4.5 + idx * 0.1,
                    uptime_percentage: 98.5 - idx * 0.5,
                    energy_consumption_kwh: 1200.0 + idx * 200.0,
                    carbon_footprint_kg: 540.0 + idx * 90.0,
                },
                amenities,
                operating_hours: [("monday", "24/7"), ("tuesday", "24/7")]
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                contact_info: [
                    ("phone".to_string(), format!("+91-9876543{i}0")),
                    ("email".to_string(), format!("station{}@smartswapml.com", i + 1)),
                ]
                .into_iter()
                .collect(),
                created_at: now - Duration::days(365 - (i as i64) * 30),
                updated_at: now,
            }
        })
        .collect()
}

pub async fn ensure_demo_users(store: &dyn Store) -> Result<()> {
    let demo_users = [
        ("demo", "demo123", "demo@smartswapml.com", "Demo User", UserRole::User),
        ("admin", "admin123", "admin@smartswapml.com", "Admin User", UserRole::Admin),
        (
            "operator",
            "operator123",
            "operator@smartswapml.com",
            "Operator User",
            UserRole::Operator,
        ),
    ];

    for (username, password, email, full_name, role) in demo_users {
        if store.find_user(username).await?.is_some() {
            continue;
        }
        store
            .insert_user(UserRecord {
                user: User {
                    id: format!("user_{username}"),
                    username: username.to_string(),
                    email: email.to_string(),
                    full_name: Some(full_name.to_string()),
                    role,
                    is_active: true,
                    created_at: Utc::now(),
                    last_login: None,
                },
                hashed_password: hash_password(password)?,
            })
            .await?;
        info!(username, "demo user created");
    }

    Ok(())
}
