//! In-memory document store, the default backend.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::Store;
use crate::domain::{Battery, RouteRecord, Station, UserRecord};

#[derive(Default)]
pub struct MemoryStore {
    batteries: RwLock<HashMap<String, Battery>>,
    stations: RwLock<HashMap<String, Station>>,
    routes: RwLock<Vec<RouteRecord>>,
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_batteries(&self) -> Result<Vec<Battery>> {
        let mut batteries: Vec<Battery> =
            self.batteries.read().await.values().cloned().collect();
        batteries.sort_by(|a, b| a.battery_id.cmp(&b.battery_id));
        Ok(batteries)
    }

    async fn get_battery(&self, battery_id: &str) -> Result<Option<Battery>> {
        Ok(self.batteries.read().await.get(battery_id).cloned())
    }

    async fn insert_battery(&self, battery: Battery) -> Result<()> {
        self.batteries
            .write()
            .await
            .insert(battery.battery_id.clone(), battery);
        Ok(())
    }

    async fn update_battery(&self, battery: Battery) -> Result<()> {
        self.insert_battery(battery).await
    }

    async fn list_stations(&self) -> Result<Vec<Station>> {
        let mut stations: Vec<Station> = self.stations.read().await.values().cloned().collect();
        stations.sort_by(|a, b| a.station_id.cmp(&b.station_id));
        Ok(stations)
    }

    async fn get_station(&self, station_id: &str) -> Result<Option<Station>> {
        Ok(self.stations.read().await.get(station_id).cloned())
    }

    async fn insert_station(&self, station: Station) -> Result<()> {
        self.stations
            .write()
            .await
            .insert(station.station_id.clone(), station);
        Ok(())
    }

    async fn update_station(&self, station: Station) -> Result<()> {
        self.insert_station(station).await
    }

    async fn list_routes(&self) -> Result<Vec<RouteRecord>> {
        Ok(self.routes.read().await.clone())
    }

    async fn insert_route(&self, route: RouteRecord) -> Result<()> {
        self.routes.write().await.push(route);
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_user(&self, user: UserRecord) -> Result<()> {
        self.users
            .write()
            .await
            .insert(user.user.username.clone(), user);
        Ok(())
    }

    async fn touch_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<()> {
        if let Some(record) = self.users.write().await.get_mut(username) {
            record.user.last_login = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BatteryCreate, User, UserRole};

    fn sample_battery(id: &str) -> Battery {
        let now = Utc::now();
        Battery::pristine(
            BatteryCreate {
                battery_id: id.to_string(),
                station_id: "STN001".to_string(),
                manufacturer: "CATL".to_string(),
                model: "LFP-50".to_string(),
                chemistry: "LiFePO4".to_string(),
                capacity_kwh: 50.0,
                manufacturing_date: now,
            },
            now,
        )
    }

    #[tokio::test]
    async fn test_battery_roundtrip() {
        let store = MemoryStore::new();
        store.insert_battery(sample_battery("BAT001")).await.unwrap();
        store.insert_battery(sample_battery("BAT002")).await.unwrap();

        let fetched = store.get_battery("BAT001").await.unwrap();
        assert!(fetched.is_some());
        assert!(store.get_battery("BAT099").await.unwrap().is_none());

        let all = store.list_batteries().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].battery_id, "BAT001");
    }

    #[tokio::test]
    async fn test_update_replaces_document() {
        let store = MemoryStore::new();
        store.insert_battery(sample_battery("BAT001")).await.unwrap();

        let mut battery = store.get_battery("BAT001").await.unwrap().unwrap();
        battery.current_location = Some("Depot".to_string());
        store.update_battery(battery).await.unwrap();

        let fetched = store.get_battery("BAT001").await.unwrap().unwrap();
        assert_eq!(fetched.current_location.as_deref(), Some("Depot"));
        assert_eq!(store.list_batteries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_user_lookup_by_email_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .insert_user(UserRecord {
                user: User {
                    id: "user_1".to_string(),
                    username: "demo".to_string(),
                    email: "Demo@SmartSwapML.com".to_string(),
                    full_name: None,
                    role: UserRole::User,
                    is_active: true,
                    created_at: Utc::now(),
                    last_login: None,
                },
                hashed_password: "hash".to_string(),
            })
            .await
            .unwrap();

        let found = store
            .find_user_by_email("demo@smartswapml.com")
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_touch_last_login() {
        let store = MemoryStore::new();
        store
            .insert_user(UserRecord {
                user: User {
                    id: "user_1".to_string(),
                    username: "demo".to_string(),
                    email: "demo@smartswapml.com".to_string(),
                    full_name: None,
                    role: UserRole::User,
                    is_active: true,
                    created_at: Utc::now(),
                    last_login: None,
                },
                hashed_password: "hash".to_string(),
            })
            .await
            .unwrap();

        let at = Utc::now();
        store.touch_last_login("demo", at).await.unwrap();
        let record = store.find_user("demo").await.unwrap().unwrap();
        assert_eq!(record.user.last_login, Some(at));
    }
}
