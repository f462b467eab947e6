#![cfg(feature = "db")]
//! Postgres-backed document store.
//!
//! Each collection is a two-column table: the natural id and a JSONB
//! document holding the full entity.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use super::Store;
use crate::domain::{Battery, RouteRecord, Station, UserRecord};

pub struct PgStore {
    pub pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .context("failed to connect to Postgres")?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for table in ["batteries", "stations", "users"] {
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (id TEXT PRIMARY KEY, doc JSONB NOT NULL)"
            ))
            .execute(&self.pool)
            .await?;
        }
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS routes (id TEXT PRIMARY KEY, doc JSONB NOT NULL, created_at TIMESTAMPTZ NOT NULL DEFAULT now())",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_docs<T: serde::de::DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let rows = sqlx::query(&format!("SELECT doc FROM {table} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let doc: serde_json::Value = row.try_get("doc")?;
                Ok(serde_json::from_value(doc)?)
            })
            .collect()
    }

    async fn get_doc<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<Option<T>> {
        let row = sqlx::query(&format!("SELECT doc FROM {table} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let doc: serde_json::Value = row.try_get("doc")?;
                Ok(Some(serde_json::from_value(doc)?))
            }
            None => Ok(None),
        }
    }

    async fn upsert_doc<T: serde::Serialize>(&self, table: &str, id: &str, value: &T) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO {table} (id, doc) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc"
        ))
        .bind(id)
        .bind(serde_json::to_value(value)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_batteries(&self) -> Result<Vec<Battery>> {
        self.list_docs("batteries").await
    }

    async fn get_battery(&self, battery_id: &str) -> Result<Option<Battery>> {
        self.get_doc("batteries", battery_id).await
    }

    async fn insert_battery(&self, battery: Battery) -> Result<()> {
        self.upsert_doc("batteries", &battery.battery_id, &battery)
            .await
    }

    async fn update_battery(&self, battery: Battery) -> Result<()> {
        self.insert_battery(battery).await
    }

    async fn list_stations(&self) -> Result<Vec<Station>> {
        self.list_docs("stations").await
    }

    async fn get_station(&self, station_id: &str) -> Result<Option<Station>> {
        self.get_doc("stations", station_id).await
    }

    async fn insert_station(&self, station: Station) -> Result<()> {
        self.upsert_doc("stations", &station.station_id, &station)
            .await
    }

    async fn update_station(&self, station: Station) -> Result<()> {
        self.insert_station(station).await
    }

    async fn list_routes(&self) -> Result<Vec<RouteRecord>> {
        let rows = sqlx::query("SELECT doc FROM routes ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let doc: serde_json::Value = row.try_get("doc")?;
                Ok(serde_json::from_value(doc)?)
            })
            .collect()
    }

    async fn insert_route(&self, route: RouteRecord) -> Result<()> {
        self.upsert_doc("routes", &route.id, &route).await
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>> {
        self.get_doc("users", username).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query("SELECT doc FROM users WHERE lower(doc->>'email') = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let doc: serde_json::Value = row.try_get("doc")?;
                Ok(Some(serde_json::from_value(doc)?))
            }
            None => Ok(None),
        }
    }

    async fn insert_user(&self, user: UserRecord) -> Result<()> {
        self.upsert_doc("users", &user.user.username, &user)
            .await
    }

    async fn touch_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE users SET doc = jsonb_set(doc, '{last_login}', to_jsonb($2::timestamptz)) \
             WHERE id = $1",
        )
        .bind(username)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
