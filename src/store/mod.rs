//! Document storage backends.
//!
//! The default backend keeps collections in memory, which is enough for the
//! demo deployment and for tests. The `db` feature swaps in a Postgres
//! backend that stores each entity as a JSONB document keyed by its natural
//! id.

pub mod memory;
#[cfg(feature = "db")]
pub mod pg;
pub mod seed;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Battery, RouteRecord, Station, UserRecord};

pub use memory::MemoryStore;
#[cfg(feature = "db")]
pub use pg::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_batteries(&self) -> Result<Vec<Battery>>;
    async fn get_battery(&self, battery_id: &str) -> Result<Option<Battery>>;
    async fn insert_battery(&self, battery: Battery) -> Result<()>;
    /// Replace an existing battery document by id.
    async fn update_battery(&self, battery: Battery) -> Result<()>;

    async fn list_stations(&self) -> Result<Vec<Station>>;
    async fn get_station(&self, station_id: &str) -> Result<Option<Station>>;
    async fn insert_station(&self, station: Station) -> Result<()>;
    async fn update_station(&self, station: Station) -> Result<()>;

    async fn list_routes(&self) -> Result<Vec<RouteRecord>>;
    async fn insert_route(&self, route: RouteRecord) -> Result<()>;

    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
    async fn insert_user(&self, user: UserRecord) -> Result<()>;
    async fn touch_last_login(&self, username: &str, at: DateTime<Utc>) -> Result<()>;
}
