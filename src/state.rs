use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::TtlCache;
use crate::clients::{ElevationClient, MapsClient, WeatherClient};
use crate::config::{Config, Environment};
use crate::domain::{Battery, Station};
use crate::ml::MlService;
use crate::store::{self, Store};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub store: Arc<dyn Store>,
    pub battery_cache: TtlCache<Vec<Battery>>,
    pub station_cache: TtlCache<Vec<Station>>,
    pub ml: Arc<MlService>,
    pub weather: Arc<WeatherClient>,
    pub maps: Arc<MapsClient>,
    pub elevation: Arc<ElevationClient>,
    pub started_at: Instant,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        #[cfg(feature = "db")]
        let store: Arc<dyn Store> = Arc::new(store::PgStore::connect(&cfg.db.url).await?);
        #[cfg(not(feature = "db"))]
        let store: Arc<dyn Store> = Arc::new(store::MemoryStore::new());

        Self::with_store(cfg, store).await
    }

    /// Wire up the state around an existing store; tests inject their own.
    pub async fn with_store(cfg: Config, store: Arc<dyn Store>) -> Result<Self> {
        if cfg.environment == Environment::Development {
            store::seed::seed_if_empty(store.as_ref()).await?;
        }

        let ml = Arc::new(MlService::train(&cfg.ml)?);

        Ok(Self {
            battery_cache: TtlCache::new(Duration::from_secs(cfg.cache.batteries_ttl_seconds)),
            station_cache: TtlCache::new(Duration::from_secs(cfg.cache.stations_ttl_seconds)),
            weather: Arc::new(WeatherClient::new(&cfg.apis)),
            maps: Arc::new(MapsClient::new(&cfg.apis)),
            elevation: Arc::new(ElevationClient::new(&cfg.apis)),
            started_at: Instant::now(),
            cfg,
            store,
            ml,
        })
    }

    /// Read-through battery list: serve the cached snapshot while it is
    /// fresh, otherwise refetch and repopulate.
    pub async fn cached_batteries(&self) -> Result<Vec<Battery>> {
        if let Some(batteries) = self.battery_cache.get().await {
            return Ok(batteries);
        }
        let batteries = self.store.list_batteries().await?;
        self.battery_cache.put(batteries.clone()).await;
        Ok(batteries)
    }

    pub async fn cached_stations(&self) -> Result<Vec<Station>> {
        if let Some(stations) = self.station_cache.get().await {
            return Ok(stations);
        }
        let stations = self.store.list_stations().await?;
        self.station_cache.put(stations.clone()).await;
        Ok(stations)
    }
}
