pub mod locks;
pub mod memory;
pub mod store;
pub mod supabase;
pub mod supabase_store;

use std::sync::Arc;

use tracing::info;

use shared_config::AppConfig;
use shared_models::scheduling::SchedulingConfig;
use shared_models::{DurationTable, SchedulingError};

pub use locks::DoctorLocks;
pub use memory::InMemoryStore;
pub use store::{SchedulingStore, StoreError};
pub use supabase_store::SupabaseStore;

/// Shared state handed to every cell router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub scheduling: Arc<SchedulingConfig>,
    pub store: Arc<dyn SchedulingStore>,
    pub booking_locks: Arc<DoctorLocks>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        scheduling: SchedulingConfig,
        store: Arc<dyn SchedulingStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            scheduling: Arc::new(scheduling),
            store,
            booking_locks: Arc::new(DoctorLocks::new()),
        }
    }

    /// Builds state from configuration, choosing Supabase when it is
    /// configured and the in-memory store otherwise.
    pub fn from_config(config: AppConfig) -> Result<Self, SchedulingError> {
        let scheduling = SchedulingConfig::new(DurationTable::default(), &config.default_timezone)?;

        let store: Arc<dyn SchedulingStore> = if config.is_supabase_configured() {
            info!("Using Supabase store at {}", config.supabase_url);
            Arc::new(SupabaseStore::new(&config))
        } else {
            info!("Using in-memory store");
            Arc::new(InMemoryStore::new())
        };

        Ok(Self::new(config, scheduling, store))
    }

    pub fn in_memory() -> Self {
        Self::new(
            AppConfig::default(),
            SchedulingConfig::default(),
            Arc::new(InMemoryStore::new()),
        )
    }
}
