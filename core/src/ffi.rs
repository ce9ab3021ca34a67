//! Foreign-language surface for the mobile shells.
//!
//! Exported objects must be shareable across the host's threads, so the
//! dashboard sits behind a mutex. The host still drives it from one thread.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::FileBackend;
use crate::config::{load_config, DashboardConfig};
use crate::dashboard::Dashboard;
use crate::error::StorageError;
use crate::metrics::{FinancialSummary, LotActivity, PortfolioSummary, TraceabilitySummary};
use crate::models::{
    Actor, ActorId, Farm, Lot, LotId, Purchase, PurchaseId, RecordId, TraceabilityRecord, User,
    UserId,
};
use crate::session::SessionManager;
use crate::storage::{CascadeReport, DataIntegrityWarning, Store};

#[derive(uniffi::Object)]
pub struct FarmSession {
    inner: Mutex<Dashboard<FileBackend>>,
    config: DashboardConfig,
}

fn file_backend(config: &DashboardConfig) -> FileBackend {
    FileBackend::new(&config.storage.data_dir).with_quota(config.storage.quota_bytes)
}

fn resolve_config(config_path: Option<String>) -> Result<DashboardConfig, StorageError> {
    Ok(load_config(config_path.as_deref().map(Path::new))?)
}

impl FarmSession {
    fn dashboard(&self) -> MutexGuard<'_, Dashboard<FileBackend>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[uniffi::export]
impl FarmSession {
    /// Open the stored data of `user_id`, using the TOML config at
    /// `config_path` or the embedded defaults.
    #[uniffi::constructor]
    pub fn open(config_path: Option<String>, user_id: UserId) -> Result<Arc<Self>, StorageError> {
        let config = resolve_config(config_path)?;
        let dashboard =
            Dashboard::open(Store::new(file_backend(&config)), user_id)?.with_config(&config);
        Ok(Arc::new(Self {
            inner: Mutex::new(dashboard),
            config,
        }))
    }

    /// A blank farm profile at the configured default coordinates.
    pub fn new_farm_draft(&self) -> Farm {
        let user_id = self.dashboard().user_id().clone();
        Farm::draft(user_id, self.config.farm.coordinates())
    }

    pub fn farm(&self) -> Option<Farm> {
        self.dashboard().farm().cloned()
    }

    pub fn lots(&self) -> Vec<Lot> {
        self.dashboard().lots().to_vec()
    }

    pub fn traceability_records(&self) -> Vec<TraceabilityRecord> {
        self.dashboard().traceability_records().to_vec()
    }

    pub fn purchases(&self) -> Vec<Purchase> {
        self.dashboard().purchases().to_vec()
    }

    pub fn actors(&self) -> Vec<Actor> {
        self.dashboard().actors().to_vec()
    }

    pub fn warnings(&self) -> Vec<DataIntegrityWarning> {
        self.dashboard().warnings().to_vec()
    }

    pub fn save_farm(&self, farm: Farm) -> Result<(), StorageError> {
        self.dashboard().save_farm(farm)
    }

    pub fn save_lot(&self, lot: Lot) -> Result<(), StorageError> {
        self.dashboard().save_lot(lot)
    }

    pub fn delete_lot(&self, lot_id: LotId) -> Result<CascadeReport, StorageError> {
        self.dashboard().delete_lot(&lot_id)
    }

    pub fn save_traceability_record(&self, record: TraceabilityRecord) -> Result<(), StorageError> {
        self.dashboard().save_traceability_record(record)
    }

    pub fn delete_traceability_record(&self, record_id: RecordId) -> Result<(), StorageError> {
        self.dashboard().delete_traceability_record(&record_id)
    }

    pub fn save_purchase(&self, purchase: Purchase) -> Result<(), StorageError> {
        self.dashboard().save_purchase(purchase)
    }

    pub fn delete_purchase(&self, purchase_id: PurchaseId) -> Result<(), StorageError> {
        self.dashboard().delete_purchase(&purchase_id)
    }

    pub fn save_actor(&self, actor: Actor) -> Result<(), StorageError> {
        self.dashboard().save_actor(actor)
    }

    pub fn delete_actor(&self, actor_id: ActorId) -> Result<(), StorageError> {
        self.dashboard().delete_actor(&actor_id)
    }

    pub fn financial_summary(&self, lot_id: LotId) -> FinancialSummary {
        self.dashboard().financial_summary(&lot_id)
    }

    pub fn traceability_summary(&self, lot_id: LotId) -> TraceabilitySummary {
        self.dashboard().traceability_summary(&lot_id)
    }

    pub fn portfolio_summary(&self) -> PortfolioSummary {
        self.dashboard().portfolio_summary()
    }

    pub fn lot_activity(&self, lot_id: LotId) -> LotActivity {
        self.dashboard().lot_activity(&lot_id)
    }
}

fn session(config: &DashboardConfig) -> SessionManager<FileBackend> {
    SessionManager::new(file_backend(config), config.session.producer_name.clone())
}

#[uniffi::export]
pub fn login(
    config_path: Option<String>,
    email: String,
    password: String,
) -> Result<Option<User>, StorageError> {
    let config = resolve_config(config_path)?;
    session(&config).login(&email, &password)
}

#[uniffi::export]
pub fn current_user(config_path: Option<String>) -> Result<Option<User>, StorageError> {
    let config = resolve_config(config_path)?;
    session(&config).current_user()
}

#[uniffi::export]
pub fn logout(config_path: Option<String>) -> Result<(), StorageError> {
    let config = resolve_config(config_path)?;
    session(&config).logout()
}
