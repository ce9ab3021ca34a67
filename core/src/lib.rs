pub mod backend;
pub mod config;
pub mod dashboard;
pub mod date;
pub mod error;
pub mod ffi;
pub mod memory_backend;
pub mod metrics;
pub mod models;
pub mod session;
pub mod storage;

uniffi::setup_scaffolding!();

pub use backend::{FileBackend, KeyValueBackend};
pub use config::{load_config, DashboardConfig};
pub use dashboard::Dashboard;
pub use error::{ConfigError, DateError, StorageError};
pub use ffi::FarmSession;
pub use memory_backend::MemoryBackend;
pub use metrics::{
    ApplicationEntry, CostBreakdown, FinancialSummary, GrowthPoint, LotActivity, MonthlyRevenue,
    PortfolioSummary, TraceabilitySummary,
};
pub use models::{
    Actor, ActorId, ActorType, Coordinates, Farm, FarmId, GrowthMetrics, HealthStatus, Lot, LotId,
    LotStatus, PaymentMethod, Purchase, PurchaseId, PurchaseStatus, RecordDetails, RecordId,
    RecordStatus, RecordType, SupplyDetails, TraceabilityRecord, Unit, User, UserId, UserRole,
    WaterQuality, WaterType,
};
pub use session::SessionManager;
pub use storage::{
    CascadePolicy, CascadeReport, CollectionKind, DataIntegrityWarning, Entity, Snapshot, Store,
};
