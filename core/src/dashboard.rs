use crate::backend::KeyValueBackend;
use crate::config::DashboardConfig;
use crate::date::MonthLocale;
use crate::error::StorageError;
use crate::metrics::{FinancialSummary, LotActivity, PortfolioSummary, TraceabilitySummary};
use crate::models::{
    Actor, ActorId, Farm, Lot, LotId, Purchase, PurchaseId, RecordId, TraceabilityRecord, UserId,
};
use crate::storage::{
    CascadePolicy, CascadeReport, CollectionKind, DataIntegrityWarning, Entity, Snapshot, Store,
};

/// One producer's data, loaded once and kept in step with storage.
///
/// Mutations write through to the store first and only then replace the
/// in-memory collection, so a failed write leaves the mirror untouched.
/// Summaries are recomputed on every call.
pub struct Dashboard<B> {
    store: Store<B>,
    user_id: UserId,
    data: Snapshot,
    cascade_policy: CascadePolicy,
    month_locale: MonthLocale,
}

impl<B: KeyValueBackend> Dashboard<B> {
    pub fn open(store: Store<B>, user_id: UserId) -> Result<Self, StorageError> {
        let data = store.load(&user_id)?;
        Ok(Self {
            store,
            user_id,
            data,
            cascade_policy: CascadePolicy::default(),
            month_locale: MonthLocale::default(),
        })
    }

    pub fn with_config(mut self, config: &DashboardConfig) -> Self {
        self.cascade_policy = config.cascade.policy;
        self.month_locale = config.locale.month_labels;
        self
    }

    pub fn with_cascade_policy(mut self, policy: CascadePolicy) -> Self {
        self.cascade_policy = policy;
        self
    }

    /// Re-read everything from storage.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.data = self.store.load(&self.user_id)?;
        Ok(())
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    pub fn farm(&self) -> Option<&Farm> {
        self.data.farm.as_ref()
    }

    pub fn lots(&self) -> &[Lot] {
        &self.data.lots
    }

    pub fn traceability_records(&self) -> &[TraceabilityRecord] {
        &self.data.records
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.data.purchases
    }

    pub fn actors(&self) -> &[Actor] {
        &self.data.actors
    }

    /// Payloads that were corrupt on the last load and have not been
    /// overwritten since. Corruption first met while saving is only logged,
    /// since the save replaces it.
    pub fn warnings(&self) -> &[DataIntegrityWarning] {
        &self.data.warnings
    }

    fn replaced(&mut self, kind: CollectionKind) {
        self.data.warnings.retain(|warning| warning.kind != kind);
    }

    fn upsert<E: Entity>(&mut self, entity: E) -> Result<Vec<E>, StorageError> {
        let items = self.store.upsert(&self.user_id, entity)?;
        self.replaced(E::KIND);
        Ok(items)
    }

    pub fn lot(&self, lot_id: &LotId) -> Option<&Lot> {
        self.data.lots.iter().find(|lot| &lot.id == lot_id)
    }

    pub fn records_for_lot<'a>(
        &'a self,
        lot_id: &'a LotId,
    ) -> impl Iterator<Item = &'a TraceabilityRecord> + 'a {
        self.data.records.iter().filter(move |r| &r.lot_id == lot_id)
    }

    pub fn purchases_for_lot<'a>(
        &'a self,
        lot_id: &'a LotId,
    ) -> impl Iterator<Item = &'a Purchase> + 'a {
        self.data.purchases.iter().filter(move |p| &p.lot_id == lot_id)
    }

    pub fn actors_for_lot<'a>(
        &'a self,
        lot_id: &'a LotId,
    ) -> impl Iterator<Item = &'a Actor> + 'a {
        self.data.actors.iter().filter(move |a| &a.lot_id == lot_id)
    }

    pub fn save_farm(&mut self, farm: Farm) -> Result<(), StorageError> {
        self.store.save_farm(&self.user_id, &farm)?;
        self.replaced(CollectionKind::Farm);
        self.data.farm = Some(farm);
        Ok(())
    }

    pub fn save_lot(&mut self, lot: Lot) -> Result<(), StorageError> {
        self.data.lots = self.upsert(lot)?;
        Ok(())
    }

    /// Delete a lot and its dependents according to the cascade policy.
    ///
    /// The mirror is reloaded whether or not every write succeeded.
    pub fn delete_lot(&mut self, lot_id: &LotId) -> Result<CascadeReport, StorageError> {
        let result = self
            .store
            .remove_lot_cascade(&self.user_id, lot_id, self.cascade_policy);
        self.reload()?;
        result
    }

    pub fn save_traceability_record(
        &mut self,
        record: TraceabilityRecord,
    ) -> Result<(), StorageError> {
        self.data.records = self.upsert(record)?;
        Ok(())
    }

    pub fn delete_traceability_record(&mut self, record_id: &RecordId) -> Result<(), StorageError> {
        self.data.records = self
            .store
            .remove::<TraceabilityRecord>(&self.user_id, record_id.as_str())?;
        Ok(())
    }

    /// Store a purchase; its total is recomputed from quantity and price.
    pub fn save_purchase(&mut self, purchase: Purchase) -> Result<(), StorageError> {
        self.data.purchases = self.upsert(purchase)?;
        Ok(())
    }

    pub fn delete_purchase(&mut self, purchase_id: &PurchaseId) -> Result<(), StorageError> {
        self.data.purchases = self
            .store
            .remove::<Purchase>(&self.user_id, purchase_id.as_str())?;
        Ok(())
    }

    pub fn save_actor(&mut self, actor: Actor) -> Result<(), StorageError> {
        self.data.actors = self.upsert(actor)?;
        Ok(())
    }

    pub fn delete_actor(&mut self, actor_id: &ActorId) -> Result<(), StorageError> {
        self.data.actors = self.store.remove::<Actor>(&self.user_id, actor_id.as_str())?;
        Ok(())
    }

    pub fn financial_summary(&self, lot_id: &LotId) -> FinancialSummary {
        FinancialSummary::compute_localized(
            lot_id,
            &self.data.purchases,
            &self.data.actors,
            self.month_locale,
        )
    }

    pub fn traceability_summary(&self, lot_id: &LotId) -> TraceabilitySummary {
        TraceabilitySummary::compute(lot_id, &self.data.records)
    }

    pub fn portfolio_summary(&self) -> PortfolioSummary {
        PortfolioSummary::compute(&self.data.lots, &self.data.purchases, &self.data.actors)
    }

    pub fn lot_activity(&self, lot_id: &LotId) -> LotActivity {
        LotActivity::compute(lot_id, &self.data.purchases, &self.data.actors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FileBackend;
    use crate::memory_backend::MemoryBackend;
    use crate::models::{
        ActorType, Coordinates, GrowthMetrics, LotStatus, PaymentMethod, PurchaseStatus,
        RecordDetails, RecordStatus, SupplyDetails, Unit,
    };
    use tempfile::TempDir;

    fn open_empty() -> Dashboard<MemoryBackend> {
        Dashboard::open(Store::new(MemoryBackend::new()), UserId::from("1")).unwrap()
    }

    fn sample_farm() -> Farm {
        let mut farm = Farm::draft(
            UserId::from("1"),
            Coordinates {
                lat: 4.570868,
                lng: -74.297333,
            },
        );
        farm.name = "La Esperanza".to_string();
        farm.is_complete = true;
        farm
    }

    fn sample_lot(farm: &Farm, number: &str) -> Lot {
        Lot {
            id: LotId::generate(),
            number: number.to_string(),
            hectares: 3.5,
            estimated_production: 2000.0,
            start_date: "2024-01-01".to_string(),
            farm_id: farm.id.clone(),
            status: LotStatus::Initiated,
        }
    }

    fn sample_record(
        lot: &Lot,
        details: RecordDetails,
        date: &str,
        quantity: f64,
    ) -> TraceabilityRecord {
        TraceabilityRecord {
            id: RecordId::generate(),
            lot_id: lot.id.clone(),
            date: date.to_string(),
            name: "control".to_string(),
            quantity,
            unit: Unit::Cm,
            observations: String::new(),
            status: RecordStatus::Completed,
            details,
        }
    }

    fn growth_record(lot: &Lot, date: &str, quantity: f64) -> TraceabilityRecord {
        sample_record(lot, RecordDetails::Growth(GrowthMetrics::default()), date, quantity)
    }

    fn sample_purchase(lot: &Lot, quantity: f64, price: f64) -> Purchase {
        Purchase {
            id: PurchaseId::generate(),
            lot_id: lot.id.clone(),
            buyer_name: "Carlos".to_string(),
            buyer_company: "Mercados".to_string(),
            quantity,
            price_per_kg: price,
            total_amount: 0.0,
            purchase_date: "2024-04-02".to_string(),
            delivery_date: "2024-04-09".to_string(),
            status: PurchaseStatus::Delivered,
            payment_method: PaymentMethod::Check,
        }
    }

    fn sample_actor(lot: &Lot, cost: f64) -> Actor {
        Actor {
            id: ActorId::generate(),
            name: "Ana".to_string(),
            company: "Vet SAS".to_string(),
            actor_type: ActorType::VaccineSupplier,
            contact_info: "300 000 0000".to_string(),
            intervention_date: "2024-02-01".to_string(),
            cost,
            description: "Newcastle".to_string(),
            lot_id: lot.id.clone(),
        }
    }

    #[test]
    fn test_open_empty_user() {
        let dashboard = open_empty();
        assert!(dashboard.farm().is_none());
        assert!(dashboard.lots().is_empty());
        assert!(dashboard.traceability_records().is_empty());
        assert!(dashboard.purchases().is_empty());
        assert!(dashboard.actors().is_empty());
        assert!(dashboard.warnings().is_empty());
    }

    #[test]
    fn test_mutations_update_mirror_and_storage() {
        let mut dashboard = open_empty();
        let farm = sample_farm();
        dashboard.save_farm(farm.clone()).unwrap();
        let mut lot = sample_lot(&farm, "A-1");
        dashboard.save_lot(lot.clone()).unwrap();

        lot.status = LotStatus::Finished;
        dashboard.save_lot(lot.clone()).unwrap();
        assert_eq!(dashboard.lots().len(), 1);
        assert_eq!(dashboard.lot(&lot.id).map(|l| l.status), Some(LotStatus::Finished));

        let reopened = Dashboard::open(
            Store::new(dashboard.store().backend().clone()),
            UserId::from("1"),
        )
        .unwrap();
        assert_eq!(reopened.farm(), Some(&farm));
        assert_eq!(reopened.lots(), dashboard.lots());
    }

    #[test]
    fn test_delete_lot_cascade_through_dashboard() {
        let mut dashboard = open_empty();
        let farm = sample_farm();
        let lot = sample_lot(&farm, "A-1");
        let other = sample_lot(&farm, "A-2");
        dashboard.save_lot(lot.clone()).unwrap();
        dashboard.save_lot(other.clone()).unwrap();
        dashboard
            .save_traceability_record(growth_record(&lot, "2024-01-10", 4.0))
            .unwrap();
        dashboard
            .save_traceability_record(growth_record(&other, "2024-01-10", 4.0))
            .unwrap();
        dashboard.save_purchase(sample_purchase(&lot, 10.0, 2.0)).unwrap();
        dashboard.save_actor(sample_actor(&lot, 5.0)).unwrap();

        let report = dashboard.delete_lot(&lot.id).unwrap();
        assert_eq!(report.records_removed, 1);

        assert!(dashboard.lot(&lot.id).is_none());
        assert_eq!(dashboard.records_for_lot(&lot.id).count(), 0);
        assert_eq!(dashboard.records_for_lot(&other.id).count(), 1);
        assert_eq!(dashboard.purchases_for_lot(&lot.id).count(), 1);
        assert_eq!(dashboard.actors_for_lot(&lot.id).count(), 1);
    }

    #[test]
    fn test_delete_lot_with_all_dependents_policy() {
        let mut dashboard = open_empty().with_cascade_policy(CascadePolicy::AllDependents);
        let farm = sample_farm();
        let lot = sample_lot(&farm, "A-1");
        dashboard.save_lot(lot.clone()).unwrap();
        dashboard.save_purchase(sample_purchase(&lot, 10.0, 2.0)).unwrap();
        dashboard.save_actor(sample_actor(&lot, 5.0)).unwrap();

        dashboard.delete_lot(&lot.id).unwrap();
        assert!(dashboard.purchases().is_empty());
        assert!(dashboard.actors().is_empty());
    }

    #[test]
    fn test_delete_entities_and_missing_ids() {
        let mut dashboard = open_empty();
        let farm = sample_farm();
        let lot = sample_lot(&farm, "A-1");
        let vaccine = RecordDetails::Vaccine(SupplyDetails::default());
        let record = sample_record(&lot, vaccine, "2024-01-10", 1.0);
        let purchase = sample_purchase(&lot, 1.0, 1.0);
        let actor = sample_actor(&lot, 1.0);
        dashboard.save_traceability_record(record.clone()).unwrap();
        dashboard.save_purchase(purchase.clone()).unwrap();
        dashboard.save_actor(actor.clone()).unwrap();

        dashboard.delete_traceability_record(&record.id).unwrap();
        dashboard.delete_purchase(&purchase.id).unwrap();
        dashboard.delete_actor(&actor.id).unwrap();
        assert!(dashboard.traceability_records().is_empty());
        assert!(dashboard.purchases().is_empty());
        assert!(dashboard.actors().is_empty());

        dashboard.delete_actor(&ActorId::from("never-existed")).unwrap();
        dashboard.delete_lot(&LotId::from("never-existed")).unwrap();
    }

    #[test]
    fn test_summaries_follow_mutations() {
        let mut dashboard = open_empty();
        let farm = sample_farm();
        let lot = sample_lot(&farm, "A-1");
        dashboard.save_lot(lot.clone()).unwrap();

        let mut purchase = sample_purchase(&lot, 200.0, 5.0);
        purchase.total_amount = 1.0;
        dashboard.save_purchase(purchase).unwrap();
        dashboard.save_actor(sample_actor(&lot, 400.0)).unwrap();

        let summary = dashboard.financial_summary(&lot.id);
        assert_eq!(summary.total_revenue, 1000.0);
        assert!((summary.roi - 150.0).abs() < 1e-9);
        assert!((summary.profit_margin - 60.0).abs() < 1e-9);
        assert_eq!(summary.revenue_by_month[0].month, "abr 2024");

        let growth = [("2024-03-01", 30.0), ("2024-01-01", 10.0), ("2024-02-01", 20.0)];
        for (date, quantity) in growth {
            dashboard
                .save_traceability_record(growth_record(&lot, date, quantity))
                .unwrap();
        }
        let traceability = dashboard.traceability_summary(&lot.id);
        assert!((traceability.average_growth - 20.0).abs() < 1e-9);
        assert_eq!(traceability.growth_history[0].date, "2024-01-01");

        let portfolio = dashboard.portfolio_summary();
        assert_eq!(portfolio.total_profit, 600.0);

        let activity = dashboard.lot_activity(&lot.id);
        assert_eq!(activity.purchase_count, 1);
        assert_eq!(activity.actor_count, 1);
    }

    #[test]
    fn test_config_sets_locale_and_policy() {
        let config = DashboardConfig::from_toml_str(
            "[locale]\nmonth_labels = \"en\"\n[cascade]\npolicy = \"all_dependents\"\n",
        )
        .unwrap();
        let mut dashboard = open_empty().with_config(&config);
        let farm = sample_farm();
        let lot = sample_lot(&farm, "A-1");
        dashboard.save_purchase(sample_purchase(&lot, 1.0, 1.0)).unwrap();
        let summary = dashboard.financial_summary(&lot.id);
        assert_eq!(summary.revenue_by_month[0].month, "Apr 2024");

        dashboard.delete_lot(&lot.id).unwrap();
        assert!(dashboard.purchases().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_mirror_untouched() {
        let mut backend = MemoryBackend::new();
        backend.failing_keys.push("actors_1".to_string());
        let mut dashboard = Dashboard::open(Store::new(backend), UserId::from("1")).unwrap();
        let farm = sample_farm();
        let lot = sample_lot(&farm, "A-1");

        let err = dashboard.save_actor(sample_actor(&lot, 1.0)).unwrap_err();
        assert!(matches!(err, StorageError::Backend { .. }));
        assert!(dashboard.actors().is_empty());
    }

    #[test]
    fn test_failed_lot_delete_keeps_mirror_in_step() {
        let farm = sample_farm();
        let lot = sample_lot(&farm, "A-1");
        let mut dashboard = open_empty();
        dashboard.save_lot(lot.clone()).unwrap();
        dashboard
            .save_traceability_record(growth_record(&lot, "2024-03-01", 10.0))
            .unwrap();

        let mut backend = dashboard.store().backend().clone();
        backend.failing_keys.push("traceability_1".to_string());
        let mut dashboard = Dashboard::open(Store::new(backend), UserId::from("1")).unwrap();

        let err = dashboard.delete_lot(&lot.id).unwrap_err();
        assert!(matches!(err, StorageError::Backend { .. }));

        let stored = dashboard.store().load(&UserId::from("1")).unwrap();
        assert_eq!(stored.lots, vec![lot.clone()]);
        assert_eq!(stored.records.len(), 1);
        assert_eq!(dashboard.lots(), stored.lots.as_slice());
        assert_eq!(dashboard.traceability_records(), stored.records.as_slice());
    }

    #[test]
    fn test_save_clears_warning_for_replaced_collection() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw("farm_1", "{\"id\": 5}");
        backend.insert_raw("lots_1", "not json");
        let mut dashboard = Dashboard::open(Store::new(backend), UserId::from("1")).unwrap();
        assert_eq!(dashboard.warnings().len(), 2);

        let farm = sample_farm();
        dashboard.save_lot(sample_lot(&farm, "A-1")).unwrap();
        assert_eq!(dashboard.warnings().len(), 1);
        assert_eq!(dashboard.warnings()[0].kind, CollectionKind::Farm);

        dashboard.save_farm(farm).unwrap();
        assert!(dashboard.warnings().is_empty());
        dashboard.reload().unwrap();
        assert!(dashboard.warnings().is_empty());
    }

    #[test]
    fn test_corrupt_data_reported_as_warning() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw("farm_1", "{\"id\": 5}");
        let dashboard = Dashboard::open(Store::new(backend), UserId::from("1")).unwrap();
        assert!(dashboard.farm().is_none());
        assert_eq!(dashboard.warnings().len(), 1);
    }

    #[test]
    fn test_file_backed_dashboard_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let farm = sample_farm();
        let lot = sample_lot(&farm, "B-7");
        {
            let store = Store::new(FileBackend::new(dir.path()));
            let mut dashboard = Dashboard::open(store, UserId::from("1")).unwrap();
            dashboard.save_farm(farm.clone()).unwrap();
            dashboard.save_lot(lot.clone()).unwrap();
        }

        let dashboard =
            Dashboard::open(Store::new(FileBackend::new(dir.path())), UserId::from("1")).unwrap();
        assert_eq!(dashboard.farm().map(|f| &f.id), Some(&farm.id));
        assert_eq!(dashboard.lots(), &[lot]);
        assert!(dir.path().join("farm_1.json").exists());
        assert!(dir.path().join("lots_1.json").exists());
    }
}
