use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::KeyValueBackend;
use crate::error::StorageError;
use crate::models::{Actor, Farm, Lot, LotId, Purchase, TraceabilityRecord, UserId};

/// The five per-user collections and their storage key prefixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum CollectionKind {
    Farm,
    Lots,
    Traceability,
    Purchases,
    Actors,
}

impl CollectionKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            CollectionKind::Farm => "farm",
            CollectionKind::Lots => "lots",
            CollectionKind::Traceability => "traceability",
            CollectionKind::Purchases => "purchases",
            CollectionKind::Actors => "actors",
        }
    }

    pub fn key(&self, user: &UserId) -> String {
        format!("{}_{}", self.prefix(), user)
    }
}

/// What happens to a lot's dependents when the lot is deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum CascadePolicy {
    /// Remove the lot's traceability records; keep its purchases and actors.
    #[default]
    TraceabilityOnly,
    /// Remove records, purchases and actors of the lot.
    AllDependents,
}

/// A stored payload that could not be decoded and was replaced by an empty
/// default.
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct DataIntegrityWarning {
    pub kind: CollectionKind,
    pub key: String,
    pub message: String,
}

/// Entities stored as a list under one key per user.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    const KIND: CollectionKind;

    fn entity_id(&self) -> &str;

    /// Owning lot, for entities that hang off a lot.
    fn owner_lot(&self) -> Option<&LotId> {
        None
    }

    /// Fix up derived fields before the entity is written.
    fn normalize(&mut self) {}
}

impl Entity for Lot {
    const KIND: CollectionKind = CollectionKind::Lots;

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Entity for TraceabilityRecord {
    const KIND: CollectionKind = CollectionKind::Traceability;

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }

    fn owner_lot(&self) -> Option<&LotId> {
        Some(&self.lot_id)
    }
}

impl Entity for Purchase {
    const KIND: CollectionKind = CollectionKind::Purchases;

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }

    fn owner_lot(&self) -> Option<&LotId> {
        Some(&self.lot_id)
    }

    fn normalize(&mut self) {
        self.recompute_total();
    }
}

impl Entity for Actor {
    const KIND: CollectionKind = CollectionKind::Actors;

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }

    fn owner_lot(&self) -> Option<&LotId> {
        Some(&self.lot_id)
    }
}

/// Everything stored for one user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub farm: Option<Farm>,
    pub lots: Vec<Lot>,
    pub records: Vec<TraceabilityRecord>,
    pub purchases: Vec<Purchase>,
    pub actors: Vec<Actor>,
    pub warnings: Vec<DataIntegrityWarning>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.farm.is_none()
            && self.lots.is_empty()
            && self.records.is_empty()
            && self.purchases.is_empty()
            && self.actors.is_empty()
    }
}

/// How many entities a lot deletion removed, per collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, uniffi::Record)]
pub struct CascadeReport {
    pub lots_removed: u32,
    pub records_removed: u32,
    pub purchases_removed: u32,
    pub actors_removed: u32,
}

/// Replace the entity with the same id in place, or append it.
pub fn upsert_into<E: Entity>(items: &mut Vec<E>, entity: E) {
    match items
        .iter_mut()
        .find(|item| item.entity_id() == entity.entity_id())
    {
        Some(slot) => *slot = entity,
        None => items.push(entity),
    }
}

/// Per-user collections over a [`KeyValueBackend`].
///
/// Every mutation reads the current collection, applies the change and
/// writes the whole collection back under its single key.
#[derive(Clone, Debug)]
pub struct Store<B> {
    backend: B,
}

impl<B: KeyValueBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn load(&self, user: &UserId) -> Result<Snapshot, StorageError> {
        let mut warnings = Vec::new();
        let farm = self.read_farm(user, &mut warnings)?;
        let lots = self.read_collection(user, &mut warnings)?;
        let records = self.read_collection(user, &mut warnings)?;
        let purchases = self.read_collection(user, &mut warnings)?;
        let actors = self.read_collection(user, &mut warnings)?;
        tracing::debug!(user = %user, warnings = warnings.len(), "loaded user data");
        Ok(Snapshot {
            farm,
            lots,
            records,
            purchases,
            actors,
            warnings,
        })
    }

    pub fn save_farm(&mut self, user: &UserId, farm: &Farm) -> Result<(), StorageError> {
        self.write(&CollectionKind::Farm.key(user), farm)
    }

    /// Insert or replace `entity` and return the updated collection.
    ///
    /// A corrupt stored collection is logged and replaced by one holding
    /// only `entity`.
    pub fn upsert<E: Entity>(
        &mut self,
        user: &UserId,
        mut entity: E,
    ) -> Result<Vec<E>, StorageError> {
        entity.normalize();
        let mut items: Vec<E> = self.read_collection(user, &mut Vec::new())?;
        upsert_into(&mut items, entity);
        self.write(&E::KIND.key(user), &items)?;
        Ok(items)
    }

    /// Remove the entity with `id`, if present, and return the updated
    /// collection. Nothing is written when the id is unknown.
    pub fn remove<E: Entity>(&mut self, user: &UserId, id: &str) -> Result<Vec<E>, StorageError> {
        let mut items: Vec<E> = self.read_collection(user, &mut Vec::new())?;
        let before = items.len();
        items.retain(|item| item.entity_id() != id);
        if items.len() != before {
            self.write(&E::KIND.key(user), &items)?;
        }
        Ok(items)
    }

    /// Delete a lot and, depending on `policy`, the entities that reference it.
    ///
    /// Dependents go first and the lot last, so a failed write never leaves
    /// records pointing at a lot that no longer exists.
    pub fn remove_lot_cascade(
        &mut self,
        user: &UserId,
        lot_id: &LotId,
        policy: CascadePolicy,
    ) -> Result<CascadeReport, StorageError> {
        let mut report = CascadeReport::default();
        if policy == CascadePolicy::AllDependents {
            report.actors_removed = self.remove_owned_by::<Actor>(user, lot_id)?;
            report.purchases_removed = self.remove_owned_by::<Purchase>(user, lot_id)?;
        }
        report.records_removed = self.remove_owned_by::<TraceabilityRecord>(user, lot_id)?;
        report.lots_removed = self.remove_where::<Lot>(user, |lot| &lot.id == lot_id)?;
        tracing::info!(user = %user, lot = %lot_id, ?policy, ?report, "deleted lot");
        Ok(report)
    }

    fn remove_owned_by<E: Entity>(
        &mut self,
        user: &UserId,
        lot_id: &LotId,
    ) -> Result<u32, StorageError> {
        self.remove_where::<E>(user, |item| item.owner_lot() == Some(lot_id))
    }

    fn remove_where<E: Entity>(
        &mut self,
        user: &UserId,
        predicate: impl Fn(&E) -> bool,
    ) -> Result<u32, StorageError> {
        let mut items: Vec<E> = self.read_collection(user, &mut Vec::new())?;
        let before = items.len();
        items.retain(|item| !predicate(item));
        let removed = before - items.len();
        if removed > 0 {
            self.write(&E::KIND.key(user), &items)?;
        }
        Ok(removed as u32)
    }

    fn read_farm(
        &self,
        user: &UserId,
        warnings: &mut Vec<DataIntegrityWarning>,
    ) -> Result<Option<Farm>, StorageError> {
        self.read_value(CollectionKind::Farm, user, warnings)
    }

    fn read_collection<E: Entity>(
        &self,
        user: &UserId,
        warnings: &mut Vec<DataIntegrityWarning>,
    ) -> Result<Vec<E>, StorageError> {
        Ok(self.read_value(E::KIND, user, warnings)?.unwrap_or_default())
    }

    /// `None` when the key is missing or its payload is corrupt; the latter
    /// also records a warning.
    fn read_value<T: DeserializeOwned>(
        &self,
        kind: CollectionKind,
        user: &UserId,
        warnings: &mut Vec<DataIntegrityWarning>,
    ) -> Result<Option<T>, StorageError> {
        let key = kind.key(user);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding corrupt stored data");
                warnings.push(DataIntegrityWarning {
                    kind,
                    key,
                    message: e.to_string(),
                });
                Ok(None)
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.backend.set(key, &json)?;
        tracing::debug!(key, bytes = json.len(), "stored collection");
        Ok(())
    }
}
