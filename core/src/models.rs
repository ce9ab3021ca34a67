use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        uniffi::custom_newtype!($name, String);
    };
}

entity_id!(UserId);
entity_id!(FarmId);
entity_id!(LotId);
entity_id!(RecordId);
entity_id!(PurchaseId);
entity_id!(ActorId);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub location: String,
    pub coordinates: Coordinates,
    /// Hectares.
    pub area: f64,
    pub producer_id: UserId,
    pub is_complete: bool,
}

impl Farm {
    /// A blank, incomplete farm profile for `producer_id`, placed at `coordinates`
    /// until the producer fills in the real location.
    pub fn draft(producer_id: UserId, coordinates: Coordinates) -> Self {
        Farm {
            id: FarmId::generate(),
            name: String::new(),
            location: String::new(),
            coordinates,
            area: 0.0,
            producer_id,
            is_complete: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Initiated,
    InProgress,
    Completed,
    Finished,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: LotId,
    /// Free-text label shown to the producer; not unique.
    pub number: String,
    pub hectares: f64,
    /// Kilograms.
    pub estimated_production: f64,
    pub start_date: String,
    pub farm_id: FarmId,
    pub status: LotStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mg,
    Kg,
    Gr,
    Ml,
    L,
    Cm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Initiated,
    Completed,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "lowercase")]
pub enum WaterType {
    Potable,
    Well,
    Treated,
    Spring,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Regular,
    Poor,
}

/// Product traceability for vaccine and feed applications.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplyDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitary_registry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_certificate: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(default, rename_all = "camelCase")]
pub struct WaterQuality {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_ph: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_type: Option<WaterType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chlorine_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_conversion: Option<f64>,
    /// Percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mortality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environmental_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
}

/// Record type together with the fields that only make sense for that type.
///
/// Stored flat: the variant name is the record's `type` field and the
/// variant's fields sit next to the common ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Enum)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordDetails {
    Growth(GrowthMetrics),
    Vaccine(SupplyDetails),
    Food(SupplyDetails),
    Water(WaterQuality),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordType {
    Growth,
    Vaccine,
    Food,
    Water,
}

impl RecordDetails {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordDetails::Growth(_) => RecordType::Growth,
            RecordDetails::Vaccine(_) => RecordType::Vaccine,
            RecordDetails::Food(_) => RecordType::Food,
            RecordDetails::Water(_) => RecordType::Water,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct TraceabilityRecord {
    pub id: RecordId,
    pub lot_id: LotId,
    pub date: String,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub observations: String,
    pub status: RecordStatus,
    #[serde(flatten)]
    pub details: RecordDetails,
}

impl TraceabilityRecord {
    pub fn record_type(&self) -> RecordType {
        self.details.record_type()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Confirmed,
    Delivered,
    Paid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Check,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub lot_id: LotId,
    pub buyer_name: String,
    pub buyer_company: String,
    /// Kilograms.
    pub quantity: f64,
    /// USD.
    pub price_per_kg: f64,
    /// USD. Always `quantity * price_per_kg` once saved.
    pub total_amount: f64,
    pub purchase_date: String,
    pub delivery_date: String,
    pub status: PurchaseStatus,
    pub payment_method: PaymentMethod,
}

impl Purchase {
    pub fn recompute_total(&mut self) {
        self.total_amount = self.quantity * self.price_per_kg;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    VaccineSupplier,
    FeedSupplier,
    Transporter,
    Veterinarian,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub company: String,
    #[serde(rename = "type")]
    pub actor_type: ActorType,
    pub contact_info: String,
    pub intervention_date: String,
    /// USD.
    pub cost: f64,
    pub description: String,
    pub lot_id: LotId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Producer,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}
