use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user holds exactly one role for its whole lifetime. The role decides
/// which authorization branches apply everywhere else in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Government,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Government => "government",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Role::Farmer),
            "government" => Ok(Role::Government),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel types partition conversations by the role pair of the two
/// participants. The channel type of a thread is fixed when the first
/// message is sent; every reply inherits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelType {
    #[serde(rename = "government-government")]
    GovernmentGovernment,
    #[serde(rename = "government-farmer")]
    GovernmentFarmer,
    #[serde(rename = "farmer-farmer")]
    FarmerFarmer,
    #[serde(rename = "general")]
    General,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::GovernmentGovernment => "government-government",
            ChannelType::GovernmentFarmer => "government-farmer",
            ChannelType::FarmerFarmer => "farmer-farmer",
            ChannelType::General => "general",
        }
    }

    /// Whether a sender/recipient role pair may open a thread of this type.
    /// `government-farmer` is symmetric: either side may initiate.
    pub fn permits(&self, sender: Role, recipient: Role) -> bool {
        match self {
            ChannelType::GovernmentGovernment => {
                sender == Role::Government && recipient == Role::Government
            }
            ChannelType::FarmerFarmer => sender == Role::Farmer && recipient == Role::Farmer,
            ChannelType::GovernmentFarmer => {
                (sender == Role::Government && recipient == Role::Farmer)
                    || (sender == Role::Farmer && recipient == Role::Government)
            }
            ChannelType::General => true,
        }
    }
}

impl FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "government-government" => Ok(ChannelType::GovernmentGovernment),
            "government-farmer" => Ok(ChannelType::GovernmentFarmer),
            "farmer-farmer" => Ok(ChannelType::FarmerFarmer),
            "general" => Ok(ChannelType::General),
            other => Err(format!("unknown channel type '{}'", other)),
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Clay,
    Sandy,
    Silty,
    Peaty,
    Chalky,
    Loamy,
}

impl SoilType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Clay => "clay",
            SoilType::Sandy => "sandy",
            SoilType::Silty => "silty",
            SoilType::Peaty => "peaty",
            SoilType::Chalky => "chalky",
            SoilType::Loamy => "loamy",
        }
    }
}

impl FromStr for SoilType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clay" => Ok(SoilType::Clay),
            "sandy" => Ok(SoilType::Sandy),
            "silty" => Ok(SoilType::Silty),
            "peaty" => Ok(SoilType::Peaty),
            "chalky" => Ok(SoilType::Chalky),
            "loamy" => Ok(SoilType::Loamy),
            other => Err(format!("unknown soil type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Active,
    Maintenance,
    Retired,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Active => "active",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Retired => "retired",
        }
    }
}

impl FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EquipmentStatus::Active),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            "retired" => Ok(EquipmentStatus::Retired),
            other => Err(format!("unknown equipment status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsidyStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubsidyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsidyStatus::Pending => "pending",
            SubsidyStatus::Approved => "approved",
            SubsidyStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for SubsidyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubsidyStatus::Pending),
            "approved" => Ok(SubsidyStatus::Approved),
            "rejected" => Ok(SubsidyStatus::Rejected),
            other => Err(format!("unknown subsidy status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    Draft,
    Active,
    Inactive,
    Expired,
    Planning,
}

impl PolicyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Draft => "draft",
            PolicyStatus::Active => "active",
            PolicyStatus::Inactive => "inactive",
            PolicyStatus::Expired => "expired",
            PolicyStatus::Planning => "planning",
        }
    }
}

impl FromStr for PolicyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PolicyStatus::Draft),
            "active" => Ok(PolicyStatus::Active),
            "inactive" => Ok(PolicyStatus::Inactive),
            "expired" => Ok(PolicyStatus::Expired),
            "planning" => Ok(PolicyStatus::Planning),
            other => Err(format!("unknown policy status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingType {
    #[serde(rename = "produce")]
    Produce,
    #[serde(rename = "land-sale")]
    LandSale,
    #[serde(rename = "land-lease")]
    LandLease,
    #[serde(rename = "equipment-sale")]
    EquipmentSale,
    #[serde(rename = "equipment-lease")]
    EquipmentLease,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Produce => "produce",
            ListingType::LandSale => "land-sale",
            ListingType::LandLease => "land-lease",
            ListingType::EquipmentSale => "equipment-sale",
            ListingType::EquipmentLease => "equipment-lease",
        }
    }
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "produce" => Ok(ListingType::Produce),
            "land-sale" => Ok(ListingType::LandSale),
            "land-lease" => Ok(ListingType::LandLease),
            "equipment-sale" => Ok(ListingType::EquipmentSale),
            "equipment-lease" => Ok(ListingType::EquipmentLease),
            other => Err(format!("unknown listing type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Sold,
    Leased,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Sold => "sold",
            ListingStatus::Leased => "leased",
        }
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ListingStatus::Available),
            "sold" => Ok(ListingStatus::Sold),
            "leased" => Ok(ListingStatus::Leased),
            other => Err(format!("unknown listing status '{}'", other)),
        }
    }
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub location: Option<String>,
    /// Acres; present for farmers.
    pub farm_size: Option<f64>,
    /// Present for government users.
    pub department: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Land --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub name: String,
    pub planting_date: Option<DateTime<Utc>>,
    pub harvest_date: Option<DateTime<Utc>>,
    /// Tons per hectare.
    #[serde(rename = "yield")]
    pub yield_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterUsage {
    pub date: DateTime<Utc>,
    /// Liters.
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FertilizerUsage {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    /// Kilograms.
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PesticideUsage {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    /// Liters.
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    pub issued_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandLocation {
    pub address: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Land {
    pub id: Uuid,
    pub farmer: Uuid,
    pub name: String,
    /// Acres.
    pub size: f64,
    pub location: LandLocation,
    pub soil_type: SoilType,
    pub crops: Vec<Crop>,
    pub water_usage: Vec<WaterUsage>,
    pub fertilizer_usage: Vec<FertilizerUsage>,
    pub pesticide_usage: Vec<PesticideUsage>,
    /// 0-100.
    pub sustainability_score: f64,
    pub certifications: Vec<Certification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Equipment --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub date: DateTime<Utc>,
    pub description: String,
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: Uuid,
    pub farmer: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub purchase_price: Option<f64>,
    pub status: EquipmentStatus,
    pub maintenance_schedule: Vec<MaintenanceRecord>,
    pub usage_hours: f64,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Subsidy --

/// `farmer` is optional so government users can create programme-level
/// subsidies that are not tied to a single applicant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsidy {
    pub id: Uuid,
    pub farmer: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub amount: f64,
    pub status: SubsidyStatus,
    pub application_date: DateTime<Utc>,
    pub approval_date: Option<DateTime<Utc>>,
    pub government_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Policy --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub department: String,
    pub status: PolicyStatus,
    pub effective_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub budget: f64,
    pub beneficiaries: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Department --

/// Departments are soft-deleted: `active` flips to false, the row stays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub head: Option<Uuid>,
    pub budget: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Marketplace --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ListingType,
    pub price: f64,
    /// e.g. kg, acre, per day.
    pub unit: Option<String>,
    pub images: Vec<String>,
    pub posted_by: Uuid,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

// -- Messages --

/// A stored message, with sender/recipient contact fields joined in so
/// clients never need a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: MessageParty,
    pub recipient: MessageParty,
    pub subject: String,
    pub content: String,
    pub thread_id: Uuid,
    pub channel_type: ChannelType,
    /// Meaningful only to the recipient; the sender's copy is implicitly read.
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageParty {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_type_role_pairs() {
        use ChannelType::*;
        use Role::*;

        assert!(GovernmentGovernment.permits(Government, Government));
        assert!(!GovernmentGovernment.permits(Farmer, Government));
        assert!(!GovernmentGovernment.permits(Government, Farmer));

        assert!(FarmerFarmer.permits(Farmer, Farmer));
        assert!(!FarmerFarmer.permits(Farmer, Government));

        assert!(GovernmentFarmer.permits(Government, Farmer));
        assert!(GovernmentFarmer.permits(Farmer, Government));
        assert!(!GovernmentFarmer.permits(Farmer, Farmer));
        assert!(!GovernmentFarmer.permits(Government, Government));

        // General carries no role constraint at all
        assert!(General.permits(Admin, Farmer));
        assert!(General.permits(Farmer, Admin));
    }

    #[test]
    fn enum_str_round_trips() {
        for role in [Role::Farmer, Role::Government, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        for ct in [
            ChannelType::GovernmentGovernment,
            ChannelType::GovernmentFarmer,
            ChannelType::FarmerFarmer,
            ChannelType::General,
        ] {
            assert_eq!(ct.as_str().parse::<ChannelType>().unwrap(), ct);
        }
        assert!("overlord".parse::<Role>().is_err());
        assert!("farmer-government".parse::<ChannelType>().is_err());
    }

    #[test]
    fn channel_type_serde_uses_wire_names() {
        let json = serde_json::to_string(&ChannelType::GovernmentFarmer).unwrap();
        assert_eq!(json, "\"government-farmer\"");
        let back: ChannelType = serde_json::from_str("\"farmer-farmer\"").unwrap();
        assert_eq!(back, ChannelType::FarmerFarmer);
    }
}
