//! Database row types — these map directly to SQLite rows. Identifiers,
//! enums and timestamps are stored as TEXT and parsed on the way out, so a
//! corrupt row surfaces as an error instead of a silent default.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use greenlands_types::models::{
    Certification, Crop, Department, Equipment, FertilizerUsage, Land, LandLocation,
    MarketplaceItem, Message, MessageParty, PesticideUsage, Policy, Subsidy, User, WaterUsage,
};

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    s.parse().with_context(|| format!("corrupt uuid '{}'", s))
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("corrupt timestamp '{}'", s))
}

pub(crate) fn parse_opt_ts(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    s.map(parse_ts).transpose()
}

pub(crate) fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339()
}

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub location: Option<String>,
    pub farm_size: Option<f64>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            name: self.name,
            email: self.email,
            role: self.role.parse().map_err(anyhow::Error::msg)?,
            location: self.location,
            farm_size: self.farm_size,
            department: self.department,
            phone: self.phone,
            active: self.active,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

pub struct LandRow {
    pub id: String,
    pub farmer_id: String,
    pub name: String,
    pub size: f64,
    pub address: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub soil_type: String,
    pub crops: String,
    pub water_usage: String,
    pub fertilizer_usage: String,
    pub pesticide_usage: String,
    pub sustainability_score: f64,
    pub certifications: String,
    pub created_at: String,
    pub updated_at: String,
}

impl LandRow {
    pub fn into_land(self) -> Result<Land> {
        let crops: Vec<Crop> = serde_json::from_str(&self.crops).context("corrupt crops json")?;
        let water_usage: Vec<WaterUsage> =
            serde_json::from_str(&self.water_usage).context("corrupt water_usage json")?;
        let fertilizer_usage: Vec<FertilizerUsage> =
            serde_json::from_str(&self.fertilizer_usage).context("corrupt fertilizer_usage json")?;
        let pesticide_usage: Vec<PesticideUsage> =
            serde_json::from_str(&self.pesticide_usage).context("corrupt pesticide_usage json")?;
        let certifications: Vec<Certification> =
            serde_json::from_str(&self.certifications).context("corrupt certifications json")?;

        Ok(Land {
            id: parse_uuid(&self.id)?,
            farmer: parse_uuid(&self.farmer_id)?,
            name: self.name,
            size: self.size,
            location: LandLocation {
                address: self.address,
                longitude: self.longitude,
                latitude: self.latitude,
            },
            soil_type: self.soil_type.parse().map_err(anyhow::Error::msg)?,
            crops,
            water_usage,
            fertilizer_usage,
            pesticide_usage,
            sustainability_score: self.sustainability_score,
            certifications,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

pub struct EquipmentRow {
    pub id: String,
    pub farmer_id: String,
    pub name: String,
    pub kind: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<String>,
    pub purchase_price: Option<f64>,
    pub status: String,
    pub maintenance_schedule: String,
    pub usage_hours: f64,
    pub last_maintenance_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl EquipmentRow {
    pub fn into_equipment(self) -> Result<Equipment> {
        Ok(Equipment {
            id: parse_uuid(&self.id)?,
            farmer: parse_uuid(&self.farmer_id)?,
            name: self.name,
            kind: self.kind,
            manufacturer: self.manufacturer,
            model: self.model,
            purchase_date: parse_opt_ts(self.purchase_date.as_deref())?,
            purchase_price: self.purchase_price,
            status: self.status.parse().map_err(anyhow::Error::msg)?,
            maintenance_schedule: serde_json::from_str(&self.maintenance_schedule)
                .context("corrupt maintenance_schedule json")?,
            usage_hours: self.usage_hours,
            last_maintenance_date: parse_opt_ts(self.last_maintenance_date.as_deref())?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

pub struct SubsidyRow {
    pub id: String,
    pub farmer_id: Option<String>,
    pub name: String,
    pub description: String,
    pub amount: f64,
    pub status: String,
    pub application_date: String,
    pub approval_date: Option<String>,
    pub government_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl SubsidyRow {
    pub fn into_subsidy(self) -> Result<Subsidy> {
        Ok(Subsidy {
            id: parse_uuid(&self.id)?,
            farmer: self.farmer_id.as_deref().map(parse_uuid).transpose()?,
            name: self.name,
            description: self.description,
            amount: self.amount,
            status: self.status.parse().map_err(anyhow::Error::msg)?,
            application_date: parse_ts(&self.application_date)?,
            approval_date: parse_opt_ts(self.approval_date.as_deref())?,
            government_notes: self.government_notes,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

pub struct PolicyRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub department: String,
    pub status: String,
    pub effective_date: String,
    pub expiry_date: Option<String>,
    pub budget: f64,
    pub beneficiaries: i64,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl PolicyRow {
    pub fn into_policy(self) -> Result<Policy> {
        Ok(Policy {
            id: parse_uuid(&self.id)?,
            title: self.title,
            description: self.description,
            department: self.department,
            status: self.status.parse().map_err(anyhow::Error::msg)?,
            effective_date: parse_ts(&self.effective_date)?,
            expiry_date: parse_opt_ts(self.expiry_date.as_deref())?,
            budget: self.budget,
            beneficiaries: self.beneficiaries,
            created_by: parse_uuid(&self.created_by)?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

pub struct DepartmentRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub head_id: Option<String>,
    pub budget: f64,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl DepartmentRow {
    pub fn into_department(self) -> Result<Department> {
        Ok(Department {
            id: parse_uuid(&self.id)?,
            name: self.name,
            description: self.description,
            head: self.head_id.as_deref().map(parse_uuid).transpose()?,
            budget: self.budget,
            active: self.active,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

pub struct ListingRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: String,
    pub price: f64,
    pub unit: Option<String>,
    pub images: String,
    pub posted_by: String,
    pub status: String,
    pub created_at: String,
}

impl ListingRow {
    pub fn into_item(self) -> Result<MarketplaceItem> {
        Ok(MarketplaceItem {
            id: parse_uuid(&self.id)?,
            title: self.title,
            description: self.description,
            kind: self.kind.parse().map_err(anyhow::Error::msg)?,
            price: self.price,
            unit: self.unit,
            images: serde_json::from_str(&self.images).context("corrupt images json")?,
            posted_by: parse_uuid(&self.posted_by)?,
            status: self.status.parse().map_err(anyhow::Error::msg)?,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

/// Message row with sender and recipient contact fields joined in
/// (eliminates N+1 lookups in inbox views).
pub struct MessageRow {
    pub id: String,
    pub subject: String,
    pub content: String,
    pub thread_id: String,
    pub channel_type: String,
    pub read: bool,
    pub created_at: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_role: String,
    pub recipient_id: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub recipient_role: String,
}

impl MessageRow {
    pub fn into_message(self) -> Result<Message> {
        Ok(Message {
            id: parse_uuid(&self.id)?,
            sender: MessageParty {
                id: parse_uuid(&self.sender_id)?,
                name: self.sender_name,
                email: self.sender_email,
                role: self.sender_role.parse().map_err(anyhow::Error::msg)?,
            },
            recipient: MessageParty {
                id: parse_uuid(&self.recipient_id)?,
                name: self.recipient_name,
                email: self.recipient_email,
                role: self.recipient_role.parse().map_err(anyhow::Error::msg)?,
            },
            subject: self.subject,
            content: self.content,
            thread_id: parse_uuid(&self.thread_id)?,
            channel_type: self.channel_type.parse().map_err(anyhow::Error::msg)?,
            read: self.read,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

/// Insert payload for a new message; everything is already stringified for
/// the storage layer.
pub struct NewMessage {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub subject: String,
    pub content: String,
    pub thread_id: String,
    pub channel_type: String,
    pub created_at: String,
}
