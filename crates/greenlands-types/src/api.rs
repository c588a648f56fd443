use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Certification, ChannelType, Crop, EquipmentStatus, FertilizerUsage, ListingStatus,
    ListingType, Message, MessageParty, PesticideUsage, PolicyStatus, Role, SoilType,
    SubsidyStatus, WaterUsage,
};

// -- JWT Claims --

/// Bearer token claims shared between the auth handlers (issuing) and the
/// middleware (verifying). Canonical definition lives here in
/// greenlands-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub location: Option<String>,
    pub farm_size: Option<f64>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user. The password hash never leaves the storage layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub location: Option<String>,
    pub farm_size: Option<f64>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

impl From<&crate::models::User> for UserProfile {
    fn from(user: &crate::models::User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            location: user.location.clone(),
            farm_size: user.farm_size,
            department: user.department.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    pub subject: String,
    pub content: String,
    /// Ignored on replies; a reply inherits the thread's channel type.
    pub channel_type: Option<ChannelType>,
    /// Present when replying into an existing thread.
    pub thread_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelFilter {
    pub channel_type: Option<ChannelType>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: u64,
}

/// Read-time projection of one conversation: no thread rows are stored,
/// this is computed from the message log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    pub thread_id: Uuid,
    /// Subject of the earliest message in the thread.
    pub subject: String,
    pub channel_type: ChannelType,
    /// Sender and recipient of the earliest message.
    pub participants: Vec<MessageParty>,
    pub last_message: Message,
    /// True if any message in the thread addressed to the viewer is unread.
    pub unread: bool,
}

// -- Land --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLandRequest {
    pub name: String,
    pub size: f64,
    pub soil_type: SoilType,
    pub address: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLandRequest {
    pub name: Option<String>,
    pub size: Option<f64>,
    pub soil_type: Option<SoilType>,
    pub address: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub sustainability_score: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandReport {
    pub land: LandReportSummary,
    pub farmer: ContactInfo,
    pub crops: Vec<Crop>,
    pub water_usage: Vec<WaterUsage>,
    pub fertilizer_usage: Vec<FertilizerUsage>,
    pub pesticide_usage: Vec<PesticideUsage>,
    pub total_water_used: f64,
    pub total_fertilizer_used: f64,
    pub total_pesticide_used: f64,
    pub report_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandReportSummary {
    pub name: String,
    pub size: f64,
    pub soil_type: SoilType,
    pub sustainability_score: f64,
    pub address: Option<String>,
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
}

// -- Equipment --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipmentRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub purchase_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipmentRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub purchase_price: Option<f64>,
    pub status: Option<EquipmentStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMaintenanceRequest {
    pub date: DateTime<Utc>,
    pub description: String,
    pub cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UsageHoursRequest {
    pub hours: f64,
}

// -- Subsidies --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySubsidyRequest {
    pub name: String,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubsidyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsidyStatusRequest {
    pub status: SubsidyStatus,
    pub government_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubsidyRequest {
    pub name: String,
    pub description: String,
    pub amount: f64,
    pub status: Option<SubsidyStatus>,
    /// Government may target a specific farmer or leave the programme open.
    pub farmer: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateSubsidyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub status: Option<SubsidyStatus>,
    pub government_notes: Option<String>,
}

// -- Policies --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicyRequest {
    pub title: String,
    pub description: String,
    pub department: String,
    pub status: Option<PolicyStatus>,
    pub effective_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub budget: Option<f64>,
    pub beneficiaries: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub status: Option<PolicyStatus>,
    pub effective_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub budget: Option<f64>,
    pub beneficiaries: Option<i64>,
}

// -- Departments --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub description: String,
    pub head: Option<Uuid>,
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub head: Option<Uuid>,
    pub budget: Option<f64>,
}

// -- Marketplace --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ListingType,
    pub price: f64,
    pub unit: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListingStatusRequest {
    pub status: ListingStatus,
}

// -- Government analytics --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_farmers: u64,
    pub total_lands: u64,
    pub total_land_area: f64,
    pub soil_distribution: Vec<BucketCount>,
    /// Sustainability scores bucketed Low (< 30), Medium (< 70), High (<= 100).
    pub sustainability_scores: Vec<BucketCount>,
}

#[derive(Debug, Serialize)]
pub struct BucketCount {
    pub label: String,
    pub count: u64,
}
