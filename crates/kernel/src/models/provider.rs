//! Provider profile model.
//!
//! A provider profile is one listing in the directory. Recency is derived
//! from the UUIDv7 identifier, so `id DESC` is newest-first.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Public display name.
    pub display_name: String,

    pub city: Option<String>,
    pub district: Option<String>,
    pub category: Option<String>,

    /// Free-form biography. Many profiles leave this empty.
    pub bio: Option<String>,

    pub age: Option<i32>,

    /// Height in centimetres.
    pub height: Option<i32>,

    /// Weight in kilograms.
    pub weight: Option<i32>,

    pub hair_color: Option<String>,
    pub eye_color: Option<String>,
    pub skin_tone: Option<String>,
    pub breast_size: Option<String>,
    pub body_type: Option<String>,
    pub ethnicity: Option<String>,
    pub nationality: Option<String>,

    /// Hourly rate in whole currency units.
    pub hourly_rate: Option<i32>,

    /// Offered service identifiers.
    pub services: Vec<String>,

    pub is_vip: bool,
    pub is_verified_by_admin: bool,
    pub is_active: bool,
    pub available_today: bool,
    pub incall: bool,
    pub outcall: bool,

    /// Unix timestamp when created.
    pub created: i64,
}

/// Input for creating a provider profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProvider {
    /// Pre-assigned identifier (imports). A fresh UUIDv7 is used when absent.
    pub id: Option<Uuid>,
    pub display_name: String,
    pub city: Option<String>,
    pub district: Option<String>,
    pub category: Option<String>,
    pub bio: Option<String>,
    pub age: Option<i32>,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub hair_color: Option<String>,
    pub eye_color: Option<String>,
    pub skin_tone: Option<String>,
    pub breast_size: Option<String>,
    pub body_type: Option<String>,
    pub ethnicity: Option<String>,
    pub nationality: Option<String>,
    pub hourly_rate: Option<i32>,
    pub services: Vec<String>,
    pub is_vip: bool,
    pub is_verified_by_admin: bool,
    pub is_active: bool,
    pub available_today: bool,
    pub incall: bool,
    pub outcall: bool,
}

impl Default for NewProvider {
    fn default() -> Self {
        Self {
            id: None,
            display_name: String::new(),
            city: None,
            district: None,
            category: None,
            bio: None,
            age: None,
            height: None,
            weight: None,
            hair_color: None,
            eye_color: None,
            skin_tone: None,
            breast_size: None,
            body_type: None,
            ethnicity: None,
            nationality: None,
            hourly_rate: None,
            services: Vec::new(),
            is_vip: false,
            is_verified_by_admin: false,
            // New listings are live unless explicitly parked.
            is_active: true,
            available_today: false,
            incall: false,
            outcall: false,
        }
    }
}

impl NewProvider {
    /// Materialise into a full profile, assigning an id and creation time.
    pub fn into_profile(self) -> ProviderProfile {
        ProviderProfile {
            id: self.id.unwrap_or_else(Uuid::now_v7),
            display_name: self.display_name,
            city: self.city,
            district: self.district,
            category: self.category,
            bio: self.bio,
            age: self.age,
            height: self.height,
            weight: self.weight,
            hair_color: self.hair_color,
            eye_color: self.eye_color,
            skin_tone: self.skin_tone,
            breast_size: self.breast_size,
            body_type: self.body_type,
            ethnicity: self.ethnicity,
            nationality: self.nationality,
            hourly_rate: self.hourly_rate,
            services: self.services,
            is_vip: self.is_vip,
            is_verified_by_admin: self.is_verified_by_admin,
            is_active: self.is_active,
            available_today: self.available_today,
            incall: self.incall,
            outcall: self.outcall,
            created: chrono::Utc::now().timestamp(),
        }
    }
}
