//! Roster test utilities.
//!
//! Fixture builders for provider listings and a small location catalog.
//! Kept free of kernel types so any crate can depend on it; the kernel's
//! tests convert fixtures into their own input type.

use uuid::Uuid;

/// Catalog fixture in the kernel's TOML format.
pub const LOCATIONS_TOML: &str = r#"
[[city]]
name = "Berlin"
districts = ["Mitte", "Kreuzberg", "Prenzlauer Berg"]

[[city]]
name = "Hamburg"
districts = ["Altona", "St. Pauli"]
"#;

/// Create a test provider with default values.
pub fn test_provider(display_name: &str) -> TestProvider {
    TestProvider {
        id: Uuid::now_v7(),
        display_name: display_name.to_string(),
        city: None,
        district: None,
        bio: None,
        age: None,
        hair_color: None,
        body_type: None,
        hourly_rate: None,
        services: Vec::new(),
        is_vip: false,
        is_verified: false,
        is_active: true,
        available_today: false,
        incall: false,
        outcall: false,
    }
}

/// A provider builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestProvider {
    pub id: Uuid,
    pub display_name: String,
    pub city: Option<String>,
    pub district: Option<String>,
    pub bio: Option<String>,
    pub age: Option<i32>,
    pub hair_color: Option<String>,
    pub body_type: Option<String>,
    pub hourly_rate: Option<i32>,
    pub services: Vec<String>,
    pub is_vip: bool,
    pub is_verified: bool,
    pub is_active: bool,
    pub available_today: bool,
    pub incall: bool,
    pub outcall: bool,
}

impl TestProvider {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Place the provider in a city, clearing any district.
    pub fn in_city(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self.district = None;
        self
    }

    /// Place the provider in a city and district.
    pub fn in_district(mut self, city: &str, district: &str) -> Self {
        self.city = Some(city.to_string());
        self.district = Some(district.to_string());
        self
    }

    pub fn with_bio(mut self, bio: &str) -> Self {
        self.bio = Some(bio.to_string());
        self
    }

    pub fn aged(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_hair(mut self, hair_color: &str) -> Self {
        self.hair_color = Some(hair_color.to_string());
        self
    }

    pub fn with_body_type(mut self, body_type: &str) -> Self {
        self.body_type = Some(body_type.to_string());
        self
    }

    pub fn priced(mut self, hourly_rate: i32) -> Self {
        self.hourly_rate = Some(hourly_rate);
        self
    }

    pub fn offering(mut self, services: &[&str]) -> Self {
        self.services = services.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn vip(mut self) -> Self {
        self.is_vip = true;
        self
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }

    /// Set as inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn available_today(mut self) -> Self {
        self.available_today = true;
        self
    }

    pub fn incall(mut self) -> Self {
        self.incall = true;
        self
    }

    pub fn outcall(mut self) -> Self {
        self.outcall = true;
        self
    }
}

/// Providers with ids 1..=n (ascending = older to newer) and no attributes.
pub fn numbered_providers(n: u128) -> Vec<TestProvider> {
    (1..=n)
        .map(|i| test_provider(&format!("Provider {i}")).with_id(Uuid::from_u128(i)))
        .collect()
}
