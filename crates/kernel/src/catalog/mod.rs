//! City and district catalog.
//!
//! Districts only make sense inside their city. The catalog is the source of
//! truth for which `(city, district)` pairs a filter may hold. It is loaded
//! from a TOML file shaped like:
//!
//! ```toml
//! [[city]]
//! name = "Lisbon"
//! districts = ["Alfama", "Baixa"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read location catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse location catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("city '{0}' is listed more than once")]
    DuplicateCity(String),
}

/// One city and its districts, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub districts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "city")]
    cities: Vec<City>,
}

/// Ordered city → districts catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationCatalog {
    cities: Vec<City>,
}

/// Catalog shipped with the binary, used when no file is configured.
const BUILTIN_CATALOG: &str = include_str!("../../locations.toml");

impl LocationCatalog {
    /// Build a catalog from a list of cities.
    ///
    /// Duplicate district names within a city are dropped.
    pub fn new(cities: Vec<City>) -> Result<Self, CatalogError> {
        let mut seen: Vec<&str> = Vec::new();
        for city in &cities {
            if seen.contains(&city.name.as_str()) {
                return Err(CatalogError::DuplicateCity(city.name.clone()));
            }
            seen.push(&city.name);
        }

        let cities = cities
            .into_iter()
            .map(|mut city| {
                let mut districts: Vec<String> = Vec::with_capacity(city.districts.len());
                for d in city.districts.drain(..) {
                    if !districts.contains(&d) {
                        districts.push(d);
                    }
                }
                City {
                    name: city.name,
                    districts,
                }
            })
            .collect();

        Ok(Self { cities })
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        Self::new(file.cities)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    /// Load from disk, falling back to the built-in catalog if the file is missing.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let catalog = Self::from_toml(&text)?;
                info!(
                    path = %path.display(),
                    cities = catalog.cities.len(),
                    "location catalog loaded"
                );
                Ok(catalog)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "location catalog not found, using built-in");
                Self::builtin()
            }
            Err(source) => Err(CatalogError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// All cities in display order.
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Whether the city is known.
    pub fn has_city(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c.name == city)
    }

    /// Districts of a city; empty for unknown cities.
    pub fn districts(&self, city: &str) -> &[String] {
        self.cities
            .iter()
            .find(|c| c.name == city)
            .map(|c| c.districts.as_slice())
            .unwrap_or_default()
    }

    /// Whether `district` belongs to `city`.
    pub fn contains(&self, city: &str, district: &str) -> bool {
        self.districts(city).iter().any(|d| d == district)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[city]]
name = "Lisbon"
districts = ["Alfama", "Baixa", "Alfama"]

[[city]]
name = "Porto"
districts = ["Ribeira"]
"#;

    #[test]
    fn parses_cities_in_order() {
        let catalog = LocationCatalog::from_toml(SAMPLE).unwrap();
        let names: Vec<&str> = catalog.cities().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Lisbon", "Porto"]);
    }

    #[test]
    fn duplicate_districts_are_dropped() {
        let catalog = LocationCatalog::from_toml(SAMPLE).unwrap();
        assert_eq!(catalog.districts("Lisbon"), ["Alfama", "Baixa"]);
    }

    #[test]
    fn district_membership() {
        let catalog = LocationCatalog::from_toml(SAMPLE).unwrap();
        assert!(catalog.contains("Lisbon", "Baixa"));
        assert!(!catalog.contains("Porto", "Baixa"));
        assert!(!catalog.contains("Madrid", "Baixa"));
        assert!(catalog.districts("Madrid").is_empty());
    }

    #[test]
    fn duplicate_city_rejected() {
        let text = "[[city]]\nname = \"A\"\n[[city]]\nname = \"A\"\n";
        let err = LocationCatalog::from_toml(text).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCity(ref c) if c == "A"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = LocationCatalog::from_toml("[[city]\nname=").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn builtin_catalog_parses() {
        let catalog = LocationCatalog::builtin().unwrap();
        assert!(!catalog.cities().is_empty());
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let catalog = LocationCatalog::load(Path::new("/nonexistent/locations.toml")).unwrap();
        assert_eq!(catalog, LocationCatalog::builtin().unwrap());
    }
}
