use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Known city record
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct City {
    pub name: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl City {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Copy with `name` and `country` trimmed, case preserved.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            country: self.country.trim().to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Case-insensitive (name, country) equality.
    pub fn same_place(&self, other: &City) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
            && self.country.to_lowercase() == other.country.to_lowercase()
    }

    /// `"Name, Country"`
    pub fn suggestion(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

/// City candidate as returned by the geocoding search API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct ExternalCity {
    #[serde(deserialize_with = "trimmed")]
    pub name: String,
    #[serde(deserialize_with = "trimmed")]
    pub country: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl From<ExternalCity> for City {
    fn from(city: ExternalCity) -> Self {
        City::new(city.name, city.country).with_coordinates(city.latitude, city.longitude)
    }
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// Autocomplete request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AutocompleteRequest {
    pub query: String,
}

/// Tier that produced a set of suggestions
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Cache,
    Database,
    Api,
}

/// Autocomplete response
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct AutocompleteResponse {
    pub suggestions: Vec<String>,
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SuggestionSource>,
}

impl AutocompleteResponse {
    pub fn empty() -> Self {
        Self {
            suggestions: Vec::new(),
            cached: false,
            source: None,
        }
    }

    pub fn from_source(suggestions: Vec<String>, source: SuggestionSource) -> Self {
        Self {
            suggestions,
            cached: source == SuggestionSource::Cache,
            source: Some(source),
        }
    }
}
