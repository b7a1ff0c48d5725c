// src/geo.rs - geographic token and hospital-classification collaborator
//
// The engine only ever asks two questions about a location id: which lowercase
// geographic tokens (city, state, street) belong to it, and whether it is a
// hospital. Callers that resolve these against a live source should memoize by
// location id, since the rule layer may ask several times per comparison.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::EngineError;

/// Lookup interface for location-keyed geographic data.
pub trait GeoLookup: Send + Sync {
    /// Ordered lowercase geographic tokens for a location: city, state
    /// abbreviation, street, full state name. `None` when the id is unknown.
    fn geo_tokens(&self, location_id: i64) -> Result<Option<Vec<String>>, EngineError>;

    /// Whether the location is classified as a hospital.
    fn is_hospital_location(&self, location_id: i64) -> Result<bool, EngineError>;
}

/// One address row backing the static lookup table.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoRow {
    pub location_id: i64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
}

/// Serde-facing shape of a geographic table file.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoTableFile {
    pub locations: Vec<GeoRow>,
    #[serde(default)]
    pub hospital_ids: Vec<i64>,
}

/// In-memory implementation of `GeoLookup` built from explicit rows plus a
/// hospital id membership set.
#[derive(Debug, Clone, Default)]
pub struct StaticGeoTable {
    rows: HashMap<i64, GeoRow>,
    hospital_ids: HashSet<i64>,
}

impl StaticGeoTable {
    pub fn new(rows: Vec<GeoRow>, hospital_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            rows: rows.into_iter().map(|r| (r.location_id, r)).collect(),
            hospital_ids: hospital_ids.into_iter().collect(),
        }
    }

    pub fn from_file(file: GeoTableFile) -> Self {
        Self::new(file.locations, file.hospital_ids)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl GeoLookup for StaticGeoTable {
    fn geo_tokens(&self, location_id: i64) -> Result<Option<Vec<String>>, EngineError> {
        let Some(row) = self.rows.get(&location_id) else {
            return Ok(None);
        };

        let mut tokens = Vec::new();
        if let Some(city) = &row.city {
            tokens.push(city.to_lowercase());
        }
        if let Some(state) = &row.state {
            tokens.push(state.to_lowercase());
        }
        if let Some(street) = &row.street {
            tokens.push(street.to_lowercase());
        }
        // The full state name rides along so that "wa" and "washington"
        // spellings both cancel out of a name difference.
        if let Some(state) = &row.state {
            if let Some(full) = full_state_name(state) {
                tokens.push(full.to_string());
            }
        }

        Ok(Some(tokens))
    }

    fn is_hospital_location(&self, location_id: i64) -> Result<bool, EngineError> {
        Ok(self.hospital_ids.contains(&location_id))
    }
}

/// Full lowercase state name for a two-letter postal abbreviation.
pub fn full_state_name(abbrev: &str) -> Option<&'static str> {
    STATE_NAMES.get(abbrev.to_lowercase().as_str()).copied()
}

static STATE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("al", "alabama"),
        ("ak", "alaska"),
        ("az", "arizona"),
        ("ar", "arkansas"),
        ("ca", "california"),
        ("co", "colorado"),
        ("ct", "connecticut"),
        ("de", "delaware"),
        ("dc", "district of columbia"),
        ("fl", "florida"),
        ("ga", "georgia"),
        ("hi", "hawaii"),
        ("id", "idaho"),
        ("il", "illinois"),
        ("in", "indiana"),
        ("ia", "iowa"),
        ("ks", "kansas"),
        ("ky", "kentucky"),
        ("la", "louisiana"),
        ("me", "maine"),
        ("md", "maryland"),
        ("ma", "massachusetts"),
        ("mi", "michigan"),
        ("mn", "minnesota"),
        ("ms", "mississippi"),
        ("mo", "missouri"),
        ("mt", "montana"),
        ("ne", "nebraska"),
        ("nv", "nevada"),
        ("nh", "new hampshire"),
        ("nj", "new jersey"),
        ("nm", "new mexico"),
        ("ny", "new york"),
        ("nc", "north carolina"),
        ("nd", "north dakota"),
        ("oh", "ohio"),
        ("ok", "oklahoma"),
        ("or", "oregon"),
        ("pa", "pennsylvania"),
        ("ri", "rhode island"),
        ("sc", "south carolina"),
        ("sd", "south dakota"),
        ("tn", "tennessee"),
        ("tx", "texas"),
        ("ut", "utah"),
        ("vt", "vermont"),
        ("va", "virginia"),
        ("wa", "washington"),
        ("wv", "west virginia"),
        ("wi", "wisconsin"),
        ("wy", "wyoming"),
    ])
});
