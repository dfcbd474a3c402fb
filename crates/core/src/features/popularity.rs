use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ArtifactError;

/// Category to popularity mappings computed at training time.
///
/// Either table may be absent, in which case every lookup against it yields `0.0`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PopularityLookup {
    #[serde(default, rename = "route_popularity")]
    route: Option<HashMap<String, f64>>,
    #[serde(default, rename = "booking_origin_popularity")]
    booking_origin: Option<HashMap<String, f64>>,
}

impl PopularityLookup {
    pub fn new(
        route: Option<HashMap<String, f64>>,
        booking_origin: Option<HashMap<String, f64>>,
    ) -> Self {
        Self { route, booking_origin }
    }

    /// Lookup with both tables unavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the popularity artifact. A file that does not exist yields
    /// [`PopularityLookup::unavailable`]; any other read or parse failure is an error.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(Self::unavailable()),
            Err(source) => {
                return Err(ArtifactError::ReadFile { path: path.to_path_buf(), source })
            }
        };
        Self::from_json_str(&raw)
            .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })
    }

    pub fn route_popularity(&self, route: &str) -> f64 {
        lookup(self.route.as_ref(), route)
    }

    pub fn booking_origin_popularity(&self, booking_origin: &str) -> f64 {
        lookup(self.booking_origin.as_ref(), booking_origin)
    }

    pub fn has_route_table(&self) -> bool {
        self.route.is_some()
    }

    pub fn has_booking_origin_table(&self) -> bool {
        self.booking_origin.is_some()
    }

    pub fn route_count(&self) -> usize {
        self.route.as_ref().map_or(0, HashMap::len)
    }

    pub fn booking_origin_count(&self) -> usize {
        self.booking_origin.as_ref().map_or(0, HashMap::len)
    }
}

fn lookup(table: Option<&HashMap<String, f64>>, key: &str) -> f64 {
    table.and_then(|table| table.get(key)).copied().unwrap_or(0.0)
}
