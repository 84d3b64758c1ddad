//! Reverse geocoding
//!
//! Thin client over a Nominatim-compatible endpoint. Coordinates are rounded
//! to ~11 m before lookup, results are cached forever (street names do not
//! move), and concurrent lookups for the same cell are coalesced into a
//! single upstream request.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::utils::AppResult;

/// Resolved location labels; "-" placeholders when the lookup fails, so the
/// caller never treats geocoding as fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoArea {
    pub area: String,
    pub district: String,
    pub address: String,
}

impl GeoArea {
    fn unknown() -> Self {
        Self {
            area: "-".to_string(),
            district: "-".to_string(),
            address: String::new(),
        }
    }
}

/// Cache key: coordinates rounded to 4 decimal places
type CellKey = (i64, i64);

fn cell_key(lat: f64, lon: f64) -> CellKey {
    ((lat * 10_000.0).round() as i64, (lon * 10_000.0).round() as i64)
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    suburb: Option<String>,
    #[serde(default)]
    neighbourhood: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state_district: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Clone)]
pub struct GeocodeService {
    client: reqwest::Client,
    base_url: String,
    cells: Arc<DashMap<CellKey, Arc<OnceCell<GeoArea>>>>,
}

impl GeocodeService {
    pub fn new(base_url: String, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent("civic-server")
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url,
            cells: Arc::new(DashMap::new()),
        }
    }

    /// Resolve (area, district, address) for coordinates.
    ///
    /// Never fails: upstream errors resolve to the unknown placeholder, and
    /// the placeholder is not cached so a later lookup can retry.
    pub async fn reverse(&self, lat: f64, lon: f64) -> GeoArea {
        let key = cell_key(lat, lon);
        let cell = self
            .cells
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        // Single flight: first caller performs the lookup, the rest await it
        let result = cell
            .get_or_try_init(|| self.lookup(lat, lon))
            .await
            .cloned();

        match result {
            Ok(area) => area,
            Err(e) => {
                tracing::warn!(lat, lon, error = %e, "Reverse geocode failed");
                self.cells.remove(&key);
                GeoArea::unknown()
            }
        }
    }

    async fn lookup(&self, lat: f64, lon: f64) -> AppResult<GeoArea> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.base_url.trim_end_matches('/'),
            lat,
            lon
        );

        let response: NominatimResponse = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| crate::utils::AppError::upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| crate::utils::AppError::upstream(e.to_string()))?
            .json()
            .await
            .map_err(|e| crate::utils::AppError::upstream(e.to_string()))?;

        let addr = response.address.unwrap_or_default();
        let area = addr
            .suburb
            .or(addr.neighbourhood)
            .or(addr.village)
            .or(addr.town)
            .or(addr.city)
            .unwrap_or_else(|| "-".to_string());
        let district = addr
            .state_district
            .or(addr.county)
            .or(addr.state)
            .unwrap_or_else(|| "-".to_string());

        Ok(GeoArea {
            area,
            district,
            address: response.display_name.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_key_rounds_to_four_decimals() {
        assert_eq!(cell_key(12.34564, 77.0), cell_key(12.34561, 77.0));
        assert_ne!(cell_key(12.3456, 77.0), cell_key(12.3457, 77.0));
    }
}
