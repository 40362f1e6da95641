use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    config::DEFAULT_GEONAMES_BASE_URL,
    error::GeocodeError,
    model::{CityRef, Coordinates},
    provider::truncate_body,
};

use super::GeocodeGateway;

const DECODE_FAILURE: &str = "decode failure";

/// GeoNames web services: `findNearbyPlaceNameJSON` for reverse lookups,
/// `searchJSON` for prefix search.
#[derive(Debug, Clone)]
pub struct GeonamesGateway {
    base_url: String,
    username: String,
    http: Client,
}

impl GeonamesGateway {
    pub fn new(username: String) -> Self {
        Self::with_base_url(DEFAULT_GEONAMES_BASE_URL.to_string(), username)
    }

    pub fn with_base_url(base_url: String, username: String) -> Self {
        Self { base_url, username, http: Client::new() }
    }

    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Result<Url, GeocodeError> {
        let endpoint = format!("{}/{}", self.base_url.trim_end_matches('/'), name);
        let mut url = Url::parse(&endpoint)
            .map_err(|e| GeocodeError::Provider(format!("invalid endpoint {endpoint}: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("username", &self.username);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<GnResponse, GeocodeError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError::Provider(e.to_string()))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| GeocodeError::Provider(e.to_string()))?;

        if !status.is_success() {
            return Err(GeocodeError::Provider(format!(
                "status {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(error = %e, body = %truncate_body(&body), "GeoNames body did not decode");
            GeocodeError::Provider(DECODE_FAILURE.to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
struct GnPlace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "countryName")]
    country_name: Option<String>,
}

/// GeoNames answers errors with HTTP 200 and a `status` object, so the
/// `geonames` array is optional at the serde level.
#[derive(Debug, Deserialize)]
struct GnResponse {
    #[serde(default)]
    geonames: Option<Vec<GnPlace>>,
}

#[async_trait]
impl GeocodeGateway for GeonamesGateway {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<CityRef, GeocodeError> {
        let lat = coordinates.latitude.to_string();
        let lng = coordinates.longitude.to_string();
        let url = self.endpoint(
            "findNearbyPlaceNameJSON",
            &[("lat", lat.as_str()), ("lng", lng.as_str())],
        )?;

        let places = self
            .get(url)
            .await?
            .geonames
            .ok_or_else(|| GeocodeError::Provider(DECODE_FAILURE.to_string()))?;

        let name = places
            .into_iter()
            .next()
            .and_then(|place| place.name)
            .filter(|name| !name.trim().is_empty())
            .ok_or(GeocodeError::NotFound)?;

        tracing::info!(city = %name, "Reverse geocoded position");
        Ok(CityRef::new(name))
    }

    async fn search_cities(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<CityRef>, GeocodeError> {
        let max_rows = max_results.to_string();
        let url = self.endpoint(
            "searchJSON",
            &[("name_startsWith", query), ("maxRows", max_rows.as_str())],
        )?;

        let places = self
            .get(url)
            .await?
            .geonames
            .ok_or_else(|| GeocodeError::Provider(DECODE_FAILURE.to_string()))?;

        let cities = places
            .into_iter()
            .filter_map(|place| {
                let name = place.name.filter(|n| !n.is_empty())?;
                Some(CityRef { name, country: place.country_name })
            })
            .collect();

        Ok(cities)
    }
}
