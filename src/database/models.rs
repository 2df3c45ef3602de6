// Database Models
//
// The electrician record as stored and served, plus the request payload used
// to create one.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::database::store::StoreError;

/// Discriminator written on every stored location
pub const GEO_POINT_TYPE: &str = "Point";

/// Mean earth radius used for proximity search
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// GeoJSON-style point: `{"type": "Point", "coordinates": [lon, lat]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GEO_POINT_TYPE.to_string(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Great-circle distance to another coordinate pair, in meters
    pub fn distance_meters(&self, longitude: f64, latitude: f64) -> f64 {
        haversine_meters(self.longitude(), self.latitude(), longitude, latitude)
    }
}

/// Haversine distance between two `(lon, lat)` pairs given in degrees
pub fn haversine_meters(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
}

/// Electrician record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Electrician {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Create payload. Any `id` sent by the client is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewElectrician {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub location: Option<LocationInput>,
}

/// Location as sent by clients; `type` may be missing or anything.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationInput {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Error, PartialEq)]
#[error("coordinates out of range: longitude {longitude}, latitude {latitude}")]
pub struct InvalidLocation {
    pub longitude: f64,
    pub latitude: f64,
}

impl NewElectrician {
    /// Build the record to store under `id`, normalizing the location type
    pub fn into_electrician(self, id: Uuid) -> Result<Electrician, InvalidLocation> {
        let location = match self.location {
            Some(input) => {
                if let Some(kind) = input.kind.as_deref().filter(|k| *k != GEO_POINT_TYPE) {
                    tracing::debug!("Normalizing location type {:?} to {}", kind, GEO_POINT_TYPE);
                }
                let [longitude, latitude] = input.coordinates;
                if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
                    return Err(InvalidLocation { longitude, latitude });
                }
                Some(GeoPoint::new(longitude, latitude))
            }
            None => None,
        };

        Ok(Electrician {
            id,
            name: self.name,
            address: self.address,
            location,
        })
    }
}

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, StoreError>
    where
        Self: Sized;
}

impl FromRow for Electrician {
    fn from_row(row: &Row) -> Result<Self, StoreError> {
        let id: Uuid = row.try_get("id")?;
        let longitude: Option<f64> = row.try_get("longitude")?;
        let latitude: Option<f64> = row.try_get("latitude")?;

        let location = match (longitude, latitude) {
            (Some(lon), Some(lat)) => Some(GeoPoint::new(lon, lat)),
            (None, None) => None,
            _ => {
                return Err(StoreError::InvalidRecord(format!(
                    "electrician {} has a partial location",
                    id
                )))
            }
        };

        Ok(Self {
            id,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_type_is_normalized() {
        let payload: NewElectrician = serde_json::from_value(json!({
            "id": "client-chosen",
            "name": "Volt & Sons",
            "address": "Storgata 1",
            "location": { "type": "point", "coordinates": [10.75, 59.91] }
        }))
        .unwrap();

        let id = Uuid::new_v4();
        let electrician = payload.into_electrician(id).unwrap();

        assert_eq!(electrician.id, id);
        let location = electrician.location.unwrap();
        assert_eq!(location.kind, GEO_POINT_TYPE);
        assert_eq!(location.longitude(), 10.75);
        assert_eq!(location.latitude(), 59.91);
    }

    #[test]
    fn test_no_location_stays_empty() {
        let payload: NewElectrician =
            serde_json::from_value(json!({ "name": "Ohm Works" })).unwrap();
        let electrician = payload.into_electrician(Uuid::new_v4()).unwrap();

        assert_eq!(electrician.address, "");
        assert!(electrician.location.is_none());

        let body = serde_json::to_value(&electrician).unwrap();
        assert!(body.get("location").is_none());
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let payload: NewElectrician = serde_json::from_value(json!({
            "name": "Ohm Works",
            "location": { "coordinates": [200.0, 10.0] }
        }))
        .unwrap();

        assert_eq!(
            payload.into_electrician(Uuid::new_v4()),
            Err(InvalidLocation { longitude: 200.0, latitude: 10.0 })
        );
    }

    #[test]
    fn test_haversine_distance() {
        // Oslo to Bergen is roughly 305 km.
        let oslo = GeoPoint::new(10.7522, 59.9139);
        let distance = oslo.distance_meters(5.3221, 60.3913);
        assert!((300_000.0..310_000.0).contains(&distance), "{}", distance);

        assert_eq!(oslo.distance_meters(10.7522, 59.9139), 0.0);
    }
}
