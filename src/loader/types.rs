use chrono::NaiveDateTime;
use serde::Serialize;

/// A single geolocated accident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: NaiveDateTime,
    pub severity: Option<u8>,
}
