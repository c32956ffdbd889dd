use chrono::{Duration, NaiveDate, NaiveTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::error::{HeatmapError, Result};
use crate::loader::types::PointRecord;

// Roughly the geographic middle of the lower 48, with a spread wide enough
// to reach both coasts before clamping.
const LAT_CENTER: f64 = 38.0;
const LNG_CENTER: f64 = -98.0;
const LAT_SPREAD: f64 = 15.0;
const LNG_SPREAD: f64 = 30.0;

pub const LAT_BOUNDS: (f64, f64) = (25.0, 49.0);
pub const LNG_BOUNDS: (f64, f64) = (-125.0, -67.0);

/// Parameters for the mock data generator.
#[derive(Debug, Clone)]
pub struct SyntheticSettings {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: usize,
    /// Fixed seed for reproducible output; a random one is drawn otherwise.
    pub seed: Option<u64>,
}

impl Default for SyntheticSettings {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2020, 12, 31).unwrap_or_default(),
            count: 60_000,
            seed: None,
        }
    }
}

/// Generates `settings.count` accident records scattered over the continental US.
///
/// Days are drawn uniformly from `[0, end - start)`, so `end` itself is never
/// produced. Coordinates are normally distributed around the center of the US
/// and clamped to [`LAT_BOUNDS`] / [`LNG_BOUNDS`].
#[tracing::instrument(fields(start = %settings.start, end = %settings.end, count = settings.count))]
pub fn generate_synthetic(settings: &SyntheticSettings) -> Result<Vec<PointRecord>> {
    if settings.count == 0 {
        return Err(HeatmapError::Config(
            "synthetic point count must be positive".to_string(),
        ));
    }

    let span_days = (settings.end - settings.start).num_days();
    if span_days <= 0 {
        return Err(HeatmapError::Config(format!(
            "end date {} must be after start date {}",
            settings.end, settings.start
        )));
    }

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(seed, span_days, "Generating synthetic accident records");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let lat_dist = Normal::new(LAT_CENTER, LAT_SPREAD / 4.0)
        .map_err(|e| HeatmapError::Config(e.to_string()))?;
    let lng_dist = Normal::new(LNG_CENTER, LNG_SPREAD / 4.0)
        .map_err(|e| HeatmapError::Config(e.to_string()))?;

    let records = (0..settings.count)
        .map(|_| {
            let offset = rng.gen_range(0..span_days);
            let timestamp = (settings.start + Duration::days(offset)).and_time(NaiveTime::MIN);
            let latitude = lat_dist.sample(&mut rng).clamp(LAT_BOUNDS.0, LAT_BOUNDS.1);
            let longitude = lng_dist.sample(&mut rng).clamp(LNG_BOUNDS.0, LNG_BOUNDS.1);
            let severity = rng.gen_range(1..=4u8);

            PointRecord {
                latitude,
                longitude,
                timestamp,
                severity: Some(severity),
            }
        })
        .collect();

    Ok(records)
}
