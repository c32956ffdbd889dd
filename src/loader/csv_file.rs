use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::error::{HeatmapError, Result};
use crate::fetch::read_source;
use crate::loader::types::PointRecord;

/// Column names, delimiter and filters for the file loader.
#[derive(Debug, Clone)]
pub struct CsvSettings {
    pub lat_column: String,
    pub lng_column: String,
    pub time_column: String,
    /// Read when present in the header; ignored otherwise.
    pub severity_column: Option<String>,
    pub min_severity: Option<u8>,
    pub delimiter: u8,
    /// Inclusive year range kept after parsing.
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            lat_column: "Lat".to_string(),
            lng_column: "Lng".to_string(),
            time_column: "Start_Time".to_string(),
            severity_column: Some("Severity".to_string()),
            min_severity: None,
            delimiter: b',',
            start_year: 2016,
            end_year: 2023,
        }
    }
}

/// Reads `source` (path or URL, optionally gzipped) and parses it into point records.
#[tracing::instrument(skip(settings), fields(source = %source))]
pub fn load_csv(source: &str, settings: &CsvSettings) -> Result<Vec<PointRecord>> {
    let bytes = read_source(source)?;
    let records = parse_csv(&bytes, settings)?;
    info!(rows = records.len(), "Loaded accident records");
    Ok(records)
}

struct ColumnIndex {
    lat: usize,
    lng: usize,
    time: usize,
    severity: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, settings: &CsvSettings) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| HeatmapError::MissingColumn(name.to_string()));

        Ok(Self {
            lat: require(&settings.lat_column)?,
            lng: require(&settings.lng_column)?,
            time: require(&settings.time_column)?,
            severity: settings.severity_column.as_deref().and_then(find),
        })
    }
}

/// Parses delimited text into point records, keeping rows whose timestamp
/// year falls in `settings.start_year..=settings.end_year`.
///
/// Rows with an empty timestamp or coordinate cell are skipped. Any other
/// unparsable cell aborts the load.
pub fn parse_csv(bytes: &[u8], settings: &CsvSettings) -> Result<Vec<PointRecord>> {
    if settings.start_year > settings.end_year {
        return Err(HeatmapError::Config(format!(
            "start year {} is after end year {}",
            settings.start_year, settings.end_year
        )));
    }

    let mut rdr = ReaderBuilder::new()
        .delimiter(settings.delimiter)
        .from_reader(bytes);

    let columns = ColumnIndex::resolve(rdr.headers()?, settings)?;
    if columns.severity.is_none() && settings.min_severity.is_some() {
        warn!("Minimum severity set but no severity column found; every row will be dropped");
    }

    let mut records = Vec::new();
    let mut skipped_empty = 0usize;
    let mut out_of_range = 0usize;

    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let (lat_raw, lng_raw, time_raw) = (cell(columns.lat), cell(columns.lng), cell(columns.time));
        if lat_raw.is_empty() || lng_raw.is_empty() || time_raw.is_empty() {
            skipped_empty += 1;
            continue;
        }

        let timestamp = parse_timestamp(time_raw)
            .ok_or_else(|| bad_cell(row, &settings.time_column, time_raw))?;
        let year = timestamp.year();
        if year < settings.start_year || year > settings.end_year {
            out_of_range += 1;
            continue;
        }

        let latitude: f64 = lat_raw
            .parse()
            .map_err(|_| bad_cell(row, &settings.lat_column, lat_raw))?;
        let longitude: f64 = lng_raw
            .parse()
            .map_err(|_| bad_cell(row, &settings.lng_column, lng_raw))?;

        let severity = match columns.severity.map(cell) {
            Some(raw) if !raw.is_empty() => Some(parse_severity(raw).ok_or_else(|| {
                bad_cell(row, settings.severity_column.as_deref().unwrap_or(""), raw)
            })?),
            _ => None,
        };

        if let Some(min) = settings.min_severity {
            if severity.is_none_or(|s| s < min) {
                continue;
            }
        }

        records.push(PointRecord {
            latitude,
            longitude,
            timestamp,
            severity,
        });
    }

    debug!(
        kept = records.len(),
        skipped_empty, out_of_range, "CSV rows parsed"
    );
    Ok(records)
}

fn bad_cell(row: usize, column: &str, value: &str) -> HeatmapError {
    HeatmapError::BadCell {
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}

/// Severity is stored as an integer but some exports write it as `3.0`.
fn parse_severity(raw: &str) -> Option<u8> {
    raw.parse::<u8>().ok().or_else(|| {
        let v: f64 = raw.parse().ok()?;
        (v.fract() == 0.0 && (0.0..=255.0).contains(&v)).then_some(v as u8)
    })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses the timestamp forms found in accident exports.
///
/// Offsets in RFC 3339 input are dropped in favour of the local wall-clock
/// time, which is what the month bucket should reflect.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const SAMPLE: &str = "\
ID,Severity,Start_Time,Lat,Lng
A-1,2,2016-02-08 05:46:00,39.865147,-84.058723
A-2,3,2015-12-31 23:59:00,39.928059,-82.831184
A-3,2,2017-03-14 07:15:30.000000000,39.063148,-84.032608
A-4,1,2024-01-01 00:00:00,41.0,-81.0
A-5,4,,41.0,-81.0
";

    #[test]
    fn test_parse_timestamp_forms() {
        let dt = parse_timestamp("2016-02-08 05:46:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2016, 2, 8));
        assert_eq!(dt.hour(), 5);

        assert!(parse_timestamp("2016-02-08T05:46:00").is_some());
        assert!(parse_timestamp("2016-02-08 05:46:00.123456").is_some());
        assert!(parse_timestamp("2016-02-08 05:46").is_some());

        let date_only = parse_timestamp("2017-03-14").unwrap();
        assert_eq!(date_only.time(), NaiveTime::MIN);

        let with_offset = parse_timestamp("2016-01-31T23:30:00-05:00").unwrap();
        assert_eq!(with_offset.month(), 1);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2016-13-01").is_none());
    }

    #[test]
    fn test_parse_csv_filters_year_range_and_empty_rows() {
        let records = parse_csv(SAMPLE.as_bytes(), &CsvSettings::default()).unwrap();

        // 2015 and 2024 are outside 2016..=2023; A-5 has no timestamp
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp.year(), 2016);
        assert_eq!(records[0].severity, Some(2));
        assert_eq!(records[1].latitude, 39.063148);
        assert_eq!(records[1].longitude, -84.032608);
    }

    #[test]
    fn test_parse_csv_custom_year_range() {
        let settings = CsvSettings {
            start_year: 2015,
            end_year: 2024,
            ..Default::default()
        };
        let records = parse_csv(SAMPLE.as_bytes(), &settings).unwrap();
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let settings = CsvSettings {
            lat_column: "Start_Lat".to_string(),
            ..Default::default()
        };
        let err = parse_csv(SAMPLE.as_bytes(), &settings).unwrap_err();
        assert!(matches!(err, HeatmapError::MissingColumn(ref c) if c == "Start_Lat"));
    }

    #[test]
    fn test_parse_csv_bad_timestamp() {
        let data = "Start_Time,Lat,Lng\nnot-a-date,39.0,-84.0\n";
        let err = parse_csv(data.as_bytes(), &CsvSettings::default()).unwrap_err();
        match err {
            HeatmapError::BadCell { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Start_Time");
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_csv_bad_coordinate() {
        let data = "Start_Time,Lat,Lng\n2016-01-01,north,-84.0\n";
        let err = parse_csv(data.as_bytes(), &CsvSettings::default()).unwrap_err();
        assert!(matches!(err, HeatmapError::BadCell { ref column, .. } if column == "Lat"));
    }

    #[test]
    fn test_parse_csv_without_severity_column() {
        let data = "Start_Time,Lat,Lng\n2016-01-01,39.0,-84.0\n";
        let records = parse_csv(data.as_bytes(), &CsvSettings::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, None);
    }

    #[test]
    fn test_parse_csv_min_severity() {
        let settings = CsvSettings {
            min_severity: Some(3),
            start_year: 2015,
            end_year: 2024,
            ..Default::default()
        };
        let records = parse_csv(SAMPLE.as_bytes(), &settings).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Some(3));
    }

    #[test]
    fn test_parse_csv_float_severity() {
        let data = "Start_Time,Lat,Lng,Severity\n2016-01-01,39.0,-84.0,3.0\n";
        let records = parse_csv(data.as_bytes(), &CsvSettings::default()).unwrap();
        assert_eq!(records[0].severity, Some(3));
    }

    #[test]
    fn test_parse_csv_semicolon_delimiter() {
        let data = "Start_Time;Lat;Lng\n2016-01-01;39.0;-84.0\n";
        let settings = CsvSettings {
            delimiter: b';',
            ..Default::default()
        };
        let records = parse_csv(data.as_bytes(), &settings).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_csv_inverted_year_range() {
        let settings = CsvSettings {
            start_year: 2020,
            end_year: 2016,
            ..Default::default()
        };
        let err = parse_csv(SAMPLE.as_bytes(), &settings).unwrap_err();
        assert!(matches!(err, HeatmapError::Config(_)));
    }
}
