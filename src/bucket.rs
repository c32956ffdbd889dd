//! Month bucketing of point records into animation frames.

use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};

use crate::loader::PointRecord;

/// Calendar month a record belongs to; displays as `YYYY-MM`.
///
/// Field order makes the derived `Ord` chronological, which matches the
/// lexicographic order of the formatted labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameLabel {
    pub year: i32,
    pub month: u32,
}

impl FrameLabel {
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Short human form used in titles, e.g. `Jan 2016`.
    pub fn month_year(&self) -> String {
        const MONTHS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let name = MONTHS
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("???");
        format!("{} {}", name, self.year)
    }
}

impl fmt::Display for FrameLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for FrameLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A record tagged with its month bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedPoint {
    #[serde(flatten)]
    pub record: PointRecord,
    pub frame: FrameLabel,
}

/// Rows sorted by frame plus the distinct frame sequence.
#[derive(Debug, Clone, Default)]
pub struct BucketedTable {
    pub rows: Vec<BucketedPoint>,
    pub frames: Vec<FrameLabel>,
}

/// Row count for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameCount {
    pub frame: FrameLabel,
    pub rows: usize,
}

/// Tags every record with its month, sorts by month and collects the frame sequence.
///
/// The sort is stable: rows within a month keep their input order.
pub fn bucket_by_month(records: Vec<PointRecord>) -> BucketedTable {
    let mut rows: Vec<BucketedPoint> = records
        .into_iter()
        .map(|record| BucketedPoint {
            frame: FrameLabel::from_timestamp(&record.timestamp),
            record,
        })
        .collect();
    rows.sort_by_key(|r| r.frame);

    let mut frames: Vec<FrameLabel> = rows.iter().map(|r| r.frame).collect();
    frames.dedup();

    BucketedTable { rows, frames }
}

impl BucketedTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to `frame`. Relies on rows being sorted by frame.
    pub fn frame_rows(&self, frame: FrameLabel) -> &[BucketedPoint] {
        let start = self.rows.partition_point(|r| r.frame < frame);
        let end = self.rows.partition_point(|r| r.frame <= frame);
        &self.rows[start..end]
    }

    /// Number of rows per frame, in frame order.
    pub fn frame_counts(&self) -> Vec<FrameCount> {
        self.frames
            .iter()
            .map(|&frame| FrameCount {
                frame,
                rows: self.frame_rows(frame).len(),
            })
            .collect()
    }
}
