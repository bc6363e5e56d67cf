//! Library report artifact model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A generated library activity report, persisted as a JSON artifact named
/// `report_<YYYYMMDD_HHMMSS>.json` so filenames sort chronologically.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub total_authors: i64,
    pub total_books: i64,
    /// Count of outstanding borrow records (return_date is null).
    pub total_books_borrowed: i64,
    pub timestamp: DateTime<Utc>,
}

impl Report {
    /// Artifact filename for a report generated at `timestamp`.
    /// Lexicographic order on these names matches chronological order.
    pub fn filename(&self) -> String {
        format!("report_{}.json", self.timestamp.format("%Y%m%d_%H%M%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filenames_sort_chronologically() {
        let earlier = Report {
            total_authors: 0,
            total_books: 0,
            total_books_borrowed: 0,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 59).unwrap(),
        };
        let later = Report {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap(),
            ..earlier.clone()
        };
        assert_eq!(earlier.filename(), "report_20250309_235959.json");
        assert!(earlier.filename() < later.filename());
    }
}
