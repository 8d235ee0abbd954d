//! Common types used across the platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 1-based page request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Build a page request from optional query parameters.
    ///
    /// Both omitted means no pagination. A single omitted value falls back to
    /// page 1 or `default_limit`.
    pub fn from_parts(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Result<Option<Self>, &'static str> {
        if page.is_none() && limit.is_none() {
            return Ok(None);
        }
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);
        if page == 0 {
            return Err("Page must be at least 1");
        }
        if limit == 0 {
            return Err("Limit must be at least 1");
        }
        Ok(Some(Self { page, limit }))
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Inclusive date window for report queries. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn new(start_date: Option<DateTime<Utc>>, end_date: Option<DateTime<Utc>>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start_date.map_or(true, |start| at >= start)
            && self.end_date.map_or(true, |end| at <= end)
    }

    pub fn is_ordered(&self) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_no_pagination_when_both_omitted() {
        assert_eq!(PageRequest::from_parts(None, None, 20), Ok(None));
    }

    #[test]
    fn test_missing_half_falls_back_to_defaults() {
        let p = PageRequest::from_parts(Some(3), None, 20).unwrap().unwrap();
        assert_eq!((p.page, p.limit, p.offset()), (3, 20, 40));

        let p = PageRequest::from_parts(None, Some(5), 20).unwrap().unwrap();
        assert_eq!((p.page, p.limit, p.offset()), (1, 5, 0));
    }

    #[test]
    fn test_zero_page_rejected() {
        assert!(PageRequest::from_parts(Some(0), Some(10), 20).is_err());
        assert!(PageRequest::from_parts(Some(1), Some(0), 20).is_err());
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let window = DateWindow::new(Some(start), Some(end));

        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + chrono::Duration::seconds(1)));
        assert!(DateWindow::default().contains(start));
        assert!(!DateWindow::new(Some(end), Some(start)).is_ordered());
    }
}
