//! Result filtering.
//!
//! Filters are case-insensitive substring matches on the employee and city
//! names. Rows keep the order the store returned them in.

use crate::models::ContributionResult;

/// Optional substring filters over stored results.
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub employee: Option<String>,
    pub city: Option<String>,
}

impl ResultFilter {
    pub fn new(employee: Option<String>, city: Option<String>) -> Self {
        Self {
            employee: non_blank_lower(employee),
            city: non_blank_lower(city),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.employee.is_none() && self.city.is_none()
    }

    pub fn matches(&self, row: &ContributionResult) -> bool {
        contains_ci(&row.employee_name, self.employee.as_deref())
            && contains_ci(&row.city_name, self.city.as_deref())
    }

    /// Keep only the rows that match every set filter.
    pub fn apply(&self, rows: Vec<ContributionResult>) -> Vec<ContributionResult> {
        if self.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn non_blank_lower(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle_lower: Option<&str>) -> bool {
    match needle_lower {
        Some(n) => haystack.to_lowercase().contains(n),
        None => true,
    }
}
