//! Listing options shared by every resource: sort, pagination, and the
//! page envelope returned to callers.

use std::fmt;
use std::str::FromStr;

use bookstore_db::{OrderBy, SortDirection};
use serde::{Deserialize, Serialize};

use super::error::FieldError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Columns a resource can be ordered by.
pub trait SortField: Copy + Default + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// Column name as exposed by the record and accepted in `sort`.
    fn as_str(&self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.as_str() == raw)
    }
}

/// A `field:direction` ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> Sort<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parses `field:direction`. A missing direction means ascending.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let (field, direction) = match raw.split_once(':') {
            Some((field, direction)) => (field, Some(direction)),
            None => (raw, None),
        };

        let field = F::parse(field.trim()).ok_or_else(|| {
            let allowed: Vec<&str> = F::ALL.iter().map(|f| f.as_str()).collect();
            FieldError::new(
                "sort",
                format!("unknown sort field '{}'; expected one of {}", field, allowed.join(", ")),
            )
        })?;

        let direction = match direction.map(|d| d.trim().to_ascii_lowercase()).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(FieldError::new(
                    "sort",
                    format!("unknown sort direction '{}'; expected asc or desc", other),
                ))
            }
        };

        Ok(Self { field, direction })
    }

    pub fn order_by(&self) -> OrderBy {
        OrderBy::new(self.field.as_str(), self.direction)
    }
}

impl<F: SortField> fmt::Display for Sort<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", self.field.as_str(), direction)
    }
}

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Rows to skip: `(page - 1) * limit`.
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn take(&self) -> u64 {
        u64::from(self.limit)
    }

    /// Validates raw `page`/`limit` parameters, recording problems in `errors`.
    pub fn parse(page: Option<&str>, limit: Option<&str>, errors: &mut Vec<FieldError>) -> Self {
        let page = parse_positive("page", page, errors).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive("limit", limit, errors).unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }
}

fn parse_positive(
    param: &'static str,
    raw: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    let value: u32 = parse_param(param, raw, errors)?;
    if value == 0 {
        errors.push(FieldError::new(param, "must be a positive integer"));
        return None;
    }
    Some(value)
}

/// Parses an optional query parameter. Blank values count as absent.
pub fn parse_param<T: FromStr>(
    param: &'static str,
    raw: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let raw = non_blank(raw)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(
                param,
                format!("'{}' is not a valid number", raw),
            ));
            None
        }
    }
}

/// Trims the value and drops it when empty.
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses an optional `sort` parameter, falling back to `id:asc`.
pub fn parse_sort<F: SortField>(raw: Option<&str>, errors: &mut Vec<FieldError>) -> Sort<F> {
    match non_blank(raw).map(Sort::<F>::parse) {
        None => Sort::default(),
        Some(Ok(sort)) => sort,
        Some(Err(err)) => {
            errors.push(err);
            Sort::default()
        }
    }
}

/// Listing envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}
