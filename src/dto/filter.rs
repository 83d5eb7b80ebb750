use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Paging plus dynamic filter/sort criteria posted to `get-by-filter` endpoints.
///
/// A zero page number or size falls back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInputWithFilter {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub page_number: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub page_size: i64,
    #[serde(default)]
    pub sort: Vec<SortCriteria>,
    /// Field name -> condition. Ordered so generated SQL is deterministic.
    #[serde(default)]
    pub filter: BTreeMap<String, FilterCondition>,
}

impl PaginationInputWithFilter {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
            ..Self::default()
        }
    }

    pub fn page_number(&self) -> i64 {
        if self.page_number <= 0 {
            DEFAULT_PAGE_NUMBER
        } else {
            self.page_number
        }
    }

    pub fn page_size(&self) -> i64 {
        if self.page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size.min(MAX_PAGE_SIZE)
        }
    }

    /// Rows to skip. Saturates so a huge page number reads past the end
    /// instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page_number() - 1).saturating_mul(self.page_size())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SortCriteria {
    pub col_id: String,
    #[serde(default)]
    pub sort: SortDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    #[serde(rename = "type")]
    pub operator: FilterOperator,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Contains,
    NotContains,
    Equals,
    NotEqual,
    StartsWith,
    EndsWith,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    InRange,
}

/// One page of results plus the metadata needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    pub page_number: i64,
    pub page_size: i64,
    pub total_rows: i64,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub items: Vec<T>,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, total_rows: i64, page_number: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 && total_rows > 0 {
            (total_rows + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            page_number,
            page_size,
            total_rows,
            total_pages,
            has_previous_page: page_number > 1,
            has_next_page: page_number < total_pages,
            items,
        }
    }

    /// Maps every item while keeping the paging metadata verbatim.
    pub fn map<U, F>(self, f: F) -> PagedList<U>
    where
        F: FnMut(T) -> U,
    {
        PagedList {
            page_number: self.page_number,
            page_size: self.page_size,
            total_rows: self.total_rows,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
