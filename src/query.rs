use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::models::UserResponse;
use crate::products::models::Product;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_RECORDS_PER_PAGE: u32 = 10;
const MAX_RECORDS_PER_PAGE: u32 = 100;

/// Pagination query parameters.
/// Missing or out-of-range values fall back to the defaults.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (1-100, defaults to 10)
    pub records_per_page: Option<u32>,
}

/// Resolved LIMIT/OFFSET window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
    pub offset: u64,
}

impl PageParams {
    pub fn window(&self) -> PageWindow {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let limit = self
            .records_per_page
            .filter(|n| (1..=MAX_RECORDS_PER_PAGE).contains(n))
            .unwrap_or(DEFAULT_RECORDS_PER_PAGE);

        PageWindow {
            page,
            limit,
            offset: u64::from(page - 1) * u64::from(limit),
        }
    }
}

/// One page of results plus the total number of records
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(UserPage = Page<UserResponse>, ProductPage = Page<Product>)]
pub struct Page<T> {
    pub total_count: u64,
    pub page: u32,
    pub records_per_page: u32,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(window: PageWindow, total_count: u64, data: Vec<T>) -> Self {
        Self {
            total_count,
            page: window.page,
            records_per_page: window.limit,
            data,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total_count: self.total_count,
            page: self.page,
            records_per_page: self.records_per_page,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
