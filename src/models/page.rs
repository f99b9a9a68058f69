use serde::{Deserialize, Serialize};

use super::table_filter::SortSpec;

pub const DEFAULT_PAGE_SIZE: i64 = 25;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Highest page number whose offset still fits in an i64.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Page request: 1-based page number, clamped size, optional sort.
#[derive(Debug, Clone, PartialEq)]
pub struct Pageable {
    pub page: i64,
    pub size: i64,
    pub sort: SortSpec,
}

impl Default for Pageable {
    fn default() -> Self {
        Pageable { page: 1, size: DEFAULT_PAGE_SIZE, sort: SortSpec::default() }
    }
}

impl Pageable {
    pub fn new(page: i64, size: i64, sort: SortSpec) -> Self {
        Pageable {
            page: page.clamp(1, MAX_PAGE),
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

/// Query-string form of [`Pageable`] (`?page=2&size=10&sort=level&dir=desc`).
#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

impl From<&PageParams> for Pageable {
    fn from(p: &PageParams) -> Self {
        Pageable::new(
            p.page.unwrap_or(1),
            p.size.unwrap_or(DEFAULT_PAGE_SIZE),
            SortSpec::from_params(p.sort.as_deref(), p.dir.as_deref()),
        )
    }
}

/// One page of results plus the total across all pages.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub page: i64,
    pub size: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(content: Vec<T>, total_elements: i64, pageable: &Pageable) -> Self {
        let total_pages = (total_elements + pageable.size - 1) / pageable.size;
        Page {
            content,
            total_elements,
            page: pageable.page,
            size: pageable.size,
            total_pages,
        }
    }

    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            page: self.page,
            size: self.size,
            total_pages: self.total_pages,
        }
    }
}
