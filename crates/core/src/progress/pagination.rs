use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cap on progress units per page.
pub const DEFAULT_UNITS_PER_PAGE: u32 = 30;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PaginationError {
    #[error("units per page must be > 0")]
    InvalidCap,

    #[error("declared {declared} pages but found {actual}")]
    PageCountMismatch { declared: u32, actual: usize },

    #[error("page at position {position} has index {found}")]
    IndexOutOfOrder { position: usize, found: u32 },

    #[error("page {page_index} starts at {found}, expected {expected}")]
    Gap {
        page_index: u32,
        expected: u32,
        found: u32,
    },

    #[error("page {page_index} is empty")]
    EmptyPage { page_index: u32 },

    #[error("page {page_index} count does not match its unit range")]
    CountMismatch { page_index: u32 },

    #[error("page {page_index} holds {count} units, over the cap of {cap}")]
    PageTooLarge { page_index: u32, count: u32, cap: u32 },

    #[error("needs_pagination flag disagrees with page count")]
    FlagMismatch,
}

//
// ─── PAGES ─────────────────────────────────────────────────────────────────────
//

/// Contiguous slice `[start_unit, end_unit)` of progress units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub page_index: u32,
    pub start_unit: u32,
    pub end_unit: u32,
    pub count: u32,
}

impl PageDescriptor {
    #[must_use]
    pub fn new(page_index: u32, start_unit: u32, end_unit: u32) -> Self {
        Self {
            page_index,
            start_unit,
            end_unit,
            count: end_unit.saturating_sub(start_unit),
        }
    }
}

/// A page descriptor with its neighbourhood flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: PageDescriptor,
    pub total_pages: u32,
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Partition of a session's progress units into capped-size pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_pages: u32,
    pub units_per_page: u32,
    pub pages: Vec<PageDescriptor>,
    pub needs_pagination: bool,
}

impl Pagination {
    /// Pagination of zero units.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.pages.iter().map(|page| page.count).sum()
    }

    /// Bounds-checked page lookup.
    #[must_use]
    pub fn page_data(&self, page_index: u32) -> Option<&PageDescriptor> {
        self.pages.get(usize::try_from(page_index).ok()?)
    }

    #[must_use]
    pub fn next_page_data(&self, current: u32) -> Option<&PageDescriptor> {
        self.page_data(current.checked_add(1)?)
    }

    #[must_use]
    pub fn previous_page_data(&self, current: u32) -> Option<&PageDescriptor> {
        self.page_data(current.checked_sub(1)?)
    }

    /// Page descriptor plus first/last/next/previous flags.
    #[must_use]
    pub fn page_info(&self, page_index: u32) -> Option<PageInfo> {
        let page = *self.page_data(page_index)?;
        let has_next_page = self.next_page_data(page_index).is_some();
        let has_previous_page = self.previous_page_data(page_index).is_some();
        Some(PageInfo {
            page,
            total_pages: self.total_pages,
            is_first_page: page_index == 0,
            is_last_page: !has_next_page,
            has_next_page,
            has_previous_page,
        })
    }

    /// Check the structural invariants, e.g. after deserializing.
    ///
    /// # Errors
    ///
    /// Returns the first `PaginationError` found.
    pub fn validate(&self) -> Result<(), PaginationError> {
        if usize::try_from(self.total_pages).ok() != Some(self.pages.len()) {
            return Err(PaginationError::PageCountMismatch {
                declared: self.total_pages,
                actual: self.pages.len(),
            });
        }

        let mut expected_start = 0_u32;
        for (position, page) in self.pages.iter().enumerate() {
            if usize::try_from(page.page_index).ok() != Some(position) {
                return Err(PaginationError::IndexOutOfOrder {
                    position,
                    found: page.page_index,
                });
            }
            if page.start_unit != expected_start {
                return Err(PaginationError::Gap {
                    page_index: page.page_index,
                    expected: expected_start,
                    found: page.start_unit,
                });
            }
            if page.count == 0 {
                return Err(PaginationError::EmptyPage {
                    page_index: page.page_index,
                });
            }
            if page.end_unit.checked_sub(page.start_unit) != Some(page.count) {
                return Err(PaginationError::CountMismatch {
                    page_index: page.page_index,
                });
            }
            if page.count > self.units_per_page {
                return Err(PaginationError::PageTooLarge {
                    page_index: page.page_index,
                    count: page.count,
                    cap: self.units_per_page,
                });
            }
            expected_start = page.end_unit;
        }

        if self.needs_pagination != (self.pages.len() > 1) {
            return Err(PaginationError::FlagMismatch);
        }
        Ok(())
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Splits progress units into pages of at most `units_per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationEngine {
    units_per_page: u32,
}

impl Default for PaginationEngine {
    fn default() -> Self {
        Self {
            units_per_page: DEFAULT_UNITS_PER_PAGE,
        }
    }
}

impl PaginationEngine {
    /// # Errors
    ///
    /// Returns `PaginationError::InvalidCap` if `units_per_page` is zero.
    pub fn new(units_per_page: u32) -> Result<Self, PaginationError> {
        if units_per_page == 0 {
            return Err(PaginationError::InvalidCap);
        }
        Ok(Self { units_per_page })
    }

    #[must_use]
    pub fn units_per_page(&self) -> u32 {
        self.units_per_page
    }

    /// Partition `total_units` into pages.
    ///
    /// Totals up to the cap produce a single page sized to the total.
    #[must_use]
    pub fn calculate(&self, total_units: u32) -> Pagination {
        if total_units == 0 {
            return Pagination::empty();
        }

        if total_units <= self.units_per_page {
            return Pagination {
                total_pages: 1,
                units_per_page: total_units,
                pages: vec![PageDescriptor::new(0, 0, total_units)],
                needs_pagination: false,
            };
        }

        let total_pages = total_units.div_ceil(self.units_per_page);
        let pages = (0..total_pages)
            .map(|page_index| {
                let start = page_index * self.units_per_page;
                let end = start.saturating_add(self.units_per_page).min(total_units);
                PageDescriptor::new(page_index, start, end)
            })
            .collect();

        Pagination {
            total_pages,
            units_per_page: self.units_per_page,
            pages,
            needs_pagination: true,
        }
    }
}
