use std::ops::Range;
use std::sync::Arc;

use crate::backend::SearchTarget;
use crate::search::{ResultRecord, SourceEncoding};

/// Direction of a page-navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Forward,
    Backward,
}

/// What a navigation request did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    /// Nothing to page through; the request is silently dropped.
    Ignored,
    /// The current page changed to the contained value.
    Moved(usize),
    /// Already on the first/last page; the current page is unchanged.
    AtBoundary,
}

/// The most recent search of one identity.
///
/// The result list is fixed at construction; only the current page moves.
#[derive(Debug, Clone)]
pub struct Session {
    results: Arc<[ResultRecord]>,
    keyword: String,
    target: SearchTarget,
    encoding: SourceEncoding,
    page_size: usize,
    total_pages: usize,
    current_page: usize,
}

impl Session {
    /// Creates a session positioned on page 1.
    ///
    /// `page_size` of zero is treated as one.
    pub fn new(
        results: Vec<ResultRecord>,
        keyword: impl Into<String>,
        target: SearchTarget,
        encoding: SourceEncoding,
        page_size: usize,
    ) -> Self {
        let page_size = page_size.max(1);
        let total_pages = results.len().div_ceil(page_size);

        Self {
            results: results.into(),
            keyword: keyword.into(),
            target,
            encoding,
            page_size,
            total_pages,
            current_page: 1,
        }
    }

    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Shared handle to the result list, for work that outlives a lock guard.
    pub fn shared_results(&self) -> Arc<[ResultRecord]> {
        Arc::clone(&self.results)
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn target(&self) -> SearchTarget {
        self.target
    }

    pub fn encoding(&self) -> SourceEncoding {
        self.encoding
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Index range of `page` within the result list, or `None` when the page
    /// lies outside `[1, total_pages]`.
    pub fn page_range(&self, page: usize) -> Option<Range<usize>> {
        if page < 1 || page > self.total_pages {
            return None;
        }
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.results.len());
        Some(start..end)
    }

    /// Records on `page`, or `None` when out of range.
    pub fn page(&self, page: usize) -> Option<&[ResultRecord]> {
        self.page_range(page).map(|range| &self.results[range])
    }

    /// Moves to `page` if it exists.
    pub fn jump_to(&mut self, page: usize) -> bool {
        if self.page_range(page).is_some() {
            self.current_page = page;
            true
        } else {
            false
        }
    }

    /// Advances one page in `direction`.
    pub fn step(&mut self, direction: PageDirection) -> PageStep {
        if self.results.is_empty() || self.total_pages <= 1 {
            return PageStep::Ignored;
        }

        match direction {
            PageDirection::Forward if self.current_page < self.total_pages => {
                self.current_page += 1;
                PageStep::Moved(self.current_page)
            }
            PageDirection::Backward if self.current_page > 1 => {
                self.current_page -= 1;
                PageStep::Moved(self.current_page)
            }
            _ => PageStep::AtBoundary,
        }
    }
}
