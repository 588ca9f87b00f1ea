//! Pagination state and listing parameters for pull request queries.
//!
//! The provider paginates list responses and reports navigation through the
//! RFC 5988 `Link` response header. `PageInfo` captures the resulting page
//! position; `ListParams` carries the caller's filters.

use url::Url;

/// Items per page the provider accepts at most; larger requests are clamped.
pub(crate) const MAX_PER_PAGE: u8 = 100;

/// Items per page when the caller does not choose one.
pub(crate) const DEFAULT_PER_PAGE: u8 = 30;

/// Lifecycle filter for listing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFilter {
    /// Only open pull requests.
    #[default]
    Open,
    /// Only closed pull requests.
    Closed,
    /// All pull requests regardless of state.
    All,
}

impl StateFilter {
    /// Returns the API parameter value for this filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Parameters for listing pull requests.
#[derive(Debug, Clone, Copy)]
pub struct ListParams {
    /// Filter by lifecycle state. Defaults to open.
    pub state: Option<StateFilter>,
    /// Page number to fetch (1-based). Defaults to 1.
    pub page: Option<u32>,
    /// Items per page; values above the provider maximum of 100 are
    /// clamped. Defaults to 30.
    pub per_page: Option<u8>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            state: Some(StateFilter::Open),
            page: Some(1),
            per_page: Some(DEFAULT_PER_PAGE),
        }
    }
}

/// Current page state for paginated results.
///
/// # Example
///
/// ```
/// use patty::github::pagination::PageInfo;
///
/// let info = PageInfo::new(2, 50)
///     .with_total_pages(Some(5))
///     .with_has_next(true)
///     .with_has_prev(true);
/// assert!(!info.is_first_page());
/// assert!(!info.is_last_page());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Current page number (1-based).
    current_page: u32,
    /// Items per page.
    per_page: u8,
    /// Total number of pages if known.
    total_pages: Option<u32>,
    /// Whether more pages exist after the current one.
    has_next: bool,
    /// Whether pages exist before the current one.
    has_prev: bool,
}

impl PageInfo {
    /// Creates a new page info instance.
    ///
    /// The `total_pages` and navigation flags default to unknown / false.
    #[must_use]
    pub const fn new(current_page: u32, per_page: u8) -> Self {
        Self {
            current_page,
            per_page,
            total_pages: None,
            has_next: false,
            has_prev: false,
        }
    }

    /// Sets the total number of pages.
    #[must_use]
    pub const fn with_total_pages(mut self, total_pages: Option<u32>) -> Self {
        self.total_pages = total_pages;
        self
    }

    /// Sets whether there is a next page.
    #[must_use]
    pub const fn with_has_next(mut self, has_next: bool) -> Self {
        self.has_next = has_next;
        self
    }

    /// Sets whether there is a previous page.
    #[must_use]
    pub const fn with_has_prev(mut self, has_prev: bool) -> Self {
        self.has_prev = has_prev;
        self
    }

    /// Builds page info for a response from the parsed `Link` relations.
    pub(crate) fn from_relations(page: u32, per_page: u8, relations: LinkRelations) -> Self {
        // Without a "last" relation the current page closes the set.
        let total_pages = relations
            .last_page
            .or_else(|| (!relations.has_next).then_some(page));
        Self::new(page, per_page)
            .with_total_pages(total_pages)
            .with_has_next(relations.has_next)
            .with_has_prev(relations.has_prev)
    }

    /// Returns the current page number (1-based).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Returns the number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Returns the total number of pages if known.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Returns true if more pages exist after the current one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    /// Returns true if pages exist before the current one.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.has_prev
    }

    /// Returns true if this is the first page.
    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.current_page == 1
    }

    /// Returns true if this is the last page.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        !self.has_next
    }
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            per_page: DEFAULT_PER_PAGE,
            total_pages: None,
            has_next: false,
            has_prev: false,
        }
    }
}

/// Navigation hints parsed from the `Link` response header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LinkRelations {
    pub(crate) has_next: bool,
    pub(crate) has_prev: bool,
    pub(crate) last_page: Option<u32>,
}

/// Parses a `Link` header value of the form
/// `<url>; rel="next", <url>; rel="last"`.
///
/// Unrecognized relations and malformed parts are ignored.
pub(crate) fn parse_link_header(value: &str) -> LinkRelations {
    let mut relations = LinkRelations::default();
    for part in value.split(',') {
        let mut sections = part.split(';');
        let Some(target) = sections
            .next()
            .map(str::trim)
            .and_then(|url_section| url_section.strip_prefix('<'))
            .and_then(|rest| rest.strip_suffix('>'))
        else {
            continue;
        };
        let rel = sections.map(str::trim).find_map(|section| {
            section
                .strip_prefix("rel=\"")
                .and_then(|rest| rest.strip_suffix('"'))
        });
        match rel {
            Some("next") => relations.has_next = true,
            Some("prev") => relations.has_prev = true,
            Some("last") => relations.last_page = page_query_param(target),
            _ => {}
        }
    }
    relations
}

fn page_query_param(target: &str) -> Option<u32> {
    let parsed = Url::parse(target).ok()?;
    parsed
        .query_pairs()
        .find(|(name, _)| name == "page")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::{LinkRelations, PageInfo, parse_link_header};

    #[test]
    fn parses_all_relations_from_a_link_header() {
        let header = "<https://api.github.com/repos/o/r/pulls?page=3&per_page=50>; rel=\"next\", \
                      <https://api.github.com/repos/o/r/pulls?page=1&per_page=50>; rel=\"prev\", \
                      <https://api.github.com/repos/o/r/pulls?page=7&per_page=50>; rel=\"last\"";

        let relations = parse_link_header(header);
        assert!(relations.has_next);
        assert!(relations.has_prev);
        assert_eq!(relations.last_page, Some(7));
    }

    #[test]
    fn ignores_malformed_parts() {
        let relations = parse_link_header("garbage, <also-garbage; rel=\"next\"");
        assert_eq!(relations, LinkRelations::default());
    }

    #[test]
    fn missing_next_relation_closes_the_set_at_the_current_page() {
        let info = PageInfo::from_relations(4, 50, LinkRelations {
            has_next: false,
            has_prev: true,
            last_page: None,
        });

        assert_eq!(info.total_pages(), Some(4));
        assert!(info.is_last_page());
        assert!(info.has_prev());
    }

    #[test]
    fn last_relation_wins_over_the_closing_heuristic() {
        let info = PageInfo::from_relations(2, 30, LinkRelations {
            has_next: true,
            has_prev: true,
            last_page: Some(9),
        });

        assert_eq!(info.total_pages(), Some(9));
        assert!(!info.is_last_page());
    }
}
