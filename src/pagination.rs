//! This modules defines the common functionality for paging list pages.

use std::ops::RangeInclusive;

use maud::{Markup, html};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of rows to display per page.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 50,
            max_pages: 5,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// The number of pages needed to show `row_count` rows, at least one.
pub fn page_count(row_count: u64, page_size: u64) -> u64 {
    row_count.div_ceil(page_size.max(1)).max(1)
}

/// Clamp a requested page number into `1..=page_count`.
///
/// Missing or unparseable page numbers fall back to `default_page`.
pub fn clamp_page(requested: Option<&str>, default_page: u64, page_count: u64) -> u64 {
    requested
        .and_then(|page| page.trim().parse::<u64>().ok())
        .unwrap_or(default_page)
        .clamp(1, page_count.max(1))
}

/// The page links to show for `curr_page`: a window of at most `max_pages`
/// pages around the current one, the first and last pages with ellipses when
/// they fall outside the window, and back/next buttons.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let window = page_window(curr_page, page_count, max_pages);
    let (first, last) = (*window.start(), *window.end());
    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if first > 1 {
        indicators.push(PaginationIndicator::Page(1));

        if first > 2 {
            indicators.push(PaginationIndicator::Ellipsis);
        }
    }

    indicators.extend(window.map(|page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    }));

    if last < page_count {
        if last + 1 < page_count {
            indicators.push(PaginationIndicator::Ellipsis);
        }

        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// The pages listed individually, centred on `curr_page` where possible.
fn page_window(curr_page: u64, page_count: u64, max_pages: u64) -> RangeInclusive<u64> {
    if page_count <= max_pages {
        return 1..=page_count;
    }

    let first = curr_page
        .saturating_sub(max_pages / 2)
        .clamp(1, page_count - max_pages + 1);

    first..=first + max_pages - 1
}

/// Render the page links for a list page.
///
/// `page_url` maps a page number to the URL of that page, keeping the other
/// query parameters of the current request.
pub fn pagination_view(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    let link_style = "block px-3 py-2 rounded-sm text-blue-600 hover:underline";

    html! {
        nav class="pagination flex justify-center"
        {
            ul class="pagination flex items-center gap-x-2 p-0 m-0"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(link_style) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span
                                    aria-current="page"
                                    class="block px-3 py-2 rounded-sm font-bold text-black dark:text-white"
                                { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="block px-3 py-2 text-gray-500" { "..." }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) role="button" class=(link_style) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) role="button" class=(link_style) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}
