//! Page selector parsing.
//!
//! A selector is a comma-separated list of 1-based page numbers and inclusive
//! ranges, e.g. `"1,3,5-10"`. Each token becomes one [`PageGroup`]; groups
//! keep the order in which they appear because that order drives output file
//! ordering downstream. Repeated tokens yield repeated groups.
//!
//! Parsing never looks at the document. Range checks against the real page
//! count happen in [`filter_valid`] / [`PageSelector::retain_in_range`].

use crate::error::{PdfToolError, Result};
use tracing::debug;

/// One comma-separated unit of a selector.
///
/// A group always covers a contiguous run of pages, so it is stored as
/// inclusive 0-based bounds. Indices are only materialized on request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGroup {
    /// `page_{n}` for single pages, `pages_{a}-{b}` for ranges.
    pub label: String,
    /// First 0-based page index.
    pub first: usize,
    /// Last 0-based page index, inclusive.
    pub last: usize,
}

impl PageGroup {
    fn single(page: usize) -> Self {
        Self {
            label: format!("page_{}", page),
            first: page - 1,
            last: page - 1,
        }
    }

    fn range(start: usize, end: usize) -> Self {
        Self {
            label: format!("pages_{}-{}", start, end),
            first: start - 1,
            last: end - 1,
        }
    }

    /// Number of pages in the group.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Always false; a group holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 0-based page indices in ascending order.
    ///
    /// Call on range-checked groups; an unchecked group may span far more
    /// pages than any document holds.
    pub fn requested_indices(&self) -> Vec<usize> {
        (self.first..=self.last).collect()
    }

    /// Output file name derived from the pages actually present in the group.
    ///
    /// A group holding one page is named `page_{n}.pdf`; otherwise the first
    /// and last 1-based page numbers give `pages_{first}-{last}.pdf`.
    pub fn output_file_name(&self) -> String {
        if self.first == self.last {
            format!("page_{}.pdf", self.first + 1)
        } else {
            format!("pages_{}-{}.pdf", self.first + 1, self.last + 1)
        }
    }

    /// 1-based page numbers of this group.
    pub fn page_numbers(&self) -> Vec<usize> {
        (self.first + 1..=self.last + 1).collect()
    }
}

/// Parsed page selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelector {
    groups: Vec<PageGroup>,
}

impl PageSelector {
    /// Groups in selector order.
    pub fn groups(&self) -> &[PageGroup] {
        &self.groups
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no groups remain.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Drop indices outside `[0, total_pages)` and any group left empty.
    pub fn retain_in_range(&self, total_pages: usize) -> PageSelector {
        let groups = self
            .groups
            .iter()
            .filter_map(|group| {
                if group.first >= total_pages {
                    debug!(label = %group.label, total_pages, "Dropping out-of-range group");
                    return None;
                }
                Some(PageGroup {
                    label: group.label.clone(),
                    first: group.first,
                    last: group.last.min(total_pages - 1),
                })
            })
            .collect();
        PageSelector { groups }
    }

    /// Fail with `NoValidPages` when nothing survived range filtering.
    pub fn require_pages(self, total_pages: usize) -> Result<PageSelector> {
        if self.groups.is_empty() {
            return Err(PdfToolError::NoValidPages { total_pages });
        }
        Ok(self)
    }
}

impl IntoIterator for PageSelector {
    type Item = PageGroup;
    type IntoIter = std::vec::IntoIter<PageGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Parse a selector string into page groups.
pub fn parse(selector: &str) -> Result<PageSelector> {
    if selector.trim().is_empty() {
        return Err(invalid(selector, "no pages specified"));
    }

    let mut groups = Vec::new();
    for token in selector.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        groups.push(parse_token(token)?);
    }

    if groups.is_empty() {
        return Err(invalid(selector, "no pages specified"));
    }

    debug!(selector, groups = groups.len(), "Parsed page selector");
    Ok(PageSelector { groups })
}

/// Parse and then drop everything outside the document.
///
/// The result may be empty; callers that need at least one page should chain
/// [`PageSelector::require_pages`].
pub fn filter_valid(selector: &str, total_pages: usize) -> Result<PageSelector> {
    Ok(parse(selector)?.retain_in_range(total_pages))
}

fn parse_token(token: &str) -> Result<PageGroup> {
    match token.split_once('-') {
        Some((start, end)) => {
            let start = parse_page_number(token, start)?;
            let end = parse_page_number(token, end)?;
            if start > end {
                return Err(invalid(token, "invalid range (start > end)"));
            }
            Ok(PageGroup::range(start, end))
        }
        None => Ok(PageGroup::single(parse_page_number(token, token)?)),
    }
}

fn parse_page_number(token: &str, part: &str) -> Result<usize> {
    let part = part.trim();
    // A leading sign would make "-3" look like an empty range start.
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(token, "not a page number or range"));
    }
    let value: usize = part
        .parse()
        .map_err(|_| invalid(token, "page number too large"))?;
    if value < 1 {
        return Err(invalid(token, "page numbers must be >= 1"));
    }
    Ok(value)
}

fn invalid(token: &str, reason: &str) -> PdfToolError {
    PdfToolError::InvalidSelector {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}
