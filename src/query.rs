/// Filtered, paginated read access to the cached warnings.
///
/// `QueryService` only ever reads the cache. Filtering returns pruned
/// copies: when an area filter is given, each returned warning keeps only
/// the warning areas (and within them only the affected areas) whose name
/// matched, so a client sees why the warning was selected.

use std::sync::Arc;

use crate::cache::WarningCache;
use crate::model::{Warning, WarningArea};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Query parameters. Empty strings mean "no filter"; page numbers are
/// 1-indexed and clamped as described on `filter_and_paginate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningQuery {
    pub event_type: String,
    pub area_name: String,
    pub page: i64,
    pub page_size: i64,
}

pub struct QueryService {
    cache: Arc<WarningCache>,
    default_page_size: usize,
}

impl QueryService {
    pub fn new(cache: Arc<WarningCache>, default_page_size: usize) -> Self {
        Self {
            cache,
            default_page_size: default_page_size.max(1),
        }
    }

    pub fn query(&self, query: &WarningQuery) -> Vec<Warning> {
        let snapshot = self.cache.read();
        filter_and_paginate(&snapshot.warnings, query, self.default_page_size)
    }
}

/// Filters `warnings` and returns the requested page.
///
/// - `event_type` matches `event.code` exactly.
/// - `area_name` matches any affected-area name, Swedish or English,
///   case-insensitively as a substring.
/// - `page < 1` is treated as 1, `page_size < 1` as `default_page_size`.
/// - A page past the end is empty.
pub fn filter_and_paginate(
    warnings: &[Warning],
    query: &WarningQuery,
    default_page_size: usize,
) -> Vec<Warning> {
    let needle = query.area_name.to_lowercase();

    let page = usize::try_from(query.page).unwrap_or(0).max(1);
    let page_size = match usize::try_from(query.page_size) {
        Ok(size) if size >= 1 => size,
        _ => default_page_size,
    };
    let skip = (page - 1).saturating_mul(page_size);

    warnings
        .iter()
        .filter(|w| query.event_type.is_empty() || w.event.code == query.event_type)
        .filter_map(|w| {
            if needle.is_empty() {
                Some(w.clone())
            } else {
                narrow_to_area(w, &needle)
            }
        })
        .skip(skip)
        .take(page_size)
        .collect()
}

/// Copy of `warning` keeping only areas whose affected-area names contain
/// `needle` (lowercase). `None` if nothing matched.
fn narrow_to_area(warning: &Warning, needle: &str) -> Option<Warning> {
    let areas: Vec<WarningArea> = warning
        .warning_areas
        .iter()
        .filter_map(|area| {
            let affected: Vec<_> = area
                .affected_areas
                .iter()
                .filter(|a| a.name_contains(needle))
                .cloned()
                .collect();
            if affected.is_empty() {
                return None;
            }
            Some(WarningArea {
                affected_areas: affected,
                ..area.clone()
            })
        })
        .collect();

    if areas.is_empty() {
        return None;
    }
    Some(Warning {
        warning_areas: areas,
        ..warning.clone()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
