//! Ordering, pagination and faceting of merged hits.

use std::cmp::Ordering;

use booktrack_core::{Record, ResultType, SearchFacets, SearchHit, SortBy, SortOrder};

/// Sort hits in place. The sort is stable, so equal keys keep merge order.
///
/// Relevance is always descending. Date and title follow `order`; missing
/// dates sort as the earliest.
pub fn sort_hits(hits: &mut [SearchHit], sort_by: SortBy, order: SortOrder) {
    match sort_by {
        SortBy::Relevance => hits.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(Ordering::Equal)
        }),
        SortBy::Date => hits.sort_by(|a, b| directed(a.created_at.cmp(&b.created_at), order)),
        SortBy::Title => hits.sort_by(|a, b| {
            directed(a.title.to_lowercase().cmp(&b.title.to_lowercase()), order)
        }),
    }
}

// Reversing the comparator, not the slice, keeps ties in merge order.
fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    if order.is_desc() {
        ordering.reverse()
    } else {
        ordering
    }
}

/// One page of an already sorted list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub has_more: bool,
}

/// Slice `[offset, offset + limit)` out of `items`.
///
/// `has_more` is true when anything remains past the returned slice.
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Page<T> {
    let total = items.len();
    let items: Vec<T> = items.into_iter().skip(offset).take(limit).collect();
    let has_more = offset + items.len() < total;
    Page {
        items,
        total,
        has_more,
    }
}

/// Accumulates facet counts as matched records are turned into hits.
#[derive(Debug, Default)]
pub struct FacetCounter {
    facets: SearchFacets,
}

impl FacetCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `kind` shows up in the type facet, even with no hits.
    pub fn touch(&mut self, kind: ResultType) {
        self.facets
            .result_type
            .entry(kind.as_str().to_string())
            .or_insert(0);
    }

    /// Count one hit for `record`.
    pub fn record(&mut self, record: &Record) {
        *self
            .facets
            .result_type
            .entry(record.result_type().as_str().to_string())
            .or_insert(0) += 1;

        if let Record::Book(book) = record {
            *self
                .facets
                .status
                .entry(book.status.as_str().to_string())
                .or_insert(0) += 1;
            for genre in &book.genres {
                *self.facets.genre.entry(genre.clone()).or_insert(0) += 1;
            }
        }
    }

    pub fn finish(self) -> SearchFacets {
        self.facets
    }
}
