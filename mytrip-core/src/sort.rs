//! Pure list helpers: ordering, identity-keyed merging, and selection continuity.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::collation::compare_korean;
use crate::model::{ContentId, SortOrder, TourItem};

fn compare_latest(left: &TourItem, right: &TourItem) -> Ordering {
    right.modified_time_key().cmp(left.modified_time_key())
}

fn compare_name(left: &TourItem, right: &TourItem) -> Ordering {
    compare_korean(&left.title, &right.title)
}

fn sort_in_place(items: &mut [TourItem], order: SortOrder) {
    match order {
        SortOrder::Latest => items.sort_by(compare_latest),
        SortOrder::Name => items.sort_by(compare_name),
    }
}

/// Return a sorted copy of `items`.
///
/// The sort is stable, so items with equal keys keep their relative order.
#[must_use]
pub fn sort_tours(items: &[TourItem], order: SortOrder) -> Vec<TourItem> {
    let mut sorted = items.to_vec();
    sort_in_place(&mut sorted, order);
    sorted
}

/// Union of `existing` and `incoming`, keyed by content id.
///
/// An incoming item always replaces an existing one with the same id and takes
/// over its position. Items new to the list are appended in incoming order.
#[must_use]
pub fn merge_tours(existing: &[TourItem], incoming: &[TourItem]) -> Vec<TourItem> {
    let mut merged: Vec<TourItem> = Vec::with_capacity(existing.len() + incoming.len());
    let mut positions: HashMap<ContentId, usize> = HashMap::with_capacity(merged.capacity());

    for item in existing.iter().chain(incoming) {
        if let Some(slot) = positions
            .get(&item.content_id)
            .and_then(|position| merged.get_mut(*position))
        {
            slot.clone_from(item);
        } else {
            positions.insert(item.content_id.clone(), merged.len());
            merged.push(item.clone());
        }
    }

    merged
}

/// Merge `incoming` into `existing`, then sort by `order`.
#[must_use]
pub fn merge_and_sort_tours(
    existing: &[TourItem],
    incoming: &[TourItem],
    order: SortOrder,
) -> Vec<TourItem> {
    let mut merged = merge_tours(existing, incoming);
    sort_in_place(&mut merged, order);
    merged
}

/// Selection to keep after `sorted` replaced the previous list.
///
/// Keeps `previous` while it is still listed, otherwise falls back to the first item.
#[must_use]
pub fn next_selected_tour_id(
    sorted: &[TourItem],
    previous: Option<&ContentId>,
) -> Option<ContentId> {
    if let Some(previous) = previous
        && sorted.iter().any(|tour| &tour.content_id == previous)
    {
        return Some(previous.clone());
    }

    sorted.first().map(|tour| tour.content_id.clone())
}

/// Whether both lists hold the same ids in the same order.
#[must_use]
pub fn is_same_order(left: &[TourItem], right: &[TourItem]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(lhs, rhs)| lhs.content_id == rhs.content_id)
}
