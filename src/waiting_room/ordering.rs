//! Queue ordering and wait time recomputation

use crate::types::ProviderId;
use crate::waiting_room::entry::WaitingQueueEntry;
use crate::waiting_room::estimator::{QueueAhead, WaitTimeEstimator};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Queue order within a provider: priority, then arrival, then appointment id
pub fn queue_order(a: &WaitingQueueEntry, b: &WaitingQueueEntry) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.checked_in_time.cmp(&b.checked_in_time))
        .then_with(|| a.appointment_id.cmp(&b.appointment_id))
}

/// Regroup and reorder the live queue and rewrite every estimate
///
/// The result is grouped by provider (providers in id order), each group in
/// [`queue_order`], with `estimated_wait_minutes` derived from the entries
/// ahead in the same group.
pub fn recompute_wait_times(
    entries: Vec<WaitingQueueEntry>,
    estimator: &dyn WaitTimeEstimator,
) -> Vec<WaitingQueueEntry> {
    let mut groups: BTreeMap<ProviderId, Vec<WaitingQueueEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.provider_id.clone()).or_default().push(entry);
    }

    let mut recomputed = Vec::new();
    for (_, mut group) in groups {
        group.sort_by(queue_order);

        let mut ahead = QueueAhead::default();
        for mut entry in group {
            entry.estimated_wait_minutes = estimator.estimate_minutes(ahead);

            if entry.is_waiting() {
                ahead.waiting += 1;
            } else if entry.is_in_progress() {
                ahead.in_progress += 1;
            }

            recomputed.push(entry);
        }
    }

    recomputed
}
