//! Property tests for slot generation and waiting room ordering

mod fixtures;

use chrono::{Datelike, Duration, Weekday};
use frontdesk::config::StorageKeys;
use frontdesk::slots::{
    SlotConflictPolicy, SlotGenerationRequest, TimeSlotResolver, UnavailabilityPeriod,
};
use frontdesk::storage::InMemoryStore;
use frontdesk::types::{Priority, QueueStatus, TimeWindow};
use frontdesk::waiting_room::{
    queue_order, recompute_wait_times, LinearWaitTimeEstimator, WaitingQueueEntry,
    WaitingRoomHistoryRecord,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use fixtures::{date, time, FixedClock, Visit};

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Urgent),
        Just(Priority::Normal),
        Just(Priority::Low)
    ]
}

fn status_strategy() -> impl Strategy<Value = QueueStatus> {
    prop_oneof![Just(QueueStatus::Waiting), Just(QueueStatus::InProgress)]
}

fn entry_strategy() -> impl Strategy<Value = WaitingQueueEntry> {
    (
        0usize..40,
        prop::sample::select(vec!["dr-adams", "dr-lee", "dr-park"]),
        priority_strategy(),
        status_strategy(),
        0i64..180,
    )
        .prop_map(|(n, provider, priority, status, minute)| {
            let visit = Visit::new(&format!("appt-{}", n), provider);
            let mut entry = WaitingQueueEntry::new(
                &visit.appointment,
                &visit.patient,
                &visit.provider,
                priority,
                FixedClock::new().at(minute),
            );
            entry.status = status;
            entry
        })
}

fn resolver() -> TimeSlotResolver {
    TimeSlotResolver::new(
        Arc::new(InMemoryStore::new()),
        StorageKeys::default(),
        SlotConflictPolicy::Flag,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn recomputed_queue_respects_order(entries in prop::collection::vec(entry_strategy(), 0..30)) {
        // Appointment ids are unique in a live queue
        let mut seen = HashSet::new();
        let entries: Vec<_> = entries
            .into_iter()
            .filter(|e| seen.insert(e.appointment_id.clone()))
            .collect();
        let count = entries.len();

        let queue = recompute_wait_times(entries, &LinearWaitTimeEstimator::default());
        prop_assert_eq!(queue.len(), count);

        for pair in queue.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.provider_id == b.provider_id {
                prop_assert_ne!(queue_order(a, b), std::cmp::Ordering::Greater);
                prop_assert!(a.estimated_wait_minutes <= b.estimated_wait_minutes);
            } else {
                prop_assert!(a.provider_id < b.provider_id);
                prop_assert_eq!(b.estimated_wait_minutes, 0);
            }
        }
        if let Some(first) = queue.first() {
            prop_assert_eq!(first.estimated_wait_minutes, 0);
        }
    }

    #[test]
    fn waiting_time_is_never_negative(check_in in 0i64..600, checkout in 0i64..600) {
        let clock = FixedClock::new();
        let visit = Visit::new("a", "dr-lee");
        let entry = WaitingQueueEntry::new(
            &visit.appointment,
            &visit.patient,
            &visit.provider,
            Priority::Normal,
            clock.at(check_in),
        );

        let record = WaitingRoomHistoryRecord::complete(entry, clock.at(checkout));
        prop_assert_eq!(i64::from(record.waiting_time_minutes), (checkout - check_in).max(0));
    }

    #[test]
    fn generated_slots_stay_in_bounds(
        offset in 0i64..365,
        span in 0i64..21,
        start_minute in 0u32..(12 * 60),
        length in 1u32..(8 * 60),
        duration in 5u32..120,
        include_weekends in any::<bool>(),
    ) {
        let start_date = date(2024, 1, 1) + Duration::days(offset);
        let daily_start = time(start_minute / 60, start_minute % 60);
        let end_minute = start_minute + length;
        let daily_end = time(end_minute / 60, end_minute % 60);
        let request = SlotGenerationRequest {
            provider_id: "dr-lee".to_string(),
            start_date,
            end_date: start_date + Duration::days(span),
            daily_start,
            daily_end,
            slot_duration_minutes: duration,
            include_weekends,
        };

        let slots = request.candidates();
        let ids: HashSet<_> = slots.iter().map(|s| s.id.clone()).collect();
        prop_assert_eq!(ids.len(), slots.len());

        for slot in &slots {
            prop_assert!(slot.start_time >= daily_start);
            prop_assert!(slot.end_time <= daily_end);
            prop_assert!(slot.start_time < slot.end_time);
            if !include_weekends {
                prop_assert!(!matches!(slot.date.weekday(), Weekday::Sat | Weekday::Sun));
            }
        }

        // Same request, same slots
        prop_assert_eq!(request.candidates(), slots);
    }

    #[test]
    fn unavailability_add_then_remove_restores_slots(
        day in 0i64..5,
        start_minute in (9 * 60)..(16 * 60u32),
        length in 15u32..240,
        book_first in any::<bool>(),
    ) {
        let mut resolver = resolver();
        let monday = date(2024, 6, 10);
        resolver
            .generate_slots(&SlotGenerationRequest {
                provider_id: "dr-lee".to_string(),
                start_date: monday,
                end_date: monday + Duration::days(4),
                daily_start: time(9, 0),
                daily_end: time(17, 0),
                slot_duration_minutes: 30,
                include_weekends: false,
            })
            .unwrap();
        if book_first {
            resolver.book_slot("dr-lee-20240610-0900", false).unwrap();
        }
        let before = resolver.slots_for("dr-lee");

        let end_minute = (start_minute + length).min(23 * 60);
        let period = UnavailabilityPeriod::new(
            "dr-lee",
            monday + Duration::days(day),
            monday + Duration::days(day),
            TimeWindow::Timed {
                start: time(start_minute / 60, start_minute % 60),
                end: time(end_minute / 60, end_minute % 60),
            },
            "Blocked",
        );
        let period = resolver.add_unavailability(period).unwrap();

        // Booked slots are never touched
        for slot in resolver.slots_for("dr-lee").iter().filter(|s| s.is_booked) {
            let original = before.iter().find(|s| s.id == slot.id).unwrap();
            prop_assert_eq!(slot, original);
        }

        prop_assert!(resolver.remove_unavailability(&period.id));
        prop_assert_eq!(resolver.slots_for("dr-lee"), before);
        prop_assert!(!resolver.remove_unavailability(&period.id));
    }
}
