//! Performance benchmarks for wait time recomputation and slot generation

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use frontdesk::config::StorageKeys;
use frontdesk::slots::{SlotConflictPolicy, SlotGenerationRequest, TimeSlotResolver};
use frontdesk::storage::InMemoryStore;
use frontdesk::types::{Appointment, Patient, Priority, Provider, QueueStatus};
use frontdesk::waiting_room::{recompute_wait_times, LinearWaitTimeEstimator, WaitingQueueEntry};
use std::sync::Arc;

fn create_bench_queue(size: usize, providers: usize) -> Vec<WaitingQueueEntry> {
    let start = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();

    (0..size)
        .map(|i| {
            let provider_id = format!("dr-{}", i % providers);
            let mut entry = WaitingQueueEntry::new(
                &Appointment {
                    id: format!("appt-{}", i),
                    patient_id: format!("pat-{}", i),
                    provider_id: provider_id.clone(),
                },
                &Patient {
                    id: format!("pat-{}", i),
                    name: format!("Patient {}", i),
                },
                &Provider {
                    id: provider_id.clone(),
                    name: provider_id,
                },
                match i % 7 {
                    0 => Priority::Urgent,
                    1 | 2 => Priority::Low,
                    _ => Priority::Normal,
                },
                start + Duration::seconds((size - i) as i64 * 17),
            );
            if i % 11 == 0 {
                entry.status = QueueStatus::InProgress;
            }
            entry
        })
        .collect()
}

fn bench_recompute_wait_times(c: &mut Criterion) {
    let estimator = LinearWaitTimeEstimator::default();
    let mut group = c.benchmark_group("recompute_wait_times");

    for size in [10usize, 100, 1_000, 10_000] {
        let queue = create_bench_queue(size, 8);
        group.bench_with_input(BenchmarkId::from_parameter(size), &queue, |b, queue| {
            b.iter(|| black_box(recompute_wait_times(queue.clone(), &estimator)))
        });
    }

    group.finish();
}

fn bench_generate_slots(c: &mut Criterion) {
    let request = SlotGenerationRequest {
        provider_id: "dr-bench".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 8, 30).unwrap(),
        daily_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        daily_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        slot_duration_minutes: 15,
        include_weekends: false,
    };

    c.bench_function("generate_slots_quarter_year", |b| {
        b.iter(|| {
            let mut resolver = TimeSlotResolver::new(
                Arc::new(InMemoryStore::new()),
                StorageKeys::default(),
                SlotConflictPolicy::Flag,
            )
            .unwrap();
            black_box(resolver.generate_slots(&request))
        })
    });
}

criterion_group!(benches, bench_recompute_wait_times, bench_generate_slots);
criterion_main!(benches);
