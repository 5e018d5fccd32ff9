//! Property-based tests for view derivation.
//!
//! Uses proptest to verify:
//! 1. `derive_view` is idempotent for every filter and sort combination.
//! 2. Priority sort puts more severe tasks first; createdAt sort is newest first.
//! 3. Stats totals match the task count and every breakdown sums to the total.
//! 4. Every task in a view passes the active filters.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use proptest::prelude::*;
use taskflow::view::{derive_stats, derive_view};
use taskflow_proto::{
    Filters, Priority, PriorityFilter, ProjectId, SortOption, Status, StatusFilter, Task, TaskId,
    UserId,
};
use uuid::Uuid;

// --- Strategies for domain types ---

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn arb_sort() -> impl Strategy<Value = SortOption> {
    prop::sample::select(SortOption::ALL.to_vec())
}

/// One of three fixed projects, so selections hit something.
fn arb_project() -> impl Strategy<Value = ProjectId> {
    (1u128..=3).prop_map(|n| ProjectId::from_uuid(Uuid::from_u128(n)))
}

fn arb_created_at() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..10_000).prop_map(|minutes| {
        DateTime::<Utc>::from_timestamp(1_740_000_000, 0).unwrap() + TimeDelta::minutes(minutes)
    })
}

fn arb_task() -> impl Strategy<Value = Task> {
    (
        "[a-zA-Záéçõ ]{1,12}",
        "[a-z ]{0,16}",
        arb_priority(),
        arb_status(),
        0u32..60,
        arb_project(),
        arb_created_at(),
    )
        .prop_map(
            |(title, description, priority, status, due_offset, project_id, created_at)| Task {
                id: TaskId::new(),
                title,
                description,
                priority,
                status,
                due_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
                    + TimeDelta::days(i64::from(due_offset)),
                project_id,
                created_at,
                created_by: UserId::new(),
                assigned_to: None,
            },
        )
}

fn arb_filters() -> impl Strategy<Value = Filters> {
    (
        prop::option::of(arb_status()),
        prop::option::of(arb_priority()),
        prop::option::of("[a-zA-Z]{1,3}"),
    )
        .prop_map(|(status, priority, search)| Filters {
            status: status.map_or(StatusFilter::All, StatusFilter::Only),
            priority: priority.map_or(PriorityFilter::All, PriorityFilter::Only),
            search: search.unwrap_or_default(),
        })
}

proptest! {
    #[test]
    fn derive_view_is_idempotent(
        tasks in prop::collection::vec(arb_task(), 0..40),
        selected in prop::option::of(arb_project()),
        filters in arb_filters(),
        sort in arb_sort(),
    ) {
        let once = derive_view(&tasks, selected.as_ref(), &filters, sort);
        let twice = derive_view(&once, selected.as_ref(), &filters, sort);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn priority_sort_is_by_rank(tasks in prop::collection::vec(arb_task(), 0..40)) {
        let view = derive_view(&tasks, None, &Filters::default(), SortOption::Priority);
        prop_assert_eq!(view.len(), tasks.len());
        prop_assert!(view.windows(2).all(|w| w[0].priority.rank() <= w[1].priority.rank()));
    }

    #[test]
    fn created_at_sort_is_newest_first(tasks in prop::collection::vec(arb_task(), 0..40)) {
        let view = derive_view(&tasks, None, &Filters::default(), SortOption::CreatedAt);
        prop_assert!(view.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn stats_sum_to_total(
        tasks in prop::collection::vec(arb_task(), 0..40),
        selected in prop::option::of(arb_project()),
    ) {
        let all = derive_stats(&tasks, None);
        prop_assert_eq!(all.total, tasks.len());

        let stats = derive_stats(&tasks, selected.as_ref());
        prop_assert_eq!(stats.by_status.values().sum::<usize>(), stats.total);
        prop_assert_eq!(stats.by_priority.values().sum::<usize>(), stats.total);
        prop_assert_eq!(stats.by_status.len(), Status::ALL.len());
        prop_assert_eq!(stats.by_priority.len(), Priority::ALL.len());
        prop_assert!(stats.completion_rate() <= 100);
    }

    #[test]
    fn view_respects_filters(
        tasks in prop::collection::vec(arb_task(), 0..40),
        selected in prop::option::of(arb_project()),
        filters in arb_filters(),
        sort in arb_sort(),
    ) {
        let view = derive_view(&tasks, selected.as_ref(), &filters, sort);
        let needle = filters.search.to_lowercase();
        for task in &view {
            prop_assert!(selected.as_ref().is_none_or(|p| task.project_id == *p));
            prop_assert!(filters.status.matches(task.status));
            prop_assert!(filters.priority.matches(task.priority));
            prop_assert!(
                task.title.to_lowercase().contains(&needle)
                    || task.description.to_lowercase().contains(&needle)
            );
        }
        let expected = tasks
            .iter()
            .filter(|t| selected.as_ref().is_none_or(|p| t.project_id == *p))
            .filter(|t| filters.status.matches(t.status) && filters.priority.matches(t.priority))
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .count();
        prop_assert_eq!(view.len(), expected);
    }
}
