//! Derived task views: filtering, sorting and summary statistics.
//!
//! Everything here is a pure function of the task list and the current
//! selection, so callers can recompute a view whenever they need one.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use taskflow_proto::{Filters, Priority, ProjectId, SortOption, Status, Task};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Filters and sorts `tasks` for display.
///
/// Restricts to `selected_project` when set, applies the status, priority
/// and search filters, then stable-sorts by `sort_by`. Ties keep their
/// relative order from `tasks`.
#[must_use]
pub fn derive_view(
    tasks: &[Task],
    selected_project: Option<&ProjectId>,
    filters: &Filters,
    sort_by: SortOption,
) -> Vec<Task> {
    let needle = filters.search.to_lowercase();
    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|t| selected_project.is_none_or(|p| t.project_id == *p))
        .filter(|t| filters.status.matches(t.status))
        .filter(|t| filters.priority.matches(t.priority))
        .filter(|t| needle.is_empty() || matches_search(t, &needle))
        .cloned()
        .collect();

    match sort_by {
        SortOption::Priority => view.sort_by_key(|t| t.priority.rank()),
        SortOption::DueDate => view.sort_by_key(|t| t.due_date),
        SortOption::Status => view.sort_by_key(|t| t.status.rank()),
        SortOption::Title => view.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOption::CreatedAt => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    view
}

/// `needle` must already be lowercase.
fn matches_search(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle) || task.description.to_lowercase().contains(needle)
}

/// Task counts for a project (or for everything).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    /// Has an entry for every status, zero included.
    pub by_status: BTreeMap<Status, usize>,
    /// Has an entry for every priority, zero included.
    pub by_priority: BTreeMap<Priority, usize>,
}

impl TaskStats {
    /// Tasks in `concluída`.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.count_status(Status::Concluida)
    }

    /// Tasks started but not finished.
    #[must_use]
    pub fn in_progress(&self) -> usize {
        Status::ALL
            .into_iter()
            .filter(|s| s.is_in_progress())
            .map(|s| self.count_status(s))
            .sum()
    }

    /// Share of completed tasks as a whole percentage, rounded half up.
    #[must_use]
    pub fn completion_rate(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.completed() * 200 + self.total) / (self.total * 2)
    }

    #[must_use]
    pub fn count_status(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn count_priority(&self, priority: Priority) -> usize {
        self.by_priority.get(&priority).copied().unwrap_or(0)
    }
}

/// Counts tasks by status and priority, restricted to `selected_project`
/// when set. Search and status/priority filters do not apply.
#[must_use]
pub fn derive_stats(tasks: &[Task], selected_project: Option<&ProjectId>) -> TaskStats {
    let mut by_status: BTreeMap<Status, usize> = Status::ALL.into_iter().map(|s| (s, 0)).collect();
    let mut by_priority: BTreeMap<Priority, usize> =
        Priority::ALL.into_iter().map(|p| (p, 0)).collect();
    let mut total = 0;

    for task in tasks
        .iter()
        .filter(|t| selected_project.is_none_or(|p| t.project_id == *p))
    {
        total += 1;
        *by_status.entry(task.status).or_insert(0) += 1;
        *by_priority.entry(task.priority).or_insert(0) += 1;
    }

    TaskStats {
        total,
        by_status,
        by_priority,
    }
}

/// Orders titles the way a Portuguese reader expects.
///
/// Titles are compared in canonical decomposition, so precomposed and
/// combining-mark spellings sort together. Letters are compared ignoring
/// accents and case first; remaining ties are broken by accents (unaccented
/// first) and then by case (lowercase first).
#[must_use]
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let (ka, kb) = (collation_key(a), collation_key(b));
    ka.base
        .cmp(&kb.base)
        .then_with(|| ka.accents.cmp(&kb.accents))
        .then_with(|| ka.case.cmp(&kb.case))
}

struct CollationKey {
    base: Vec<char>,
    /// Mark weights attached to each base letter.
    accents: Vec<Vec<u32>>,
    case: Vec<bool>,
}

impl CollationKey {
    fn push(&mut self, base: char, accent: Option<u32>, upper: bool) {
        self.base.push(base);
        self.accents.push(accent.into_iter().collect());
        self.case.push(upper);
    }
}

fn collation_key(s: &str) -> CollationKey {
    let mut key = CollationKey {
        base: Vec::with_capacity(s.len()),
        accents: Vec::with_capacity(s.len()),
        case: Vec::with_capacity(s.len()),
    };
    for c in s.nfd() {
        if is_combining_mark(c) {
            if let Some(marks) = key.accents.last_mut() {
                marks.push(mark_weight(c));
                continue;
            }
        }
        let upper = c.is_uppercase();
        for lower in c.to_lowercase() {
            match fold_letter(lower) {
                Some((letters, weight)) => {
                    let mut letters = letters.chars();
                    if let Some(first) = letters.next() {
                        key.push(first, Some(weight), upper);
                    }
                    for rest in letters {
                        key.push(rest, None, upper);
                    }
                }
                None => key.push(lower, None, upper),
            }
        }
    }
    key
}

/// Secondary weight of a combining mark, in the usual European order.
fn mark_weight(mark: char) -> u32 {
    match mark {
        '\u{301}' => 1,  // acute
        '\u{300}' => 2,  // grave
        '\u{306}' => 3,  // breve
        '\u{302}' => 4,  // circumflex
        '\u{30C}' => 5,  // caron
        '\u{30A}' => 6,  // ring
        '\u{308}' => 7,  // diaeresis
        '\u{30B}' => 8,  // double acute
        '\u{303}' => 9,  // tilde
        '\u{307}' => 10, // dot above
        '\u{327}' => 11, // cedilla
        '\u{328}' => 12, // ogonek
        '\u{304}' => 13, // macron
        other => 0x100 + u32::from(other),
    }
}

/// Lowercase letters with no canonical decomposition, folded to the base
/// letters they sort with and a secondary weight.
const fn fold_letter(c: char) -> Option<(&'static str, u32)> {
    match c {
        'ø' => Some(("o", 20)),
        'đ' => Some(("d", 20)),
        'ł' => Some(("l", 20)),
        'ħ' => Some(("h", 20)),
        'ı' => Some(("i", 21)),
        'æ' => Some(("ae", 30)),
        'œ' => Some(("oe", 30)),
        'ß' => Some(("ss", 30)),
        'þ' => Some(("th", 30)),
        _ => None,
    }
}
