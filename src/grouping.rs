use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};

use crate::models::Task;

/// Label used for tasks whose name does not start with a latin letter.
pub const OTHER_BUCKET: &str = "#";

/// Longest day window the weekday view will build.
pub const MAX_WINDOW_DAYS: i64 = 366;

/// A labelled run of tasks, as shown under a section header.
#[derive(Debug, Clone)]
pub struct TaskGroup<'a> {
    pub label: String,
    pub tasks: Vec<&'a Task>,
}

/// One calendar entry of the agenda view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaEvent {
    pub id: String,
    pub title: String,
    /// `HH:MM`
    pub hour: String,
}

/// All agenda entries for a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaSection {
    /// `YYYY-MM-DD`
    pub title: String,
    pub events: Vec<AgendaEvent>,
}

/// Case-insensitive name order, ties broken by exact bytes.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Orders incomplete before completed, then by date, time of day and name.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.date.cmp(&b.date))
        .then_with(|| a.minute_of_day().cmp(&b.minute_of_day()))
        .then_with(|| compare_names(&a.name, &b.name))
}

pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

fn letter_of(name: &str) -> Option<char> {
    let first = name.chars().next()?.to_ascii_uppercase();
    first.is_ascii_uppercase().then_some(first)
}

/// Buckets tasks by the first letter of their name, `A` to `Z`, with
/// everything else under [`OTHER_BUCKET`] at the end.
pub fn group_by_letter<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<TaskGroup<'a>> {
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by(|a, b| compare_names(&a.name, &b.name));

    let mut letters: Vec<TaskGroup<'a>> = Vec::new();
    let mut other: Vec<&Task> = Vec::new();
    for task in sorted {
        match letter_of(&task.name) {
            Some(c) => {
                let label = c.to_string();
                match letters.last_mut() {
                    Some(group) if group.label == label => group.tasks.push(task),
                    _ => letters.push(TaskGroup { label, tasks: vec![task] }),
                }
            }
            None => other.push(task),
        }
    }
    if !other.is_empty() {
        letters.push(TaskGroup { label: OTHER_BUCKET.to_string(), tasks: other });
    }
    letters
}

/// Buckets tasks into the `window_days` days starting at `today`. The window
/// is clamped to `1..=MAX_WINDOW_DAYS` and stops at the last representable date.
///
/// Every day of the window gets a group, even an empty one, so the first
/// group is always today's and is labelled `Today, <Weekday>`. Tasks dated
/// outside the window are left out.
pub fn group_by_weekday<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    today: NaiveDate,
    window_days: i64,
) -> Vec<TaskGroup<'a>> {
    let days = window_days.clamp(1, MAX_WINDOW_DAYS);
    let mut groups: Vec<TaskGroup<'a>> = (0..days)
        .map_while(|offset| today.checked_add_signed(Duration::days(offset)).map(|day| (offset, day)))
        .map(|(offset, day)| {
            let weekday = day.format("%A").to_string();
            let label = if offset == 0 { format!("Today, {weekday}") } else { weekday };
            TaskGroup { label, tasks: Vec::new() }
        })
        .collect();

    for task in tasks {
        let offset = (task.date - today).num_days();
        if (0..groups.len() as i64).contains(&offset) {
            groups[offset as usize].tasks.push(task);
        }
    }
    for group in &mut groups {
        group.tasks.sort_by(|a, b| compare_tasks(a, b));
    }
    groups
}

/// Calendar agenda: one section per date, entries ordered by time.
pub fn agenda<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<AgendaSection> {
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.minute_of_day().cmp(&b.minute_of_day()))
            .then_with(|| compare_names(&a.name, &b.name))
    });

    let mut sections: Vec<AgendaSection> = Vec::new();
    for task in sorted {
        let title = task.date.format("%Y-%m-%d").to_string();
        let event = AgendaEvent {
            id: task.id.clone(),
            title: task.name.clone(),
            hour: task.time.format("%H:%M").to_string(),
        };
        match sections.last_mut() {
            Some(section) if section.title == title => section.events.push(event),
            _ => sections.push(AgendaSection { title, events: vec![event] }),
        }
    }
    sections
}
