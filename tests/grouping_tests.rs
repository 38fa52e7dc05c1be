use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use sharetask::grouping::{agenda, compare_tasks, group_by_letter, group_by_weekday, sort_tasks, MAX_WINDOW_DAYS, OTHER_BUCKET};
use sharetask::models::Task;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(id: &str, name: &str, date: NaiveDate, time: &str, completed: bool) -> Task {
    let time = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
    Task {
        id: id.into(),
        name: name.into(),
        completed,
        list_id: None,
        date,
        time,
        deadline: date.and_time(time),
        notes: String::new(),
        last_updated: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        user_id: "u1".into(),
    }
}

fn names<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a str> {
    tasks.into_iter().map(|t| t.name.as_str()).collect()
}

#[test]
fn test_incomplete_before_completed() {
    let monday = day(2024, 3, 4);
    let done = task("1", "Alpha", monday, "08:00", true);
    let open = task("2", "Zulu", day(2024, 3, 9), "23:00", false);
    assert_eq!(compare_tasks(&open, &done), std::cmp::Ordering::Less);
}

#[test]
fn test_sort_by_date_then_time_then_name() {
    let mut tasks = vec![
        task("1", "b", day(2024, 3, 5), "09:00", false),
        task("2", "a", day(2024, 3, 5), "09:00", false),
        task("3", "late", day(2024, 3, 4), "18:30", false),
        task("4", "early", day(2024, 3, 4), "07:05", false),
        task("5", "first but done", day(2024, 3, 1), "00:00", true),
    ];
    sort_tasks(&mut tasks);
    assert_eq!(names(&tasks), vec!["early", "late", "a", "b", "first but done"]);
}

#[test]
fn test_time_compared_by_minutes_only() {
    let monday = day(2024, 3, 4);
    let mut a = task("1", "b", monday, "10:15", false);
    a.time = NaiveTime::from_hms_opt(10, 15, 59).unwrap();
    let b = task("2", "a", monday, "10:15", false);
    // Same minute, so the name decides.
    assert_eq!(compare_tasks(&b, &a), std::cmp::Ordering::Less);
}

#[test]
fn test_group_by_letter_buckets() {
    let d = day(2024, 3, 4);
    let tasks = vec![
        task("1", "banana", d, "09:00", false),
        task("2", "Apple", d, "09:00", false),
        task("3", "42 things", d, "09:00", false),
        task("4", "avocado", d, "09:00", false),
        task("5", "Échalote", d, "09:00", false),
        task("6", "_hidden", d, "09:00", false),
    ];
    let groups = group_by_letter(&tasks);
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "B", OTHER_BUCKET]);
    assert_eq!(names(groups[0].tasks.iter().copied()), vec!["Apple", "avocado"]);
    assert_eq!(groups[2].tasks.len(), 3);
    assert!(groups[2]
        .tasks
        .iter()
        .all(|t| !t.name.starts_with(|c: char| c.is_ascii_alphabetic())));
}

#[test]
fn test_group_by_letter_empty() {
    let tasks: Vec<Task> = Vec::new();
    assert!(group_by_letter(&tasks).is_empty());
}

#[test]
fn test_group_by_weekday_labels_and_window() {
    let monday = day(2024, 3, 4);
    let tasks = vec![
        task("1", "today", monday, "09:00", false),
        task("2", "wednesday", day(2024, 3, 6), "09:00", false),
        task("3", "sunday", day(2024, 3, 10), "09:00", false),
        task("4", "next monday", day(2024, 3, 11), "09:00", false),
        task("5", "yesterday", day(2024, 3, 3), "09:00", false),
    ];
    let groups = group_by_weekday(&tasks, monday, 7);
    assert_eq!(groups.len(), 7);
    assert_eq!(groups[0].label, "Today, Monday");
    assert_eq!(groups[1].label, "Tuesday");
    assert_eq!(groups[6].label, "Sunday");

    assert_eq!(names(groups[0].tasks.iter().copied()), vec!["today"]);
    assert!(groups[1].tasks.is_empty());
    assert_eq!(names(groups[2].tasks.iter().copied()), vec!["wednesday"]);
    assert_eq!(names(groups[6].tasks.iter().copied()), vec!["sunday"]);

    let total: usize = groups.iter().map(|g| g.tasks.len()).sum();
    assert_eq!(total, 3);
}

#[test]
fn test_group_by_weekday_first_bucket_is_today_even_when_empty() {
    let friday = day(2024, 3, 8);
    let tasks = vec![task("1", "saturday", day(2024, 3, 9), "09:00", false)];
    let groups = group_by_weekday(&tasks, friday, 7);
    assert_eq!(groups[0].label, "Today, Friday");
    assert!(groups[0].tasks.is_empty());
    assert_eq!(groups[1].label, "Saturday");
    assert_eq!(groups[1].tasks.len(), 1);
}

#[test]
fn test_group_by_weekday_orders_within_day() {
    let monday = day(2024, 3, 4);
    let tasks = vec![
        task("1", "done", monday, "06:00", true),
        task("2", "noon", monday, "12:00", false),
        task("3", "morning", monday, "08:00", false),
    ];
    let groups = group_by_weekday(&tasks, monday, 7);
    assert_eq!(names(groups[0].tasks.iter().copied()), vec!["morning", "noon", "done"]);
}

#[test]
fn test_agenda_sections() {
    let tasks = vec![
        task("a", "Lunch", day(2024, 3, 5), "12:30", false),
        task("b", "Standup", day(2024, 3, 4), "09:00", false),
        task("c", "Breakfast", day(2024, 3, 5), "07:45", true),
    ];
    let sections = agenda(&tasks);
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "2024-03-04");
    assert_eq!(sections[0].events[0].title, "Standup");
    assert_eq!(sections[1].title, "2024-03-05");
    let hours: Vec<&str> = sections[1].events.iter().map(|e| e.hour.as_str()).collect();
    assert_eq!(hours, vec!["07:45", "12:30"]);
    assert_eq!(sections[1].events[0].id, "c");
}

#[test]
fn test_weekday_window_is_capped() {
    let today = day(2024, 3, 4);
    let far = task("f", "Far", day(2025, 3, 1), "09:00", false);
    let groups = group_by_weekday([&far], today, 1_000_000_000);
    assert_eq!(groups.len(), MAX_WINDOW_DAYS as usize);
    assert_eq!(groups[0].label, "Today, Monday");
    assert_eq!(groups[362].tasks.len(), 1);

    assert_eq!(group_by_weekday(Vec::<&Task>::new(), today, 0).len(), 1);
    assert_eq!(group_by_weekday(Vec::<&Task>::new(), NaiveDate::MAX, 7).len(), 1);
}
