///! Some utility functions

use crate::cache::TaskStore;
use crate::task::Task;

/// Shown in place of a task list that has nothing to show
pub const NO_TASKS_MESSAGE: &str = "No tasks found";

/// Pretty-prints the calendars and the tasks of a store, as filtered by the current selection
pub fn print_calendar_list(store: &TaskStore) {
    for cal in store.calendars() {
        let selected = if store.selected_calendar() == Some(cal.url()) { "*" } else { " " };
        println!("{}CAL {} ({})", selected, cal.name(), cal.url());
    }

    let tasks = store.filtered();
    if tasks.is_empty() {
        println!("    {}", NO_TASKS_MESSAGE);
        return;
    }
    for task in tasks {
        print_task(task);
    }
}

pub fn print_task(task: &Task) {
    println!("    {}", task_line(task));
}

/// A one-line description of a task, e.g. `✓ Buy milk (due 15.01.2024)\t<uid>`
pub fn task_line(task: &Task) -> String {
    let completion = if task.completed() { "✓" } else { " " };
    match task.due_display() {
        Some(due) => format!("{} {} (due {})\t{}", completion, task.summary(), due, task.uid()),
        None => format!("{} {}\t{}", completion, task.summary(), task.uid()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::CompletionStatus;

    #[test]
    fn test_task_line() {
        let cal = "https://dav.example.com/cal/".parse().unwrap();
        let task = Task::new_with_parameters(
            "uid-1".to_string(), "Buy milk".to_string(), CompletionStatus::Completed(None),
            Some("VALUE=DATE:20240115".to_string()), "/cal/uid-1.ics".to_string(), cal, None,
            String::new(), String::new(),
        );
        assert_eq!(task_line(&task), "✓ Buy milk (due 15.01.2024)\tuid-1");
    }
}
