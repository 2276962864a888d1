//! Output formatting for CLI commands
//!
//! Lists render as aligned plain-text tables, single entities as
//! `Label: value` blocks. Both have a JSON form built from the entities'
//! field mappings.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use taskboard_shared::models::{Project, Task, User};

/// Timestamp as shown to people: date and time to the minute
pub fn format_minute(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn format_optional_id<T: ToString>(id: Option<T>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

fn pad_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Aligns `rows` under `headers`, two spaces between columns
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut output = pad_line(headers, &widths);
    output.push_str(&pad_line(&separator, &widths));
    for row in rows {
        output.push_str(&pad_line(row, &widths));
    }
    output
}

/// Format users as a table
pub fn format_users_table(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found\n".to_string();
    }

    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|user| {
            vec![
                format_optional_id(user.id()),
                user.username().to_string(),
                user.email().to_string(),
                user.role().to_string(),
                format_minute(&user.registration_date()),
            ]
        })
        .collect();

    table(&["ID", "USERNAME", "EMAIL", "ROLE", "REGISTERED"], &rows)
}

/// Format projects as a table
pub fn format_projects_table(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects found\n".to_string();
    }

    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|project| {
            vec![
                format_optional_id(project.id()),
                project.name().to_string(),
                format_minute(&project.start_date()),
                format_minute(&project.end_date()),
                project.status().to_string(),
            ]
        })
        .collect();

    table(&["ID", "NAME", "START", "END", "STATUS"], &rows)
}

/// Format tasks as a table, flagging those overdue at `now`
pub fn format_tasks_table(tasks: &[Task], now: DateTime<Utc>) -> String {
    if tasks.is_empty() {
        return "No tasks found\n".to_string();
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| {
            let mut due = format_minute(&task.due_date());
            if task.is_overdue_at(now) {
                due.push_str(" (overdue)");
            }
            vec![
                format_optional_id(task.id()),
                task.title().to_string(),
                task.priority().to_string(),
                task.status().to_string(),
                due,
                format_optional_id(task.project_id()),
                format_optional_id(task.assignee_id()),
            ]
        })
        .collect();

    table(
        &["ID", "TITLE", "PRIORITY", "STATUS", "DUE", "PROJECT", "ASSIGNEE"],
        &rows,
    )
}

/// Format a single user
pub fn format_user(user: &User) -> String {
    let mut output = String::new();
    output.push_str(&format!("ID:          {}\n", format_optional_id(user.id())));
    output.push_str(&format!("Username:    {}\n", user.username()));
    output.push_str(&format!("Email:       {}\n", user.email()));
    output.push_str(&format!("Role:        {}\n", user.role()));
    output.push_str(&format!(
        "Registered:  {}\n",
        format_minute(&user.registration_date())
    ));
    output
}

/// Format a single project with its progress, if known
pub fn format_project(project: &Project, progress: Option<f64>) -> String {
    let mut output = String::new();
    output.push_str(&format!("ID:          {}\n", format_optional_id(project.id())));
    output.push_str(&format!("Name:        {}\n", project.name()));
    if !project.description().is_empty() {
        output.push_str(&format!("Description: {}\n", project.description()));
    }
    output.push_str(&format!("Start:       {}\n", format_minute(&project.start_date())));
    output.push_str(&format!("End:         {}\n", format_minute(&project.end_date())));
    output.push_str(&format!("Status:      {}\n", project.status()));
    if let Some(progress) = progress {
        output.push_str(&format!("Progress:    {}\n", format_progress(progress)));
    }
    output
}

/// Format a single task
pub fn format_task(task: &Task, now: DateTime<Utc>) -> String {
    let mut output = String::new();
    output.push_str(&format!("ID:          {}\n", format_optional_id(task.id())));
    output.push_str(&format!("Title:       {}\n", task.title()));
    if !task.description().is_empty() {
        output.push_str(&format!("Description: {}\n", task.description()));
    }
    output.push_str(&format!("Priority:    {}\n", task.priority()));
    output.push_str(&format!("Status:      {}\n", task.status()));
    output.push_str(&format!("Due:         {}\n", format_minute(&task.due_date())));
    output.push_str(&format!("Overdue:     {}\n", if task.is_overdue_at(now) { "yes" } else { "no" }));
    output.push_str(&format!("Project:     {}\n", format_optional_id(task.project_id())));
    output.push_str(&format!("Assignee:    {}\n", format_optional_id(task.assignee_id())));
    output
}

/// Percentage with at most one decimal
pub fn format_progress(progress: f64) -> String {
    let rounded = (progress * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded:.1}%")
    }
}

/// Format field mappings as a pretty JSON array
pub fn format_json<I>(maps: I) -> serde_json::Result<String>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let values: Vec<Value> = maps.into_iter().map(Value::Object).collect();
    serde_json::to_string_pretty(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn task(title: &str, due: &str) -> Task {
        Task::new(title, "", 2, due, None, None).unwrap()
    }

    #[test]
    fn test_format_minute_drops_seconds() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 59).unwrap();
        assert_eq!(format_minute(&ts), "2024-03-09 07:05");
    }

    #[test]
    fn test_table_alignment() {
        let output = table(
            &["ID", "NAME"],
            &[
                vec!["1".to_string(), "short".to_string()],
                vec!["10".to_string(), "a longer name".to_string()],
            ],
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "ID  NAME");
        assert_eq!(lines[1], "--  -------------");
        assert_eq!(lines[2], "1   short");
        assert_eq!(lines[3], "10  a longer name");
    }

    #[test]
    fn test_tasks_table_flags_overdue() {
        let output = format_tasks_table(
            &[task("late", "2024-05-01 09:30"), task("later", "2024-07-01")],
            now(),
        );

        assert!(output.contains("2024-05-01 09:30 (overdue)"));
        assert!(output.contains("2024-07-01 00:00"));
        assert_eq!(output.matches("(overdue)").count(), 1);
        assert!(output.starts_with("ID"));
    }

    #[test]
    fn test_completed_task_is_not_flagged() {
        let mut done = task("done", "2024-05-01");
        done.update_status("completed").unwrap();

        let output = format_tasks_table(&[done.clone()], now());
        assert!(!output.contains("overdue"));
        assert!(format_task(&done, now()).contains("Overdue:     no"));
    }

    #[test]
    fn test_empty_tables() {
        assert_eq!(format_users_table(&[]), "No users found\n");
        assert_eq!(format_projects_table(&[]), "No projects found\n");
        assert_eq!(format_tasks_table(&[], now()), "No tasks found\n");
    }

    #[test]
    fn test_format_user() {
        let user = User::new("alice", "alice@example.com", "admin").unwrap();
        let output = format_user(&user);
        assert!(output.contains("ID:          -\n"));
        assert!(output.contains("Username:    alice\n"));
        assert!(output.contains("Role:        admin\n"));
    }

    #[test]
    fn test_format_project_with_progress() {
        let project = Project::new("Launch", "Go live", "2024-01-01", "2024-12-31").unwrap();
        let output = format_project(&project, Some(100.0 / 3.0));
        assert!(output.contains("Description: Go live\n"));
        assert!(output.contains("Progress:    33.3%\n"));
        assert!(!format_project(&project, None).contains("Progress"));
    }

    #[test]
    fn test_format_progress() {
        assert_eq!(format_progress(50.0), "50%");
        assert_eq!(format_progress(66.666), "66.7%");
        assert_eq!(format_progress(0.0), "0%");
    }

    #[test]
    fn test_format_json() {
        let output = format_json([task("a", "2024-01-01").to_map()]).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["title"], "a");
        assert_eq!(value[0]["due_date"], "2024-01-01T00:00:00");
        assert_eq!(value[0]["id"], Value::Null);
    }
}
