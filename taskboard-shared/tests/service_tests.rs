/// Integration tests for the entity services: progress, overdue tasks and
/// the flows a presentation layer drives
///
/// Run with: cargo test --test service_tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use taskboard_shared::models::{Priority, Project, ProjectId, Task, TaskStatus, User};
use taskboard_shared::progress::ProgressMode;
use taskboard_shared::services::{ProjectService, TaskFilter, TaskService, UserService};
use taskboard_shared::Store;

struct Services {
    users: UserService,
    projects: ProjectService,
    tasks: TaskService,
}

async fn services() -> Services {
    let store = Store::in_memory().await.expect("Failed to open store");
    Services {
        users: UserService::new(store.clone()),
        projects: ProjectService::new(store.clone()),
        tasks: TaskService::new(store),
    }
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

async fn progress(
    services: &Services,
    project: ProjectId,
    mode: ProgressMode,
    now: DateTime<Utc>,
) -> Option<f64> {
    services
        .projects
        .get_project_progress_with(project, mode, now)
        .await
        .unwrap()
}

async fn two_day_project(services: &Services) -> ProjectId {
    services
        .projects
        .add_project(Project::new("Sprint", "", at(1, 0), at(3, 0)).unwrap())
        .await
        .unwrap()
        .id()
        .unwrap()
}

#[tokio::test]
async fn test_progress_follows_completed_tasks() {
    let services = services().await;
    let project = two_day_project(&services).await;
    let midway = at(2, 0);

    let first = services
        .tasks
        .add_task(Task::new("a", "", 1, at(2, 12), Some(project), None).unwrap())
        .await
        .unwrap();
    let second = services
        .tasks
        .add_task(Task::new("b", "", 1, at(2, 12), Some(project), None).unwrap())
        .await
        .unwrap();

    assert_eq!(progress(&services, project, ProgressMode::Auto, midway).await, Some(0.0));

    services
        .tasks
        .update_task_status(first.id().unwrap(), "completed")
        .await
        .unwrap();
    assert_eq!(progress(&services, project, ProgressMode::Auto, midway).await, Some(50.0));

    services
        .tasks
        .update_task_status(second.id().unwrap(), "completed")
        .await
        .unwrap();
    assert_eq!(progress(&services, project, ProgressMode::Auto, midway).await, Some(100.0));

    assert_eq!(progress(&services, project, ProgressMode::Time, midway).await, Some(50.0));
}

#[tokio::test]
async fn test_progress_without_tasks_uses_time() {
    let services = services().await;
    let project = two_day_project(&services).await;

    assert_eq!(progress(&services, project, ProgressMode::Auto, at(1, 0) - Duration::hours(1)).await, Some(0.0));
    assert_eq!(progress(&services, project, ProgressMode::Auto, at(1, 12)).await, Some(25.0));
    assert_eq!(progress(&services, project, ProgressMode::Auto, at(3, 0)).await, Some(100.0));
    assert_eq!(progress(&services, project, ProgressMode::Tasks, at(1, 12)).await, Some(0.0));
}

#[tokio::test]
async fn test_deleted_project_has_no_progress() {
    let services = services().await;
    let project = two_day_project(&services).await;

    assert!(services.projects.delete_project(project).await.unwrap());
    assert!(!services.projects.delete_project(project).await.unwrap());
    assert_eq!(services.projects.get_project_progress(project).await.unwrap(), None);
}

#[tokio::test]
async fn test_overdue_task_until_completed() {
    let services = services().await;
    let past = Utc::now() - Duration::days(1);

    let late = services
        .tasks
        .add_task(Task::new("late", "", 2, past, None, None).unwrap())
        .await
        .unwrap();
    services
        .tasks
        .add_task(Task::new("future", "", 2, Utc::now() + Duration::days(30), None, None).unwrap())
        .await
        .unwrap();

    assert!(late.is_overdue());
    let overdue = services.tasks.get_overdue_tasks().await.unwrap();
    assert_eq!(overdue, vec![late.clone()]);

    let done = services
        .tasks
        .update_task_status(late.id().unwrap(), "completed")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status(), TaskStatus::Completed);
    assert!(!done.is_overdue());
    assert!(services.tasks.get_overdue_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_returns_tasks() {
    let services = services().await;
    let report = services
        .tasks
        .add_task(Task::new("Write report", "", 1, at(5, 0), None, None).unwrap())
        .await
        .unwrap();
    services
        .tasks
        .add_task(Task::new("Read book", "", 1, at(5, 0), None, None).unwrap())
        .await
        .unwrap();

    let found = services.tasks.search_tasks("rep").await.unwrap();
    assert_eq!(found, vec![report]);
}

#[tokio::test]
async fn test_filter_tasks_by_status_and_priority() {
    let services = services().await;
    for (title, priority) in [("a", 1), ("b", 3), ("c", 3)] {
        services
            .tasks
            .add_task(Task::new(title, "", priority, at(5, 0), None, None).unwrap())
            .await
            .unwrap();
    }
    let all = services.tasks.get_all_tasks().await.unwrap();
    services
        .tasks
        .update_task_status(all[2].id().unwrap(), "in_progress")
        .await
        .unwrap();

    let high = TaskFilter {
        status: None,
        priority: Some(Priority::new(3).unwrap()),
    };
    let titles = |tasks: Vec<Task>| tasks.iter().map(|t| t.title().to_string()).collect::<Vec<_>>();
    assert_eq!(titles(services.tasks.filter_tasks(&high).await.unwrap()), ["b", "c"]);

    let high_pending = TaskFilter {
        status: Some(TaskStatus::Pending),
        ..high
    };
    assert_eq!(titles(services.tasks.filter_tasks(&high_pending).await.unwrap()), ["b"]);

    assert_eq!(services.tasks.filter_tasks(&TaskFilter::default()).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_user_tasks_and_user_deletion() {
    let services = services().await;
    let user = services
        .users
        .add_user(User::new("dana", "dana@example.com", "developer").unwrap())
        .await
        .unwrap();
    let user_id = user.id().unwrap();

    let task = services
        .tasks
        .add_task(Task::new("fix bug", "", 1, at(5, 0), None, Some(user_id)).unwrap())
        .await
        .unwrap();

    assert_eq!(services.users.get_user_tasks(user_id).await.unwrap(), vec![task.clone()]);
    assert_eq!(services.tasks.get_tasks_by_user(user_id).await.unwrap().len(), 1);

    assert!(services.users.delete_user(user_id).await.unwrap());
    let orphan = services.tasks.get_task(task.id().unwrap()).await.unwrap().unwrap();
    assert_eq!(orphan.assignee_id(), None);
    assert!(services.users.get_user_tasks(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reconstructed_entities_compare_by_identity() {
    let services = services().await;
    let saved = services
        .users
        .add_user(User::new("eve", "eve@example.com", "admin").unwrap())
        .await
        .unwrap();
    let id = saved.id().unwrap();

    services
        .users
        .update_user_info(id, Some("evelyn"), None, None)
        .await
        .unwrap();

    let reloaded = services.users.get_user(id).await.unwrap().unwrap();
    assert_eq!(reloaded.username(), "evelyn");
    assert_eq!(reloaded, saved);
    assert!(reloaded == id);

    let unsaved = User::new("eve", "eve@example.com", "admin").unwrap();
    assert_ne!(unsaved, saved);
}
