//! Command line definition and dispatch
//!
//! `taskboard <entity> <action>`: every action maps onto one service call.
//! Output goes to the writer handed to [`run`], logs go to stderr.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::io::Write;

use taskboard_shared::db::fields::UpdateFields;
use taskboard_shared::models::{
    Priority, Project, ProjectChanges, ProjectId, Task, TaskChanges, TaskId, TaskStatus, User,
    UserId,
};
use taskboard_shared::progress::ProgressMode;
use taskboard_shared::services::{ProjectService, TaskFilter, TaskService, UserService};
use taskboard_shared::{timestamp, Store};

use crate::render;

#[derive(Debug, Parser)]
#[command(name = "taskboard")]
#[command(about = "Track users, projects and tasks")]
#[command(version)]
pub struct Cli {
    /// SQLite database URL
    #[arg(long, global = true, env = "TASKBOARD_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Register a user
    Add {
        username: String,
        email: String,
        /// admin, manager or developer
        #[arg(long, default_value = "developer")]
        role: String,
    },

    /// List all users
    List,

    /// Show one user
    Show { id: UserId },

    /// Change username, email or role
    Update {
        id: UserId,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },

    /// Delete a user; their tasks become unassigned
    Delete { id: UserId },

    /// List tasks assigned to a user
    Tasks { id: UserId },
}

#[derive(Debug, Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Start date, e.g. 2024-01-31 or "2024-01-31 09:00"
        #[arg(long)]
        start: String,
        /// End date, not before the start
        #[arg(long)]
        end: String,
    },

    /// List all projects
    List,

    /// Show one project with its progress
    Show { id: ProjectId },

    /// Change name, description or dates
    Update {
        id: ProjectId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },

    /// Set the status: active, completed or on_hold
    Status { id: ProjectId, status: String },

    /// Show progress in percent
    Progress {
        id: ProjectId,
        /// auto, tasks or time
        #[arg(long, default_value = "auto")]
        mode: ProgressMode,
    },

    /// List tasks of a project
    Tasks { id: ProjectId },

    /// Delete a project; its tasks are kept without a project
    Delete { id: ProjectId },
}

#[derive(Debug, Subcommand)]
pub enum TaskAction {
    /// Create a task
    Add(AddTaskArgs),

    /// List all tasks
    List,

    /// Show one task
    Show { id: TaskId },

    /// Change task fields
    Update(UpdateTaskArgs),

    /// Set the status: pending, in_progress or completed
    Status { id: TaskId, status: String },

    /// Delete a task
    Delete { id: TaskId },

    /// Find tasks whose title or description contains the text
    Search { query: String },

    /// List tasks past their due date and not completed
    Overdue,

    /// List tasks by status and/or priority
    Filter {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
    },
}

#[derive(Debug, Args)]
pub struct AddTaskArgs {
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// 1 (low) to 3 (high)
    #[arg(long, default_value_t = 1)]
    pub priority: i64,

    /// Due date, e.g. "2024-01-31 17:00"
    #[arg(long)]
    pub due: String,

    #[arg(long)]
    pub project: Option<ProjectId>,

    #[arg(long)]
    pub assignee: Option<UserId>,

    /// Initial status, pending if omitted
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateTaskArgs {
    pub id: TaskId,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub priority: Option<i64>,

    #[arg(long)]
    pub due: Option<String>,

    #[arg(long, conflicts_with = "clear_project")]
    pub project: Option<ProjectId>,

    /// Detach the task from its project
    #[arg(long)]
    pub clear_project: bool,

    #[arg(long, conflicts_with = "clear_assignee")]
    pub assignee: Option<UserId>,

    /// Unassign the task
    #[arg(long)]
    pub clear_assignee: bool,
}

impl UpdateTaskArgs {
    /// Validated change set for the store
    pub fn changes(&self) -> anyhow::Result<UpdateFields> {
        let project_id = if self.clear_project {
            Some(None)
        } else {
            self.project.map(Some)
        };
        let assignee_id = if self.clear_assignee {
            Some(None)
        } else {
            self.assignee.map(Some)
        };

        let changes = TaskChanges {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority.map(Priority::new).transpose()?,
            status: None,
            due_date: self.due.as_deref().map(timestamp::parse).transpose()?,
            project_id,
            assignee_id,
        };
        Ok(changes.into_fields())
    }
}

/// Services a command runs against
struct Services {
    users: UserService,
    projects: ProjectService,
    tasks: TaskService,
    json: bool,
}

/// Executes `command` against `store`, writing results to `out`
pub async fn run(command: Command, store: &Store, json: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let ctx = Services {
        users: UserService::new(store.clone()),
        projects: ProjectService::new(store.clone()),
        tasks: TaskService::new(store.clone()),
        json,
    };

    match command {
        Command::User { action } => run_user(&ctx, action, out).await,
        Command::Project { action } => run_project(&ctx, action, out).await,
        Command::Task { action } => run_task(&ctx, action, out).await,
    }
}

async fn run_user(ctx: &Services, action: UserAction, out: &mut dyn Write) -> anyhow::Result<()> {
    match action {
        UserAction::Add { username, email, role } => {
            let user = ctx.users.add_user(User::new(&username, &email, &role)?).await?;
            write_user(ctx, &user, out)
        }
        UserAction::List => {
            let users = ctx.users.get_all_users().await?;
            if ctx.json {
                writeln!(out, "{}", render::format_json(users.iter().map(User::to_map))?)?;
            } else {
                write!(out, "{}", render::format_users_table(&users))?;
            }
            Ok(())
        }
        UserAction::Show { id } => {
            let user = ctx.users.get_user(id).await?.with_context(|| format!("User {id} not found"))?;
            write_user(ctx, &user, out)
        }
        UserAction::Update { id, username, email, role } => {
            if username.is_none() && email.is_none() && role.is_none() {
                bail!("Nothing to update: pass --username, --email or --role");
            }
            let user = ctx
                .users
                .update_user_info(id, username.as_deref(), email.as_deref(), role.as_deref())
                .await?
                .with_context(|| format!("User {id} not found"))?;
            write_user(ctx, &user, out)
        }
        UserAction::Delete { id } => {
            if !ctx.users.delete_user(id).await? {
                bail!("User {id} not found");
            }
            writeln!(out, "Deleted user {id}")?;
            Ok(())
        }
        UserAction::Tasks { id } => {
            ctx.users.get_user(id).await?.with_context(|| format!("User {id} not found"))?;
            let tasks = ctx.users.get_user_tasks(id).await?;
            write_tasks(ctx, &tasks, out)
        }
    }
}

async fn run_project(ctx: &Services, action: ProjectAction, out: &mut dyn Write) -> anyhow::Result<()> {
    match action {
        ProjectAction::Add { name, description, start, end } => {
            let project = Project::new(&name, &description, start.as_str(), end.as_str())?;
            let project = ctx.projects.add_project(project).await?;
            write_project(ctx, &project, None, out)
        }
        ProjectAction::List => {
            let projects = ctx.projects.get_all_projects().await?;
            if ctx.json {
                writeln!(out, "{}", render::format_json(projects.iter().map(Project::to_map))?)?;
            } else {
                write!(out, "{}", render::format_projects_table(&projects))?;
            }
            Ok(())
        }
        ProjectAction::Show { id } => {
            let project = find_project(ctx, id).await?;
            let progress = ctx.projects.get_project_progress(id).await?;
            write_project(ctx, &project, progress, out)
        }
        ProjectAction::Update { id, name, description, start, end } => {
            let current = find_project(ctx, id).await?;

            let start_date = start.as_deref().map(timestamp::parse).transpose()?;
            let end_date = end.as_deref().map(timestamp::parse).transpose()?;
            // Re-check the date order against whichever bound is unchanged
            Project::new(
                current.name(),
                current.description(),
                start_date.unwrap_or(current.start_date()),
                end_date.unwrap_or(current.end_date()),
            )?;

            let changes = ProjectChanges {
                name,
                description,
                start_date,
                end_date,
                status: None,
            };
            let fields = changes.into_fields();
            if fields.is_empty() {
                bail!("Nothing to update: pass --name, --description, --start or --end");
            }
            ctx.projects.update_project(id, &fields).await?;

            let project = find_project(ctx, id).await?;
            write_project(ctx, &project, None, out)
        }
        ProjectAction::Status { id, status } => {
            let project = ctx
                .projects
                .update_project_status(id, &status)
                .await?
                .with_context(|| format!("Project {id} not found"))?;
            write_project(ctx, &project, None, out)
        }
        ProjectAction::Progress { id, mode } => {
            let progress = ctx
                .projects
                .get_project_progress_with(id, mode, timestamp::now())
                .await?
                .with_context(|| format!("Project {id} not found"))?;
            if ctx.json {
                writeln!(out, "{}", serde_json::json!({ "id": id, "progress": progress }))?;
            } else {
                writeln!(out, "{}", render::format_progress(progress))?;
            }
            Ok(())
        }
        ProjectAction::Tasks { id } => {
            find_project(ctx, id).await?;
            let tasks = ctx.projects.get_project_tasks(id).await?;
            write_tasks(ctx, &tasks, out)
        }
        ProjectAction::Delete { id } => {
            if !ctx.projects.delete_project(id).await? {
                bail!("Project {id} not found");
            }
            writeln!(out, "Deleted project {id}")?;
            Ok(())
        }
    }
}

async fn run_task(ctx: &Services, action: TaskAction, out: &mut dyn Write) -> anyhow::Result<()> {
    match action {
        TaskAction::Add(args) => {
            let mut task = Task::new(
                &args.title,
                &args.description,
                args.priority,
                args.due.as_str(),
                args.project,
                args.assignee,
            )?;
            if let Some(status) = &args.status {
                task.update_status(status)?;
            }
            let task = ctx.tasks.add_task(task).await?;
            write_task(ctx, &task, out)
        }
        TaskAction::List => {
            let tasks = ctx.tasks.get_all_tasks().await?;
            write_tasks(ctx, &tasks, out)
        }
        TaskAction::Show { id } => {
            let task = find_task(ctx, id).await?;
            write_task(ctx, &task, out)
        }
        TaskAction::Update(args) => {
            let fields = args.changes()?;
            if fields.is_empty() {
                bail!("Nothing to update: pass at least one field option");
            }
            if ctx.tasks.update_task(args.id, &fields).await? == 0 {
                bail!("Task {} not found", args.id);
            }
            let task = find_task(ctx, args.id).await?;
            write_task(ctx, &task, out)
        }
        TaskAction::Status { id, status } => {
            let task = ctx
                .tasks
                .update_task_status(id, &status)
                .await?
                .with_context(|| format!("Task {id} not found"))?;
            write_task(ctx, &task, out)
        }
        TaskAction::Delete { id } => {
            if !ctx.tasks.delete_task(id).await? {
                bail!("Task {id} not found");
            }
            writeln!(out, "Deleted task {id}")?;
            Ok(())
        }
        TaskAction::Search { query } => {
            let tasks = ctx.tasks.search_tasks(&query).await?;
            write_tasks(ctx, &tasks, out)
        }
        TaskAction::Overdue => {
            let tasks = ctx.tasks.get_overdue_tasks().await?;
            write_tasks(ctx, &tasks, out)
        }
        TaskAction::Filter { status, priority } => {
            let tasks = ctx.tasks.filter_tasks(&TaskFilter { status, priority }).await?;
            write_tasks(ctx, &tasks, out)
        }
    }
}

async fn find_project(ctx: &Services, id: ProjectId) -> anyhow::Result<Project> {
    ctx.projects
        .get_project(id)
        .await?
        .with_context(|| format!("Project {id} not found"))
}

async fn find_task(ctx: &Services, id: TaskId) -> anyhow::Result<Task> {
    ctx.tasks
        .get_task(id)
        .await?
        .with_context(|| format!("Task {id} not found"))
}

fn write_user(ctx: &Services, user: &User, out: &mut dyn Write) -> anyhow::Result<()> {
    if ctx.json {
        writeln!(out, "{}", serde_json::Value::Object(user.to_map()))?;
    } else {
        write!(out, "{}", render::format_user(user))?;
    }
    Ok(())
}

fn write_project(
    ctx: &Services,
    project: &Project,
    progress: Option<f64>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    if ctx.json {
        let mut map = project.to_map();
        if let Some(progress) = progress {
            map.insert("progress".into(), serde_json::json!(progress));
        }
        writeln!(out, "{}", serde_json::Value::Object(map))?;
    } else {
        write!(out, "{}", render::format_project(project, progress))?;
    }
    Ok(())
}

fn write_task(ctx: &Services, task: &Task, out: &mut dyn Write) -> anyhow::Result<()> {
    if ctx.json {
        writeln!(out, "{}", serde_json::Value::Object(task.to_map()))?;
    } else {
        write!(out, "{}", render::format_task(task, timestamp::now()))?;
    }
    Ok(())
}

fn write_tasks(ctx: &Services, tasks: &[Task], out: &mut dyn Write) -> anyhow::Result<()> {
    if ctx.json {
        writeln!(out, "{}", render::format_json(tasks.iter().map(Task::to_map))?)?;
    } else {
        write!(out, "{}", render::format_tasks_table(tasks, timestamp::now()))?;
    }
    Ok(())
}
