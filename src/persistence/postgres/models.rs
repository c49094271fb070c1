//! Diesel row models for the tracker tables.

use super::schema::{
    activity_logs, comments, notifications, positions, projects, tags, task_assignees, task_tags,
    task_types, tasks, team_members, teams, workers,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Row of `positions`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = positions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PositionRow {
    /// Identifier.
    pub id: Uuid,
    /// Name.
    pub name: String,
}

/// Row of `workers`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = workers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct WorkerRow {
    /// Identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Position.
    pub position_id: Option<Uuid>,
    /// Argon2 PHC string.
    pub password: String,
    /// Active flag.
    pub is_active: bool,
    /// Staff flag.
    pub is_staff: bool,
    /// Superuser flag.
    pub is_superuser: bool,
    /// Registration timestamp.
    pub date_joined: DateTime<Utc>,
}

/// Row of `projects`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Identifier.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row of `teams`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TeamRow {
    /// Identifier.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Project.
    pub project_id: Option<Uuid>,
    /// Creator.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row of `team_members`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeamMemberRow {
    /// Team.
    pub team_id: Uuid,
    /// Member.
    pub worker_id: Uuid,
}

/// Row of `tags`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TagRow {
    /// Identifier.
    pub id: Uuid,
    /// Name.
    pub name: String,
}

/// Row of `task_types`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskTypeRow {
    /// Identifier.
    pub id: Uuid,
    /// Name.
    pub name: String,
}

/// Row of `tasks`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Identifier.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Priority.
    pub priority: String,
    /// Completion flag.
    pub is_completed: bool,
    /// Task type.
    pub task_type_id: Option<Uuid>,
    /// Project.
    pub project_id: Option<Uuid>,
    /// Creator.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row of `task_tags`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskTagRow {
    /// Task.
    pub task_id: Uuid,
    /// Tag.
    pub tag_id: Uuid,
}

/// Row of `task_assignees`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_assignees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskAssigneeRow {
    /// Task.
    pub task_id: Uuid,
    /// Assignee.
    pub worker_id: Uuid,
}

/// Row of `comments`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Identifier.
    pub id: Uuid,
    /// Task.
    pub task_id: Uuid,
    /// Author.
    pub author_id: Uuid,
    /// Body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row of `activity_logs`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = activity_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    /// Identifier.
    pub id: Uuid,
    /// Task.
    pub task_id: Option<Uuid>,
    /// Actor.
    pub user_id: Option<Uuid>,
    /// Kind.
    pub activity_type: String,
    /// Description.
    pub description: String,
    /// Timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row of `notifications`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Identifier.
    pub id: Uuid,
    /// Recipient.
    pub recipient_id: Uuid,
    /// Kind.
    pub notification_type: String,
    /// Title.
    pub title: String,
    /// Message.
    pub message: String,
    /// Task.
    pub task_id: Option<Uuid>,
    /// Read flag.
    pub is_read: bool,
    /// Timestamp.
    pub created_at: DateTime<Utc>,
}
