//! Task ports over `PostgreSQL`.
//!
//! [`TaskRepository::apply`] runs the primary write, the activity rows and
//! the notifications of a change set in one transaction.

use crate::organisation::domain::{ProjectId, TagId, TaskTypeId};
use crate::persistence::postgres::models::{
    ActivityRow, CommentRow, NotificationRow, TaskAssigneeRow, TaskRow, TaskTagRow,
};
use crate::persistence::postgres::schema::{
    activity_logs, comments, notifications, projects, tags, task_assignees, task_tags, task_types,
    tasks, workers,
};
use crate::persistence::postgres::{PostgresStore, escape_like, in_transaction, query_failed};
use crate::persistence::{PageRequest, Paged, StoreFailure};
use crate::task::{
    domain::{
        ActivityId, ActivityKind, ActivityLog, Comment, CommentContent, CommentId,
        CompletionStatus, Notification, NotificationId, NotificationKind,
        PersistedNotificationData, PersistedTaskData, Priority, Task, TaskChangeSet, TaskDraft,
        TaskFilter, TaskId, TaskName, TaskWrite,
    },
    ports::{
        ActivityLogRepository, ActivityQuery, NotificationQuery, NotificationRepository,
        TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskStatistics,
    },
};
use crate::worker::domain::WorkerId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

type Result<T> = TaskRepositoryResult<T>;

fn failed(err: DieselError) -> TaskRepositoryError {
    query_failed(err)
}

fn corrupt(table: &'static str, reason: impl ToString) -> TaskRepositoryError {
    StoreFailure::corrupt(table, reason).into()
}

fn counted(table: &'static str, result: QueryResult<i64>) -> Result<usize> {
    let count = result.map_err(failed)?;
    usize::try_from(count).map_err(|err| corrupt(table, err))
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

/// Tasks matching `filter`; callers add the select, order and window.
fn filtered_tasks(filter: &TaskFilter) -> tasks::BoxedQuery<'static, Pg> {
    let mut statement = tasks::table.into_boxed();
    if let Some(needle) = filter.needle() {
        let pattern = contains_pattern(&needle);
        statement = statement.filter(
            tasks::name
                .ilike(pattern.clone())
                .or(tasks::description.ilike(pattern)),
        );
    }
    match filter.status {
        Some(CompletionStatus::Completed) => {
            statement = statement.filter(tasks::is_completed.eq(true));
        }
        Some(CompletionStatus::Incomplete) => {
            statement = statement.filter(tasks::is_completed.eq(false));
        }
        None => {}
    }
    if let Some(priority) = filter.priority {
        statement = statement.filter(tasks::priority.eq(priority.as_str()));
    }
    if let Some(task_type) = filter.task_type {
        statement = statement.filter(tasks::task_type_id.eq(task_type.into_inner()));
    }
    if let Some(project) = filter.project {
        statement = statement.filter(tasks::project_id.eq(project.into_inner()));
    }
    if let Some(tag) = filter.tag {
        statement = statement.filter(
            tasks::id.eq_any(
                task_tags::table
                    .filter(task_tags::tag_id.eq(tag.into_inner()))
                    .select(task_tags::task_id),
            ),
        );
    }
    if let Some(assignee) = filter.assignee {
        statement = statement.filter(
            tasks::id.eq_any(
                task_assignees::table
                    .filter(task_assignees::worker_id.eq(assignee.into_inner()))
                    .select(task_assignees::task_id),
            ),
        );
    }
    statement
}

fn filtered_activity(query: &ActivityQuery) -> activity_logs::BoxedQuery<'static, Pg> {
    let mut statement = activity_logs::table.into_boxed();
    if let Some(kind) = query.kind {
        statement = statement.filter(activity_logs::activity_type.eq(kind.as_str()));
    }
    if let Some(needle) = query.needle() {
        let pattern = contains_pattern(&needle);
        statement = statement.filter(
            activity_logs::description
                .ilike(pattern.clone())
                .or(activity_logs::task_id.assume_not_null().eq_any(
                    tasks::table
                        .filter(tasks::name.ilike(pattern.clone()))
                        .select(tasks::id),
                ))
                .or(activity_logs::user_id.assume_not_null().eq_any(
                    workers::table
                        .filter(workers::username.ilike(pattern))
                        .select(workers::id),
                )),
        );
    }
    statement
}

fn filtered_notifications(query: &NotificationQuery) -> notifications::BoxedQuery<'static, Pg> {
    let mut statement = notifications::table.into_boxed();
    if let Some(recipient) = query.recipient {
        statement = statement.filter(notifications::recipient_id.eq(recipient.into_inner()));
    }
    if let Some(read) = query.is_read {
        statement = statement.filter(notifications::is_read.eq(read));
    }
    if let Some(kind) = query.kind {
        statement = statement.filter(notifications::notification_type.eq(kind.as_str()));
    }
    if let Some(needle) = query.needle() {
        let pattern = contains_pattern(&needle);
        statement = statement.filter(
            notifications::title
                .ilike(pattern.clone())
                .or(notifications::message.ilike(pattern.clone()))
                .or(notifications::recipient_id.eq_any(
                    workers::table
                        .filter(workers::username.ilike(pattern))
                        .select(workers::id),
                )),
        );
    }
    statement
}

#[async_trait]
impl TaskRepository for PostgresStore {
    async fn apply(&self, change_set: TaskChangeSet) -> Result<()> {
        self.run_blocking(move |connection| {
            in_transaction(connection, |tx| {
                apply_write(tx, &change_set.write)?;
                let actors: Vec<WorkerId> = change_set
                    .activity
                    .iter()
                    .filter_map(ActivityLog::actor)
                    .chain(change_set.notifications.iter().map(Notification::recipient))
                    .collect();
                check_workers(tx, &actors)?;
                let activity: Vec<ActivityRow> =
                    change_set.activity.iter().map(activity_row).collect();
                if !activity.is_empty() {
                    diesel::insert_into(activity_logs::table)
                        .values(&activity)
                        .execute(tx)
                        .map_err(failed)?;
                }
                let notices: Vec<NotificationRow> =
                    change_set.notifications.iter().map(notification_row).collect();
                if !notices.is_empty() {
                    diesel::insert_into(notifications::table)
                        .values(&notices)
                        .execute(tx)
                        .map_err(failed)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .load(connection)
                .map_err(failed)?;
            Ok(hydrate_tasks(connection, rows)?.into_iter().next())
        })
        .await
    }

    async fn search(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let filter = filter.clone();
        self.run_blocking(move |connection| {
            let rows = filtered_tasks(&filter)
                .select(TaskRow::as_select())
                .order((tasks::created_at.desc(), tasks::id.asc()))
                .load(connection)
                .map_err(failed)?;
            hydrate_tasks(connection, rows)
        })
        .await
    }

    async fn search_page(&self, filter: &TaskFilter, page: PageRequest) -> Result<Paged<Task>> {
        let filter = filter.clone();
        self.run_blocking(move |connection| {
            let total = counted("tasks", filtered_tasks(&filter).count().get_result(connection))?;
            let request = page.clamp_to(total);
            let (offset, limit) = request.sql_window();
            let rows = filtered_tasks(&filter)
                .select(TaskRow::as_select())
                .order((tasks::created_at.desc(), tasks::id.asc()))
                .offset(offset)
                .limit(limit)
                .load(connection)
                .map_err(failed)?;
            Ok(Paged {
                items: hydrate_tasks(connection, rows)?,
                total,
                request,
            })
        })
        .await
    }

    async fn statistics(&self, viewer: WorkerId, now: DateTime<Utc>) -> Result<TaskStatistics> {
        self.run_blocking(move |connection| {
            let viewer = viewer.into_inner();
            let assigned = || {
                task_assignees::table
                    .filter(task_assignees::worker_id.eq(viewer))
                    .select(task_assignees::task_id)
            };
            let total = counted("tasks", tasks::table.count().get_result(connection))?;
            let completed = counted(
                "tasks",
                tasks::table
                    .filter(tasks::is_completed.eq(true))
                    .count()
                    .get_result(connection),
            )?;
            let overdue = counted(
                "tasks",
                tasks::table
                    .filter(tasks::is_completed.eq(false))
                    .filter(tasks::deadline.lt(now))
                    .count()
                    .get_result(connection),
            )?;
            let my_open = counted(
                "tasks",
                tasks::table
                    .filter(tasks::is_completed.eq(false))
                    .filter(tasks::id.eq_any(assigned()))
                    .count()
                    .get_result(connection),
            )?;
            let my_completed = counted(
                "tasks",
                tasks::table
                    .filter(tasks::is_completed.eq(true))
                    .filter(tasks::id.eq_any(assigned()))
                    .count()
                    .get_result(connection),
            )?;
            let mut open_counts: HashMap<Priority, usize> = HashMap::new();
            for (priority, count) in tasks::table
                .filter(tasks::is_completed.eq(false))
                .group_by(tasks::priority)
                .select((tasks::priority, count_star()))
                .load::<(String, i64)>(connection)
                .map_err(failed)?
            {
                let priority =
                    Priority::try_from(priority.as_str()).map_err(|err| corrupt("tasks", err))?;
                open_counts.insert(priority, counted("tasks", Ok(count))?);
            }
            Ok(TaskStatistics {
                total,
                completed,
                overdue,
                my_open,
                my_completed,
                open_by_priority: TaskStatistics::priority_breakdown(&open_counts),
            })
        })
        .await
    }

    async fn due_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Task>> {
        let limit = sql_limit(limit);
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::is_completed.eq(false))
                .filter(tasks::deadline.ge(from))
                .filter(tasks::deadline.le(until))
                .order((tasks::deadline.asc(), tasks::id.asc()))
                .limit(limit)
                .select(TaskRow::as_select())
                .load(connection)
                .map_err(failed)?;
            hydrate_tasks(connection, rows)
        })
        .await
    }

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        self.run_blocking(move |connection| {
            let row = comments::table
                .find(id.into_inner())
                .select(CommentRow::as_select())
                .first(connection)
                .optional()
                .map_err(failed)?;
            row.map(row_to_comment).transpose()
        })
        .await
    }

    async fn list_comments(&self, task: TaskId) -> Result<Vec<Comment>> {
        self.run_blocking(move |connection| {
            comments::table
                .filter(comments::task_id.eq(task.into_inner()))
                .order(comments::created_at.desc())
                .select(CommentRow::as_select())
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(row_to_comment)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl ActivityLogRepository for PostgresStore {
    async fn list_for_task(&self, task: TaskId) -> Result<Vec<ActivityLog>> {
        self.run_blocking(move |connection| {
            activity_logs::table
                .filter(activity_logs::task_id.eq(task.into_inner()))
                .order(activity_logs::created_at.desc())
                .select(ActivityRow::as_select())
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(row_to_activity)
                .collect()
        })
        .await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ActivityLog>> {
        let limit = sql_limit(limit);
        self.run_blocking(move |connection| {
            activity_logs::table
                .order(activity_logs::created_at.desc())
                .limit(limit)
                .select(ActivityRow::as_select())
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(row_to_activity)
                .collect()
        })
        .await
    }

    async fn search_activity(
        &self,
        query: &ActivityQuery,
        page: PageRequest,
    ) -> Result<Paged<ActivityLog>> {
        let query = query.clone();
        self.run_blocking(move |connection| {
            let total = counted(
                "activity_logs",
                filtered_activity(&query).count().get_result(connection),
            )?;
            let request = page.clamp_to(total);
            let (offset, limit) = request.sql_window();
            let items = filtered_activity(&query)
                .select(ActivityRow::as_select())
                .order((activity_logs::created_at.desc(), activity_logs::id.asc()))
                .offset(offset)
                .limit(limit)
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(row_to_activity)
                .collect::<Result<Vec<_>>>()?;
            Ok(Paged {
                items,
                total,
                request,
            })
        })
        .await
    }

    async fn find_activity(&self, id: ActivityId) -> Result<Option<ActivityLog>> {
        self.run_blocking(move |connection| {
            let row = activity_logs::table
                .find(id.into_inner())
                .select(ActivityRow::as_select())
                .first(connection)
                .optional()
                .map_err(failed)?;
            row.map(row_to_activity).transpose()
        })
        .await
    }
}

#[async_trait]
impl NotificationRepository for PostgresStore {
    async fn list_notifications(
        &self,
        query: &NotificationQuery,
        page: PageRequest,
    ) -> Result<Paged<Notification>> {
        let query = query.clone();
        self.run_blocking(move |connection| {
            let total = counted(
                "notifications",
                filtered_notifications(&query).count().get_result(connection),
            )?;
            let request = page.clamp_to(total);
            let (offset, limit) = request.sql_window();
            let items = filtered_notifications(&query)
                .select(NotificationRow::as_select())
                .order((notifications::created_at.desc(), notifications::id.asc()))
                .offset(offset)
                .limit(limit)
                .load(connection)
                .map_err(failed)?
                .into_iter()
                .map(row_to_notification)
                .collect::<Result<Vec<_>>>()?;
            Ok(Paged {
                items,
                total,
                request,
            })
        })
        .await
    }

    async fn unread_count(&self, recipient: WorkerId) -> Result<usize> {
        self.run_blocking(move |connection| {
            counted(
                "notifications",
                notifications::table
                    .filter(notifications::recipient_id.eq(recipient.into_inner()))
                    .filter(notifications::is_read.eq(false))
                    .count()
                    .get_result(connection),
            )
        })
        .await
    }

    async fn find_notification(&self, id: NotificationId) -> Result<Option<Notification>> {
        self.run_blocking(move |connection| {
            let row = notifications::table
                .find(id.into_inner())
                .select(NotificationRow::as_select())
                .first(connection)
                .optional()
                .map_err(failed)?;
            row.map(row_to_notification).transpose()
        })
        .await
    }

    async fn set_read_state(&self, ids: &[NotificationId], read: bool) -> Result<usize> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            diesel::update(
                notifications::table
                    .filter(notifications::id.eq_any(&ids))
                    .filter(notifications::is_read.ne(read)),
            )
            .set(notifications::is_read.eq(read))
            .execute(connection)
            .map_err(failed)
        })
        .await
    }

    async fn mark_all_read(&self, recipient: WorkerId) -> Result<usize> {
        self.run_blocking(move |connection| {
            diesel::update(
                notifications::table
                    .filter(notifications::recipient_id.eq(recipient.into_inner()))
                    .filter(notifications::is_read.eq(false)),
            )
            .set(notifications::is_read.eq(true))
            .execute(connection)
            .map_err(failed)
        })
        .await
    }
}

fn apply_write(connection: &mut PgConnection, write: &TaskWrite) -> Result<()> {
    match write {
        TaskWrite::InsertTask(task) => {
            let exists: bool =
                diesel::select(diesel::dsl::exists(tasks::table.find(task.id().into_inner())))
                    .get_result(connection)
                    .map_err(failed)?;
            if exists {
                return Err(TaskRepositoryError::DuplicateTask(task.id()));
            }
            check_task_references(connection, task)?;
            diesel::insert_into(tasks::table)
                .values(&task_row(task))
                .execute(connection)
                .map_err(failed)?;
            insert_links(connection, task)
        }
        TaskWrite::UpdateTask(task) => {
            check_task_references(connection, task)?;
            let row = task_row(task);
            let updated = diesel::update(tasks::table.find(row.id))
                .set(&row)
                .execute(connection)
                .map_err(failed)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task.id()));
            }
            diesel::delete(task_tags::table.filter(task_tags::task_id.eq(row.id)))
                .execute(connection)
                .map_err(failed)?;
            diesel::delete(task_assignees::table.filter(task_assignees::task_id.eq(row.id)))
                .execute(connection)
                .map_err(failed)?;
            insert_links(connection, task)
        }
        TaskWrite::DeleteTask(id) => {
            let deleted = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(failed)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(*id));
            }
            Ok(())
        }
        TaskWrite::InsertComment(comment) => {
            let exists: bool = diesel::select(diesel::dsl::exists(
                comments::table.find(comment.id().into_inner()),
            ))
            .get_result(connection)
            .map_err(failed)?;
            if exists {
                return Err(TaskRepositoryError::DuplicateComment(comment.id()));
            }
            let task_exists: bool = diesel::select(diesel::dsl::exists(
                tasks::table.find(comment.task().into_inner()),
            ))
            .get_result(connection)
            .map_err(failed)?;
            if !task_exists {
                return Err(TaskRepositoryError::NotFound(comment.task()));
            }
            check_workers(connection, &[comment.author()])?;
            diesel::insert_into(comments::table)
                .values(&comment_row(comment))
                .execute(connection)
                .map_err(failed)?;
            Ok(())
        }
        TaskWrite::UpdateComment(comment) => {
            let updated = diesel::update(comments::table.find(comment.id().into_inner()))
                .set((
                    comments::content.eq(comment.content().as_str()),
                    comments::updated_at.eq(comment.updated_at()),
                ))
                .execute(connection)
                .map_err(failed)?;
            if updated == 0 {
                return Err(TaskRepositoryError::CommentNotFound(comment.id()));
            }
            Ok(())
        }
        TaskWrite::DeleteComment(id) => {
            let deleted = diesel::delete(comments::table.find(id.into_inner()))
                .execute(connection)
                .map_err(failed)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::CommentNotFound(*id));
            }
            Ok(())
        }
    }
}

fn check_workers(connection: &mut PgConnection, ids: &[WorkerId]) -> Result<()> {
    let wanted: BTreeSet<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
    if wanted.is_empty() {
        return Ok(());
    }
    let found: BTreeSet<Uuid> = workers::table
        .filter(workers::id.eq_any(wanted.iter().copied().collect::<Vec<_>>()))
        .select(workers::id)
        .load::<Uuid>(connection)
        .map_err(failed)?
        .into_iter()
        .collect();
    match wanted.difference(&found).next() {
        Some(missing) => Err(TaskRepositoryError::UnknownWorker(WorkerId::from_uuid(*missing))),
        None => Ok(()),
    }
}

fn check_task_references(connection: &mut PgConnection, task: &Task) -> Result<()> {
    let people: Vec<WorkerId> = task
        .created_by()
        .into_iter()
        .chain(task.assignees().iter().copied())
        .collect();
    check_workers(connection, &people)?;
    if let Some(project) = task.project() {
        let exists: bool = diesel::select(diesel::dsl::exists(
            projects::table.find(project.into_inner()),
        ))
        .get_result(connection)
        .map_err(failed)?;
        if !exists {
            return Err(TaskRepositoryError::UnknownProject(project));
        }
    }
    if let Some(task_type) = task.task_type() {
        let exists: bool = diesel::select(diesel::dsl::exists(
            task_types::table.find(task_type.into_inner()),
        ))
        .get_result(connection)
        .map_err(failed)?;
        if !exists {
            return Err(TaskRepositoryError::UnknownTaskType(task_type));
        }
    }
    let wanted: Vec<Uuid> = task.tags().iter().map(|tag| tag.into_inner()).collect();
    let found: BTreeSet<Uuid> = tags::table
        .filter(tags::id.eq_any(&wanted))
        .select(tags::id)
        .load::<Uuid>(connection)
        .map_err(failed)?
        .into_iter()
        .collect();
    match wanted.into_iter().find(|tag| !found.contains(tag)) {
        Some(missing) => Err(TaskRepositoryError::UnknownTag(TagId::from_uuid(missing))),
        None => Ok(()),
    }
}

fn insert_links(connection: &mut PgConnection, task: &Task) -> Result<()> {
    let task_id = task.id().into_inner();
    let tag_rows: Vec<TaskTagRow> = task
        .tags()
        .iter()
        .map(|tag| TaskTagRow {
            task_id,
            tag_id: tag.into_inner(),
        })
        .collect();
    if !tag_rows.is_empty() {
        diesel::insert_into(task_tags::table)
            .values(&tag_rows)
            .execute(connection)
            .map_err(failed)?;
    }
    let assignee_rows: Vec<TaskAssigneeRow> = task
        .assignees()
        .iter()
        .map(|worker| TaskAssigneeRow {
            task_id,
            worker_id: worker.into_inner(),
        })
        .collect();
    if !assignee_rows.is_empty() {
        diesel::insert_into(task_assignees::table)
            .values(&assignee_rows)
            .execute(connection)
            .map_err(failed)?;
    }
    Ok(())
}

fn hydrate_tasks(connection: &mut PgConnection, rows: Vec<TaskRow>) -> Result<Vec<Task>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut tags_by_task: HashMap<Uuid, BTreeSet<TagId>> = HashMap::new();
    for link in task_tags::table
        .filter(task_tags::task_id.eq_any(&ids))
        .select(TaskTagRow::as_select())
        .load(connection)
        .map_err(failed)?
    {
        tags_by_task
            .entry(link.task_id)
            .or_default()
            .insert(TagId::from_uuid(link.tag_id));
    }
    let mut assignees_by_task: HashMap<Uuid, BTreeSet<WorkerId>> = HashMap::new();
    for link in task_assignees::table
        .filter(task_assignees::task_id.eq_any(&ids))
        .select(TaskAssigneeRow::as_select())
        .load(connection)
        .map_err(failed)?
    {
        assignees_by_task
            .entry(link.task_id)
            .or_default()
            .insert(WorkerId::from_uuid(link.worker_id));
    }
    rows.into_iter()
        .map(|row| {
            let tags = tags_by_task.remove(&row.id).unwrap_or_default();
            let assignees = assignees_by_task.remove(&row.id).unwrap_or_default();
            row_to_task(row, tags, assignees)
        })
        .collect()
}

fn task_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        name: task.name().as_str().to_owned(),
        description: task.description().to_owned(),
        deadline: task.deadline(),
        priority: task.priority().as_str().to_owned(),
        is_completed: task.is_completed(),
        task_type_id: task.task_type().map(TaskTypeId::into_inner),
        project_id: task.project().map(ProjectId::into_inner),
        created_by: task.created_by().map(WorkerId::into_inner),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(
    row: TaskRow,
    tags: BTreeSet<TagId>,
    assignees: BTreeSet<WorkerId>,
) -> Result<Task> {
    let name = TaskName::new(&row.name).map_err(|err| corrupt("tasks", err))?;
    let priority = Priority::try_from(row.priority.as_str()).map_err(|err| corrupt("tasks", err))?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        draft: TaskDraft {
            name,
            description: row.description,
            deadline: row.deadline,
            priority,
            task_type: row.task_type_id.map(TaskTypeId::from_uuid),
            tags,
            assignees,
            project: row.project_id.map(ProjectId::from_uuid),
        },
        is_completed: row.is_completed,
        created_by: row.created_by.map(WorkerId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn comment_row(comment: &Comment) -> CommentRow {
    CommentRow {
        id: comment.id().into_inner(),
        task_id: comment.task().into_inner(),
        author_id: comment.author().into_inner(),
        content: comment.content().as_str().to_owned(),
        created_at: comment.created_at(),
        updated_at: comment.updated_at(),
    }
}

fn row_to_comment(row: CommentRow) -> Result<Comment> {
    let content = CommentContent::new(&row.content).map_err(|err| corrupt("comments", err))?;
    Ok(Comment::from_persisted(
        CommentId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        WorkerId::from_uuid(row.author_id),
        content,
        row.created_at,
        row.updated_at,
    ))
}

fn activity_row(row: &ActivityLog) -> ActivityRow {
    ActivityRow {
        id: row.id().into_inner(),
        task_id: row.task().map(TaskId::into_inner),
        user_id: row.actor().map(WorkerId::into_inner),
        activity_type: row.kind().as_str().to_owned(),
        description: row.description().to_owned(),
        created_at: row.created_at(),
    }
}

fn row_to_activity(row: ActivityRow) -> Result<ActivityLog> {
    let kind =
        ActivityKind::try_from(row.activity_type.as_str()).map_err(|err| corrupt("activity_logs", err))?;
    Ok(ActivityLog::from_persisted(
        ActivityId::from_uuid(row.id),
        row.task_id.map(TaskId::from_uuid),
        row.user_id.map(WorkerId::from_uuid),
        kind,
        row.description,
        row.created_at,
    ))
}

fn notification_row(notification: &Notification) -> NotificationRow {
    NotificationRow {
        id: notification.id().into_inner(),
        recipient_id: notification.recipient().into_inner(),
        notification_type: notification.kind().as_str().to_owned(),
        title: notification.title().to_owned(),
        message: notification.message().to_owned(),
        task_id: notification.task().map(TaskId::into_inner),
        is_read: notification.is_read(),
        created_at: notification.created_at(),
    }
}

fn row_to_notification(row: NotificationRow) -> Result<Notification> {
    let kind = NotificationKind::try_from(row.notification_type.as_str())
        .map_err(|err| corrupt("notifications", err))?;
    Ok(Notification::from_persisted(PersistedNotificationData {
        id: NotificationId::from_uuid(row.id),
        recipient: WorkerId::from_uuid(row.recipient_id),
        kind,
        title: row.title,
        message: row.message,
        task: row.task_id.map(TaskId::from_uuid),
        is_read: row.is_read,
        created_at: row.created_at,
    }))
}
