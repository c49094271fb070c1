//! Diesel schema for the tracker tables.

diesel::table! {
    /// Job titles assignable to workers.
    positions (id) {
        /// Position identifier.
        id -> Uuid,
        /// Unique name.
        #[max_length = 100]
        name -> Varchar,
    }
}

diesel::table! {
    /// User accounts.
    workers (id) {
        /// Worker identifier.
        id -> Uuid,
        /// Unique login name.
        #[max_length = 150]
        username -> Varchar,
        /// Email address, unique case-insensitively.
        #[max_length = 254]
        email -> Varchar,
        /// Given name.
        #[max_length = 150]
        first_name -> Varchar,
        /// Family name.
        #[max_length = 150]
        last_name -> Varchar,
        /// Optional position.
        position_id -> Nullable<Uuid>,
        /// Argon2 PHC string.
        #[max_length = 255]
        password -> Varchar,
        /// Whether the account may sign in.
        is_active -> Bool,
        /// Staff flag.
        is_staff -> Bool,
        /// Superuser flag.
        is_superuser -> Bool,
        /// Registration timestamp.
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    /// Projects.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Name.
        #[max_length = 200]
        name -> Varchar,
        /// Description.
        description -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Teams.
    teams (id) {
        /// Team identifier.
        id -> Uuid,
        /// Name.
        #[max_length = 200]
        name -> Varchar,
        /// Optional owning project.
        project_id -> Nullable<Uuid>,
        /// Optional creator.
        created_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Team membership links.
    team_members (team_id, worker_id) {
        /// Team.
        team_id -> Uuid,
        /// Member.
        worker_id -> Uuid,
    }
}

diesel::table! {
    /// Task categories.
    task_types (id) {
        /// Task type identifier.
        id -> Uuid,
        /// Unique name.
        #[max_length = 100]
        name -> Varchar,
    }
}

diesel::table! {
    /// Task labels.
    tags (id) {
        /// Tag identifier.
        id -> Uuid,
        /// Unique name.
        #[max_length = 100]
        name -> Varchar,
    }
}

diesel::table! {
    /// Tasks.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Name.
        #[max_length = 200]
        name -> Varchar,
        /// Description.
        description -> Text,
        /// Optional deadline.
        deadline -> Nullable<Timestamptz>,
        /// Priority level.
        #[max_length = 20]
        priority -> Varchar,
        /// Completion flag.
        is_completed -> Bool,
        /// Optional category.
        task_type_id -> Nullable<Uuid>,
        /// Optional owning project.
        project_id -> Nullable<Uuid>,
        /// Optional creator.
        created_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last-write timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task-tag links.
    task_tags (task_id, tag_id) {
        /// Task.
        task_id -> Uuid,
        /// Tag.
        tag_id -> Uuid,
    }
}

diesel::table! {
    /// Task-assignee links.
    task_assignees (task_id, worker_id) {
        /// Task.
        task_id -> Uuid,
        /// Assignee.
        worker_id -> Uuid,
    }
}

diesel::table! {
    /// Comments on tasks.
    comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Task.
        task_id -> Uuid,
        /// Author.
        author_id -> Uuid,
        /// Body.
        content -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last edit timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail.
    activity_logs (id) {
        /// Row identifier.
        id -> Uuid,
        /// Task, nulled when the task is deleted.
        task_id -> Nullable<Uuid>,
        /// Actor.
        user_id -> Nullable<Uuid>,
        /// Activity kind.
        #[max_length = 20]
        activity_type -> Varchar,
        /// Description.
        description -> Text,
        /// Timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-recipient notifications.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Recipient.
        recipient_id -> Uuid,
        /// Notification kind.
        #[max_length = 30]
        notification_type -> Varchar,
        /// Title.
        #[max_length = 200]
        title -> Varchar,
        /// Message.
        message -> Text,
        /// Related task, nulled when the task is deleted.
        task_id -> Nullable<Uuid>,
        /// Read flag.
        is_read -> Bool,
        /// Timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(workers -> positions (position_id));
diesel::joinable!(teams -> projects (project_id));
diesel::joinable!(team_members -> teams (team_id));
diesel::joinable!(team_members -> workers (worker_id));
diesel::joinable!(tasks -> task_types (task_type_id));
diesel::joinable!(tasks -> projects (project_id));
diesel::joinable!(task_tags -> tasks (task_id));
diesel::joinable!(task_tags -> tags (tag_id));
diesel::joinable!(task_assignees -> tasks (task_id));
diesel::joinable!(task_assignees -> workers (worker_id));
diesel::joinable!(comments -> tasks (task_id));
diesel::joinable!(comments -> workers (author_id));
diesel::joinable!(activity_logs -> tasks (task_id));
diesel::joinable!(notifications -> tasks (task_id));
diesel::joinable!(notifications -> workers (recipient_id));

diesel::allow_tables_to_appear_in_same_query!(
    positions,
    workers,
    projects,
    teams,
    team_members,
    task_types,
    tags,
    tasks,
    task_tags,
    task_assignees,
    comments,
    activity_logs,
    notifications,
);
