//! Service layer for tasks, comments, notifications and the dashboard.

mod comments;
mod dashboard;
mod error;
mod hooks;
mod lifecycle;
mod notifications;

pub use comments::{CommentService, PostedComment};
pub use dashboard::{DashboardService, DashboardStats};
pub use error::{TaskError, TaskResult};
pub use hooks::{DEADLINE_FORMAT, MutationHooks};
pub use lifecycle::TaskService;
pub use notifications::{NotificationService, NotificationSnapshot, POLL_PREVIEW_LIMIT};
