//! Domain model for worker accounts and positions.

mod credentials;
mod error;
mod ids;
mod position;
mod requester;
mod worker;

pub use credentials::{MIN_PASSWORD_LENGTH, PasswordHash};
pub use error::{AccessDenied, WorkerDomainError};
pub use ids::{PositionId, WorkerId};
pub use position::{Position, PositionName};
pub use requester::Requester;
pub use worker::{Email, PersistedWorkerData, Username, Worker, WorkerProfile};
