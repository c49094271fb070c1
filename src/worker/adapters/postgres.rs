//! Worker ports over `PostgreSQL`.

use crate::persistence::postgres::models::{PositionRow, WorkerRow};
use crate::persistence::postgres::schema::{positions, workers};
use crate::persistence::postgres::{PostgresStore, escape_like, query_failed};
use crate::persistence::StoreFailure;
use crate::worker::{
    domain::{
        Email, PasswordHash, PersistedWorkerData, Position, PositionId, PositionName, Username,
        Worker, WorkerId, WorkerProfile,
    },
    ports::{
        PositionRepository, WorkerQuery, WorkerRepository, WorkerRepositoryError,
        WorkerRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

#[async_trait]
impl WorkerRepository for PostgresStore {
    async fn store(&self, worker: &Worker) -> WorkerRepositoryResult<()> {
        let row = to_row(worker);
        self.run_blocking(move |connection| {
            check_unique(connection, &row)?;
            diesel::insert_into(workers::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, &row))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, worker: &Worker) -> WorkerRepositoryResult<()> {
        let row = to_row(worker);
        let id = worker.id();
        self.run_blocking(move |connection| {
            check_unique(connection, &row)?;
            let updated = diesel::update(workers::table.find(row.id))
                .set(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, &row))?;
            if updated == 0 {
                return Err(WorkerRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: WorkerId) -> WorkerRepositoryResult<Option<Worker>> {
        self.run_blocking(move |connection| {
            let row = workers::table
                .find(id.into_inner())
                .select(WorkerRow::as_select())
                .first(connection)
                .optional()
                .map_err(query_failed::<WorkerRepositoryError>)?;
            row.map(row_to_worker).transpose()
        })
        .await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> WorkerRepositoryResult<Option<Worker>> {
        let lookup = username.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = workers::table
                .filter(workers::username.eq(lookup))
                .select(WorkerRow::as_select())
                .first(connection)
                .optional()
                .map_err(query_failed::<WorkerRepositoryError>)?;
            row.map(row_to_worker).transpose()
        })
        .await
    }

    async fn find_many(&self, ids: &[WorkerId]) -> WorkerRepositoryResult<Vec<Worker>> {
        let lookup: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            workers::table
                .filter(workers::id.eq_any(lookup))
                .order(workers::username.asc())
                .select(WorkerRow::as_select())
                .load(connection)
                .map_err(query_failed::<WorkerRepositoryError>)?
                .into_iter()
                .map(row_to_worker)
                .collect()
        })
        .await
    }

    async fn list(&self, query: &WorkerQuery) -> WorkerRepositoryResult<Vec<Worker>> {
        let query = query.clone();
        self.run_blocking(move |connection| {
            let mut statement = workers::table
                .select(WorkerRow::as_select())
                .order((workers::date_joined.desc(), workers::username.asc()))
                .into_boxed();
            if query.active_only {
                statement = statement.filter(workers::is_active.eq(true));
            }
            if let Some(search) = query.search.as_deref() {
                let pattern = format!("%{}%", escape_like(search));
                statement = statement.filter(
                    workers::username
                        .ilike(pattern.clone())
                        .or(workers::first_name.ilike(pattern.clone()))
                        .or(workers::last_name.ilike(pattern.clone()))
                        .or(workers::email.ilike(pattern)),
                );
            }
            statement
                .load(connection)
                .map_err(query_failed::<WorkerRepositoryError>)?
                .into_iter()
                .map(row_to_worker)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl PositionRepository for PostgresStore {
    async fn store_position(&self, position: &Position) -> WorkerRepositoryResult<()> {
        let row = position_row(position);
        self.run_blocking(move |connection| {
            diesel::insert_into(positions::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_position_error(err, &row.name))?;
            Ok(())
        })
        .await
    }

    async fn update_position(&self, position: &Position) -> WorkerRepositoryResult<()> {
        let row = position_row(position);
        let id = position.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(positions::table.find(row.id))
                .set(positions::name.eq(&row.name))
                .execute(connection)
                .map_err(|err| map_position_error(err, &row.name))?;
            if updated == 0 {
                return Err(WorkerRepositoryError::PositionNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_position(&self, id: PositionId) -> WorkerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(positions::table.find(id.into_inner()))
                .execute(connection)
                .map_err(query_failed::<WorkerRepositoryError>)?;
            if deleted == 0 {
                return Err(WorkerRepositoryError::PositionNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_position(&self, id: PositionId) -> WorkerRepositoryResult<Option<Position>> {
        self.run_blocking(move |connection| {
            let row = positions::table
                .find(id.into_inner())
                .select(PositionRow::as_select())
                .first(connection)
                .optional()
                .map_err(query_failed::<WorkerRepositoryError>)?;
            row.map(row_to_position).transpose()
        })
        .await
    }

    async fn list_positions(&self) -> WorkerRepositoryResult<Vec<Position>> {
        self.run_blocking(move |connection| {
            positions::table
                .order(positions::name.asc())
                .select(PositionRow::as_select())
                .load(connection)
                .map_err(query_failed::<WorkerRepositoryError>)?
                .into_iter()
                .map(row_to_position)
                .collect()
        })
        .await
    }
}

fn check_unique(connection: &mut PgConnection, row: &WorkerRow) -> WorkerRepositoryResult<()> {
    let username_taken: bool = diesel::select(diesel::dsl::exists(
        workers::table
            .filter(workers::username.eq(&row.username))
            .filter(workers::id.ne(row.id)),
    ))
    .get_result(connection)
    .map_err(query_failed::<WorkerRepositoryError>)?;
    if username_taken {
        return Err(WorkerRepositoryError::DuplicateUsername(row.username.clone()));
    }

    let email_taken: bool = diesel::select(diesel::dsl::exists(
        workers::table
            .filter(workers::email.ilike(escape_like(&row.email)))
            .filter(workers::id.ne(row.id)),
    ))
    .get_result(connection)
    .map_err(query_failed::<WorkerRepositoryError>)?;
    if email_taken {
        return Err(WorkerRepositoryError::DuplicateEmail(row.email.clone()));
    }
    Ok(())
}

fn map_write_error(err: DieselError, row: &WorkerRow) -> WorkerRepositoryError {
    if let DieselError::DatabaseError(kind, info) = &err {
        match kind {
            DatabaseErrorKind::UniqueViolation
                if info.constraint_name() == Some("workers_username_unique") =>
            {
                return WorkerRepositoryError::DuplicateUsername(row.username.clone());
            }
            DatabaseErrorKind::UniqueViolation => {
                return WorkerRepositoryError::DuplicateEmail(row.email.clone());
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                if let Some(position) = row.position_id {
                    return WorkerRepositoryError::PositionNotFound(PositionId::from_uuid(position));
                }
            }
            _ => {}
        }
    }
    query_failed(err)
}

fn map_position_error(err: DieselError, name: &str) -> WorkerRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            WorkerRepositoryError::DuplicatePosition(name.to_owned())
        }
        other => query_failed(other),
    }
}

fn to_row(worker: &Worker) -> WorkerRow {
    WorkerRow {
        id: worker.id().into_inner(),
        username: worker.username().as_str().to_owned(),
        email: worker.email().as_str().to_owned(),
        first_name: worker.first_name().to_owned(),
        last_name: worker.last_name().to_owned(),
        position_id: worker.position().map(PositionId::into_inner),
        password: worker.password().as_str().to_owned(),
        is_active: worker.is_active(),
        is_staff: worker.is_staff(),
        is_superuser: worker.is_superuser(),
        date_joined: worker.date_joined(),
    }
}

fn row_to_worker(row: WorkerRow) -> WorkerRepositoryResult<Worker> {
    let corrupt = |reason: String| WorkerRepositoryError::from(StoreFailure::corrupt("workers", reason));
    let username = Username::new(&row.username).map_err(|err| corrupt(err.to_string()))?;
    let profile = WorkerProfile {
        email: Email::new(&row.email).map_err(|err| corrupt(err.to_string()))?,
        first_name: row.first_name,
        last_name: row.last_name,
        position: row.position_id.map(PositionId::from_uuid),
    };
    Ok(Worker::from_persisted(PersistedWorkerData {
        id: WorkerId::from_uuid(row.id),
        username,
        profile,
        password: PasswordHash::from_persisted(row.password),
        is_active: row.is_active,
        is_staff: row.is_staff,
        is_superuser: row.is_superuser,
        date_joined: row.date_joined,
    }))
}

fn position_row(position: &Position) -> PositionRow {
    PositionRow {
        id: position.id().into_inner(),
        name: position.name().as_str().to_owned(),
    }
}

fn row_to_position(row: PositionRow) -> WorkerRepositoryResult<Position> {
    let name = PositionName::new(&row.name)
        .map_err(|err| WorkerRepositoryError::from(StoreFailure::corrupt("positions", err)))?;
    Ok(Position::from_persisted(PositionId::from_uuid(row.id), name))
}
