//! Worker ports over the in-memory store.

use crate::persistence::InMemoryStore;
use crate::persistence::memory::Tables;
use crate::worker::{
    domain::{Position, PositionId, Username, Worker, WorkerId},
    ports::{
        PositionRepository, WorkerQuery, WorkerRepository, WorkerRepositoryError,
        WorkerRepositoryResult,
    },
};
use async_trait::async_trait;

fn check_unique(tables: &Tables, worker: &Worker) -> WorkerRepositoryResult<()> {
    let email = worker.email().normalized();
    for other in tables.workers.values().filter(|other| other.id() != worker.id()) {
        if other.username() == worker.username() {
            return Err(WorkerRepositoryError::DuplicateUsername(
                worker.username().as_str().to_owned(),
            ));
        }
        if other.email().normalized() == email {
            return Err(WorkerRepositoryError::DuplicateEmail(
                worker.email().as_str().to_owned(),
            ));
        }
    }
    if let Some(position) = worker.position() {
        if !tables.positions.contains_key(&position) {
            return Err(WorkerRepositoryError::PositionNotFound(position));
        }
    }
    Ok(())
}

fn check_position_name(tables: &Tables, position: &Position) -> WorkerRepositoryResult<()> {
    let taken = tables
        .positions
        .values()
        .any(|other| other.id() != position.id() && other.name() == position.name());
    if taken {
        return Err(WorkerRepositoryError::DuplicatePosition(
            position.name().as_str().to_owned(),
        ));
    }
    Ok(())
}

#[async_trait]
impl WorkerRepository for InMemoryStore {
    async fn store(&self, worker: &Worker) -> WorkerRepositoryResult<()> {
        let mut tables = self.write()?;
        check_unique(&tables, worker)?;
        tables.workers.insert(worker.id(), worker.clone());
        Ok(())
    }

    async fn update(&self, worker: &Worker) -> WorkerRepositoryResult<()> {
        let mut tables = self.write()?;
        if !tables.workers.contains_key(&worker.id()) {
            return Err(WorkerRepositoryError::NotFound(worker.id()));
        }
        check_unique(&tables, worker)?;
        tables.workers.insert(worker.id(), worker.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: WorkerId) -> WorkerRepositoryResult<Option<Worker>> {
        Ok(self.read()?.workers.get(&id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> WorkerRepositoryResult<Option<Worker>> {
        let tables = self.read()?;
        Ok(tables
            .workers
            .values()
            .find(|worker| worker.username() == username)
            .cloned())
    }

    async fn find_many(&self, ids: &[WorkerId]) -> WorkerRepositoryResult<Vec<Worker>> {
        let tables = self.read()?;
        let mut workers: Vec<Worker> = ids
            .iter()
            .filter_map(|id| tables.workers.get(id).cloned())
            .collect();
        workers.sort_by(|left, right| left.username().as_str().cmp(right.username().as_str()));
        workers.dedup_by_key(|worker| worker.id());
        Ok(workers)
    }

    async fn list(&self, query: &WorkerQuery) -> WorkerRepositoryResult<Vec<Worker>> {
        let tables = self.read()?;
        let mut workers: Vec<Worker> = tables
            .workers
            .values()
            .filter(|worker| query.matches(worker))
            .cloned()
            .collect();
        workers.sort_by(|left, right| {
            right
                .date_joined()
                .cmp(&left.date_joined())
                .then_with(|| left.username().as_str().cmp(right.username().as_str()))
        });
        Ok(workers)
    }
}

#[async_trait]
impl PositionRepository for InMemoryStore {
    async fn store_position(&self, position: &Position) -> WorkerRepositoryResult<()> {
        let mut tables = self.write()?;
        check_position_name(&tables, position)?;
        tables.positions.insert(position.id(), position.clone());
        Ok(())
    }

    async fn update_position(&self, position: &Position) -> WorkerRepositoryResult<()> {
        let mut tables = self.write()?;
        if !tables.positions.contains_key(&position.id()) {
            return Err(WorkerRepositoryError::PositionNotFound(position.id()));
        }
        check_position_name(&tables, position)?;
        tables.positions.insert(position.id(), position.clone());
        Ok(())
    }

    async fn delete_position(&self, id: PositionId) -> WorkerRepositoryResult<()> {
        let mut tables = self.write()?;
        if tables.positions.remove(&id).is_none() {
            return Err(WorkerRepositoryError::PositionNotFound(id));
        }
        for worker in tables.workers.values_mut() {
            if worker.position() == Some(id) {
                let mut profile = worker.profile().clone();
                profile.position = None;
                worker.update_profile(profile);
            }
        }
        Ok(())
    }

    async fn find_position(&self, id: PositionId) -> WorkerRepositoryResult<Option<Position>> {
        Ok(self.read()?.positions.get(&id).cloned())
    }

    async fn list_positions(&self) -> WorkerRepositoryResult<Vec<Position>> {
        let tables = self.read()?;
        let mut positions: Vec<Position> = tables.positions.values().cloned().collect();
        positions.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(positions)
    }
}
