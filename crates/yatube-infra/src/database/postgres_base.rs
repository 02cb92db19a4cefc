use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{DbConn, DbErr, EntityTrait, PrimaryKeyTrait, SqlErr};

use yatube_core::error::RepoError;
use yatube_core::ports::BaseRepository;

/// Generic PostgreSQL repository over one SeaORM entity.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

impl<E> Clone for PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

/// Map a read failure.
pub(crate) fn query_err(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(e.to_string()),
        _ => RepoError::Query(e.to_string()),
    }
}

/// Map a write failure, surfacing unique and foreign key violations as
/// `RepoError::Constraint`.
pub(crate) fn write_err(e: DbErr) -> RepoError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail))
        | Some(SqlErr::ForeignKeyConstraintViolation(detail)) => RepoError::Constraint(detail),
        _ => match e {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
            other => query_err(other),
        },
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: Sync + Send,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
