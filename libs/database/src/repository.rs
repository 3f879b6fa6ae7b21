//! Generic SeaORM repository helper shared by domain crates.
//!
//! Domain repositories compose `BaseRepository<Entity>` for the CRUD operations
//! that are identical across tables, and write their own queries for anything
//! entity-specific (filters, joins, raw SQL transactions).

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, DeleteResult, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait,
};

/// Marker bound for entities whose primary key can be used directly in `find_by_id`/`delete_by_id`.
pub trait UuidEntity: EntityTrait {}

impl<T> UuidEntity for T where T: EntityTrait {}

/// Thin wrapper around a `DatabaseConnection` scoped to one SeaORM entity.
pub struct BaseRepository<E: EntityTrait> {
    db: DatabaseConnection,
    _entity: std::marker::PhantomData<E>,
}

impl<E: EntityTrait> BaseRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: std::marker::PhantomData,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn insert<A>(&self, active_model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + Send,
    {
        active_model.insert(&self.db).await
    }

    pub async fn find_by_id(
        &self,
        id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
    ) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(&self.db).await
    }

    pub async fn update<A>(&self, active_model: A) -> Result<E::Model, DbErr>
    where
        A: ActiveModelTrait<Entity = E> + Send,
    {
        active_model.update(&self.db).await
    }

    pub async fn delete_by_id(
        &self,
        id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
    ) -> Result<u64, DbErr>
    where
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        let result: DeleteResult = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
