use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::LibraryResult;

#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // create an entity, failing if its key is already taken
    async fn create(&self, entity: &Entity) -> LibraryResult<usize>;

    // replaces every mutable field of an existing entity
    async fn update(&self, entity: &Entity) -> LibraryResult<usize>;

    // get an entity
    async fn get(&self, id: &str) -> LibraryResult<Entity>;

    // delete an entity
    async fn delete(&self, id: &str) -> LibraryResult<usize>;

    // all entities in storage order
    async fn list(&self) -> LibraryResult<Vec<Entity>>;

    // entities matching every field in the predicate
    async fn query(&self, predicate: &HashMap::<String, String>) -> LibraryResult<Vec<Entity>>;
}
