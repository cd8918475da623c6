use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{
        InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionEntity,
    },
    value_objects::subscriptions::TotalCostFilter,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::NotFound => RepositoryError::NotFound,
            other => RepositoryError::Persistence(other.into()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(value: diesel::r2d2::PoolError) -> Self {
        RepositoryError::Persistence(value.into())
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(value: tokio::task::JoinError) -> Self {
        RepositoryError::Persistence(value.into())
    }
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> RepositoryResult<Uuid>;

    async fn find_by_id(&self, subscription_id: Uuid) -> RepositoryResult<SubscriptionEntity>;

    async fn list_all(&self) -> RepositoryResult<Vec<SubscriptionEntity>>;

    /// Fails with [`RepositoryError::NotFound`] when no row has `subscription_id`.
    async fn update(
        &self,
        subscription_id: Uuid,
        update_subscription_entity: UpdateSubscriptionEntity,
    ) -> RepositoryResult<()>;

    /// Fails with [`RepositoryError::NotFound`] when no row has `subscription_id`.
    async fn delete_by_id(&self, subscription_id: Uuid) -> RepositoryResult<()>;

    /// Sum of `price` over rows matching every present filter; `0` when none match.
    async fn total_cost(&self, filter: TotalCostFilter) -> RepositoryResult<i64>;
}
