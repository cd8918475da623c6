#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::NaiveDate;
use subscription_tracker::{
    application::usecases::subscriptions::SubscriptionUseCase,
    config::config_model::BackendServer,
    domain::{
        entities::subscriptions::{
            InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionEntity,
        },
        repositories::subscriptions::{RepositoryError, RepositoryResult, SubscriptionRepository},
        value_objects::subscriptions::TotalCostFilter,
    },
    infrastructure::axum_http::{http_serve, routers},
};
use uuid::Uuid;

/// Mutable columns shared by the insert and update entities.
struct RowFields {
    service_name: String,
    price: i32,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl From<InsertSubscriptionEntity> for RowFields {
    fn from(value: InsertSubscriptionEntity) -> Self {
        Self {
            service_name: value.service_name,
            price: value.price,
            user_id: value.user_id,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

impl From<UpdateSubscriptionEntity> for RowFields {
    fn from(value: UpdateSubscriptionEntity) -> Self {
        Self {
            service_name: value.service_name,
            price: value.price,
            user_id: value.user_id,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

fn stored_row(id: Uuid, fields: RowFields) -> SubscriptionEntity {
    SubscriptionEntity {
        id,
        service_name: fields.service_name,
        price: fields.price,
        user_id: fields.user_id,
        start_date: fields.start_date,
        end_date: fields.end_date,
    }
}

/// Same predicates as the SQL query; a `to_date` bound never matches an open-ended row.
pub fn matches_filter(filter: &TotalCostFilter, row: &SubscriptionEntity) -> bool {
    filter.user_id.is_none_or(|user_id| row.user_id == user_id)
        && filter
            .service_name
            .as_deref()
            .is_none_or(|name| row.service_name == name)
        && filter
            .from_date
            .is_none_or(|from_date| row.start_date >= from_date)
        && filter
            .to_date
            .is_none_or(|to_date| row.end_date.is_some_and(|end| end <= to_date))
}

/// Vec-backed repository with the same contract as the Postgres one.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: Mutex<Vec<SubscriptionEntity>>,
}

impl InMemorySubscriptionRepository {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> RepositoryResult<Uuid> {
        let id = Uuid::new_v4();
        self.rows
            .lock()
            .unwrap()
            .push(stored_row(id, insert_subscription_entity.into()));
        Ok(id)
    }

    async fn find_by_id(&self, subscription_id: Uuid) -> RepositoryResult<SubscriptionEntity> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == subscription_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<SubscriptionEntity>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn update(
        &self,
        subscription_id: Uuid,
        update_subscription_entity: UpdateSubscriptionEntity,
    ) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == subscription_id)
            .ok_or(RepositoryError::NotFound)?;
        *row = stored_row(subscription_id, update_subscription_entity.into());
        Ok(())
    }

    async fn delete_by_id(&self, subscription_id: Uuid) -> RepositoryResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != subscription_id);
        if rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn total_cost(&self, filter: TotalCostFilter) -> RepositoryResult<i64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| matches_filter(&filter, row))
            .map(|row| i64::from(row.price))
            .sum())
    }
}

pub fn test_server_config() -> BackendServer {
    BackendServer {
        port: 0,
        body_limit: 1,
        timeout: 30,
    }
}

/// Full application router over a fresh in-memory store.
pub fn test_app() -> (Router, Arc<InMemorySubscriptionRepository>) {
    let repository = Arc::new(InMemorySubscriptionRepository::default());
    let usecase = SubscriptionUseCase::new(Arc::clone(&repository));
    let app = http_serve::build_app(
        &test_server_config(),
        routers::subscriptions::router(Arc::new(usecase)),
    )
    .unwrap();
    (app, repository)
}
