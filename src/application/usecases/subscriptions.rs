use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{InsertSubscriptionEntity, UpdateSubscriptionEntity},
    repositories::subscriptions::{RepositoryError, SubscriptionRepository},
    value_objects::{
        calendar_dates::parse_calendar_date,
        subscriptions::{
            SubscriptionModel, TotalCostFilter, TotalCostFilterModel, UpsertSubscriptionModel,
        },
    },
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("{0}")]
    Validation(String),
    #[error("subscription not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::Validation(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for SubscriptionError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => SubscriptionError::NotFound,
            RepositoryError::Persistence(err) => SubscriptionError::Internal(err),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Validated create/update payload.
#[derive(Debug, Clone, PartialEq)]
struct SubscriptionFields {
    service_name: String,
    price: i32,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
}

impl SubscriptionFields {
    fn validate(model: UpsertSubscriptionModel) -> UseCaseResult<Self> {
        let service_name = model.service_name.trim();
        if service_name.is_empty() {
            return Err(SubscriptionError::Validation(
                "service_name is required".to_string(),
            ));
        }

        if model.price < 0 {
            return Err(SubscriptionError::Validation(
                "price must be non-negative".to_string(),
            ));
        }
        let price = i32::try_from(model.price).map_err(|_| {
            SubscriptionError::Validation(format!("price must be <= {}", i32::MAX))
        })?;

        let (start_date, end_date) =
            parse_date_range("start_date", &model.start_date, "end_date", model.end_date.as_deref())?;
        let start_date = start_date.ok_or_else(|| {
            SubscriptionError::Validation("start_date is required".to_string())
        })?;

        Ok(Self {
            service_name: service_name.to_string(),
            price,
            user_id: model.user_id,
            start_date,
            end_date,
        })
    }
}

impl From<SubscriptionFields> for InsertSubscriptionEntity {
    fn from(value: SubscriptionFields) -> Self {
        Self {
            service_name: value.service_name,
            price: value.price,
            user_id: value.user_id,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

impl From<SubscriptionFields> for UpdateSubscriptionEntity {
    fn from(value: SubscriptionFields) -> Self {
        Self {
            service_name: value.service_name,
            price: value.price,
            user_id: value.user_id,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

/// Parses both bounds and requires `start < end` when both are present.
fn parse_date_range(
    start_field: &'static str,
    start: &str,
    end_field: &'static str,
    end: Option<&str>,
) -> UseCaseResult<(Option<NaiveDate>, Option<NaiveDate>)> {
    let start = if start.is_empty() {
        None
    } else {
        Some(parse_calendar_date(start_field, start).map_err(validation)?)
    };
    let end = end
        .map(|raw| parse_calendar_date(end_field, raw).map_err(validation))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(SubscriptionError::Validation(format!(
                "{start_field} must be before {end_field}"
            )));
        }
    }

    Ok((start, end))
}

fn validation(err: impl std::fmt::Display) -> SubscriptionError {
    SubscriptionError::Validation(err.to_string())
}

fn ensure_subscription_id(subscription_id: Uuid) -> UseCaseResult<()> {
    if subscription_id.is_nil() {
        return Err(SubscriptionError::Validation(
            "subscription id is required".to_string(),
        ));
    }
    Ok(())
}

pub struct SubscriptionUseCase<T>
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repository: Arc<T>,
}

impl<T> SubscriptionUseCase<T>
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repository: Arc<T>) -> Self {
        Self {
            subscription_repository,
        }
    }

    pub async fn create_subscription(&self, model: UpsertSubscriptionModel) -> UseCaseResult<Uuid> {
        let user_id = model.user_id;
        let fields = SubscriptionFields::validate(model).map_err(|err| {
            warn!(%user_id, error = %err, "subscriptions: rejected create request");
            err
        })?;

        let subscription_id = self
            .subscription_repository
            .create(fields.into())
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to create subscription");
                SubscriptionError::from(err)
            })?;

        info!(%subscription_id, %user_id, "subscriptions: subscription created");
        Ok(subscription_id)
    }

    pub async fn get_subscription(&self, subscription_id: Uuid) -> UseCaseResult<SubscriptionModel> {
        ensure_subscription_id(subscription_id)?;

        let subscription = self
            .subscription_repository
            .find_by_id(subscription_id)
            .await
            .map_err(|err| {
                match &err {
                    RepositoryError::NotFound => {
                        info!(%subscription_id, "subscriptions: subscription not found")
                    }
                    RepositoryError::Persistence(_) => error!(
                        %subscription_id,
                        db_error = ?err,
                        "subscriptions: failed to load subscription"
                    ),
                }
                SubscriptionError::from(err)
            })?;

        Ok(subscription.into())
    }

    pub async fn list_subscriptions(&self) -> UseCaseResult<Vec<SubscriptionModel>> {
        let subscriptions = self
            .subscription_repository
            .list_all()
            .await
            .map_err(|err| {
                error!(db_error = ?err, "subscriptions: failed to list subscriptions");
                SubscriptionError::from(err)
            })?;

        let subscription_count = subscriptions.len();
        info!(subscription_count, "subscriptions: subscriptions listed");
        Ok(subscriptions.into_iter().map(SubscriptionModel::from).collect())
    }

    pub async fn update_subscription(
        &self,
        subscription_id: Uuid,
        model: UpsertSubscriptionModel,
    ) -> UseCaseResult<()> {
        ensure_subscription_id(subscription_id)?;
        let fields = SubscriptionFields::validate(model).map_err(|err| {
            warn!(%subscription_id, error = %err, "subscriptions: rejected update request");
            err
        })?;

        self.subscription_repository
            .update(subscription_id, fields.into())
            .await
            .map_err(|err| {
                match &err {
                    RepositoryError::NotFound => {
                        info!(%subscription_id, "subscriptions: no subscription to update")
                    }
                    RepositoryError::Persistence(_) => error!(
                        %subscription_id,
                        db_error = ?err,
                        "subscriptions: failed to update subscription"
                    ),
                }
                SubscriptionError::from(err)
            })?;

        info!(%subscription_id, "subscriptions: subscription updated");
        Ok(())
    }

    pub async fn delete_subscription(&self, subscription_id: Uuid) -> UseCaseResult<()> {
        ensure_subscription_id(subscription_id)?;

        self.subscription_repository
            .delete_by_id(subscription_id)
            .await
            .map_err(|err| {
                match &err {
                    RepositoryError::NotFound => {
                        info!(%subscription_id, "subscriptions: no subscription to delete")
                    }
                    RepositoryError::Persistence(_) => error!(
                        %subscription_id,
                        db_error = ?err,
                        "subscriptions: failed to delete subscription"
                    ),
                }
                SubscriptionError::from(err)
            })?;

        info!(%subscription_id, "subscriptions: subscription deleted");
        Ok(())
    }

    pub async fn total_cost(&self, filter: TotalCostFilterModel) -> UseCaseResult<i64> {
        let service_name = filter
            .service_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let from_date = filter.from_date.as_deref().map(str::trim).unwrap_or_default();
        let to_date = filter
            .to_date
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty());

        let (from_date, to_date) = parse_date_range("from_date", from_date, "to_date", to_date)
            .map_err(|err| {
                warn!(error = %err, "subscriptions: rejected total cost filters");
                err
            })?;

        let filter = TotalCostFilter {
            user_id: filter.user_id,
            service_name,
            from_date,
            to_date,
        };

        let total = self
            .subscription_repository
            .total_cost(filter.clone())
            .await
            .map_err(|err| {
                error!(?filter, db_error = ?err, "subscriptions: failed to compute total cost");
                SubscriptionError::from(err)
            })?;

        info!(total, ?filter, "subscriptions: total cost computed");
        Ok(total)
    }
}
