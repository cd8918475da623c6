use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::subscriptions::SubscriptionUseCase,
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::subscriptions::{
            TotalCostFilterModel, TotalCostModel, TotalCostQuery, UpsertSubscriptionModel,
        },
    },
    infrastructure::{
        axum_http::error_responses::bad_request,
        postgres::{
            postgres_connection::PgPoolSquad, repositories::subscriptions::SubscriptionPostgres,
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscriptions_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let subscriptions_usecase = SubscriptionUseCase::new(Arc::new(subscriptions_repository));

    router(Arc::new(subscriptions_usecase))
}

/// Subscription routes over any repository implementation.
pub fn router<T>(subscriptions_usecase: Arc<SubscriptionUseCase<T>>) -> Router
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/total", get(total_cost::<T>))
        .route(
            "/:id",
            get(get_by_id::<T>).put(update::<T>).delete(delete_by_id::<T>),
        )
        .with_state(subscriptions_usecase)
}

fn parse_subscription_id(raw: &str) -> Result<Uuid, axum::response::Response> {
    Uuid::parse_str(raw).map_err(|_| {
        warn!(raw_id = raw, "subscriptions: malformed subscription id");
        bad_request("invalid subscription id")
    })
}

fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    warn!(error = %rejection.body_text(), "subscriptions: rejected request body");
    bad_request("Invalid JSON")
}

pub async fn create<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    payload: Result<Json<UpsertSubscriptionModel>, JsonRejection>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match subscriptions_usecase.create_subscription(model).await {
        Ok(subscription_id) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/subscriptions/{subscription_id}"))],
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    match subscriptions_usecase.list_subscriptions().await {
        Ok(subscriptions) => Json(subscriptions).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_by_id<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Path(raw_id): Path<String>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription_id = match parse_subscription_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match subscriptions_usecase.get_subscription(subscription_id).await {
        Ok(subscription) => Json(subscription).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpsertSubscriptionModel>, JsonRejection>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription_id = match parse_subscription_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection(rejection),
    };

    match subscriptions_usecase
        .update_subscription(subscription_id, model)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn delete_by_id<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Path(raw_id): Path<String>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let subscription_id = match parse_subscription_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match subscriptions_usecase.delete_subscription(subscription_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn total_cost<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    query: Result<Query<TotalCostQuery>, QueryRejection>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "subscriptions: rejected total cost query");
            return bad_request("invalid query string");
        }
    };

    let user_id = match query.user_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(raw_user_id = raw, "subscriptions: malformed user_id filter");
                return bad_request("invalid user_id");
            }
        },
    };

    info!(
        user_id = ?user_id,
        service_name = ?query.service_name,
        from_date = ?query.from_date,
        to_date = ?query.to_date,
        "subscriptions: total cost request received"
    );

    let filter = TotalCostFilterModel {
        user_id,
        service_name: query.service_name,
        from_date: query.from_date,
        to_date: query.to_date,
    };

    match subscriptions_usecase.total_cost(filter).await {
        Ok(total) => Json(TotalCostModel { total }).into_response(),
        Err(err) => err.into_response(),
    }
}
