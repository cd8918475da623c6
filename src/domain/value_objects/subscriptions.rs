use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl From<SubscriptionEntity> for SubscriptionModel {
    fn from(value: SubscriptionEntity) -> Self {
        Self {
            id: value.id,
            service_name: value.service_name,
            price: value.price,
            user_id: value.user_id,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

/// Request body for create and update. Dates stay raw text until validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpsertSubscriptionModel {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Raw `/subscriptions/total` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TotalCostQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// Total-cost filters after transport decoding; dates are still unvalidated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalCostFilterModel {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// Validated filters handed to the repository. Each `Some` adds one predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalCostFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TotalCostModel {
    pub total: i64,
}
