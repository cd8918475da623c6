use async_trait::async_trait;
use diesel::{
    RunQueryDsl, delete,
    dsl::sum,
    insert_into,
    pg::Pg,
    prelude::*,
    sql_types::{BigInt, Nullable},
    update,
};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::subscriptions::{
            InsertSubscriptionEntity, SubscriptionEntity, UpdateSubscriptionEntity,
        },
        repositories::subscriptions::{RepositoryError, RepositoryResult, SubscriptionRepository},
        value_objects::subscriptions::TotalCostFilter,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::subscriptions},
};

type BoxedTotalCostQuery = subscriptions::BoxedQuery<'static, Pg, Nullable<BigInt>>;

/// `SUM(price)` restricted by every present filter.
fn total_cost_query(filter: TotalCostFilter) -> BoxedTotalCostQuery {
    // Each filter pushes its predicate and its bind together.
    let mut query = subscriptions::table
        .select(sum(subscriptions::price))
        .into_boxed();

    if let Some(user_id) = filter.user_id {
        query = query.filter(subscriptions::user_id.eq(user_id));
    }

    if let Some(service_name) = filter.service_name {
        query = query.filter(subscriptions::service_name.eq(service_name));
    }

    if let Some(from_date) = filter.from_date {
        query = query.filter(subscriptions::start_date.ge(from_date));
    }

    if let Some(to_date) = filter.to_date {
        query = query.filter(subscriptions::end_date.le(to_date));
    }

    query
}

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

// Diesel is synchronous, so checkout and queries run on the blocking threadpool.
#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> RepositoryResult<Uuid> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> RepositoryResult<Uuid> {
            let mut conn = db_pool.get()?;

            let result = insert_into(subscriptions::table)
                .values(&insert_subscription_entity)
                .returning(subscriptions::id)
                .get_result::<Uuid>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn find_by_id(&self, subscription_id: Uuid) -> RepositoryResult<SubscriptionEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> RepositoryResult<SubscriptionEntity> {
            let mut conn = db_pool.get()?;

            let result = subscriptions::table
                .filter(subscriptions::id.eq(subscription_id))
                .select(SubscriptionEntity::as_select())
                .first::<SubscriptionEntity>(&mut conn)?;

            Ok(result)
        })
        .await??)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<SubscriptionEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> RepositoryResult<Vec<SubscriptionEntity>> {
            let mut conn = db_pool.get()?;

            let results = subscriptions::table
                .select(SubscriptionEntity::as_select())
                .order((subscriptions::start_date.asc(), subscriptions::id.asc()))
                .load::<SubscriptionEntity>(&mut conn)?;

            Ok(results)
        })
        .await??)
    }

    async fn update(
        &self,
        subscription_id: Uuid,
        update_subscription_entity: UpdateSubscriptionEntity,
    ) -> RepositoryResult<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> RepositoryResult<()> {
            let mut conn = db_pool.get()?;

            let affected = update(subscriptions::table)
                .filter(subscriptions::id.eq(subscription_id))
                .set(&update_subscription_entity)
                .execute(&mut conn)?;

            if affected == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
        .await??)
    }

    async fn delete_by_id(&self, subscription_id: Uuid) -> RepositoryResult<()> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> RepositoryResult<()> {
            let mut conn = db_pool.get()?;

            let affected = delete(subscriptions::table)
                .filter(subscriptions::id.eq(subscription_id))
                .execute(&mut conn)?;

            if affected == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
        .await??)
    }

    async fn total_cost(&self, filter: TotalCostFilter) -> RepositoryResult<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> RepositoryResult<i64> {
            let mut conn = db_pool.get()?;

            let total = total_cost_query(filter).first::<Option<i64>>(&mut conn)?;

            Ok(total.unwrap_or(0))
        })
        .await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use diesel::{
        PgConnection,
        r2d2::{ConnectionManager, Pool},
    };
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    fn sql_for(filter: TotalCostFilter) -> String {
        diesel::debug_query::<Pg, _>(&total_cost_query(filter)).to_string()
    }

    fn position(sql: &str, needle: &str) -> usize {
        sql.find(needle)
            .unwrap_or_else(|| panic!("`{needle}` not in `{sql}`"))
    }

    #[test]
    fn total_cost_without_filters_has_no_where_clause() {
        let sql = sql_for(TotalCostFilter::default());

        assert!(sql.contains(r#"("subscriptions"."price") FROM "subscriptions""#), "{sql}");
        assert!(!sql.contains("WHERE"), "{sql}");
        assert!(sql.ends_with("-- binds: []"), "{sql}");
    }

    #[test]
    fn total_cost_single_filter_binds_one_value() {
        let sql = sql_for(TotalCostFilter {
            service_name: Some("Netflix".to_string()),
            ..Default::default()
        });

        assert!(sql.contains(r#""subscriptions"."service_name" = $1"#), "{sql}");
        assert!(!sql.contains("$2"), "{sql}");
        assert!(sql.ends_with(r#"-- binds: ["Netflix"]"#), "{sql}");
    }

    #[test]
    fn total_cost_all_filters_keep_clause_and_bind_order() {
        let user_id = Uuid::parse_str("60601fee-2bf1-4721-ae6f-7636e79a0cba").unwrap();
        let from_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to_date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        let sql = sql_for(TotalCostFilter {
            user_id: Some(user_id),
            service_name: Some("Netflix".to_string()),
            from_date: Some(from_date),
            to_date: Some(to_date),
        });

        let user = position(&sql, r#""subscriptions"."user_id" = $1"#);
        let name = position(&sql, r#""subscriptions"."service_name" = $2"#);
        let from = position(&sql, r#""subscriptions"."start_date" >= $3"#);
        let to = position(&sql, r#""subscriptions"."end_date" <= $4"#);
        assert!(user < name && name < from && from < to, "{sql}");

        let binds = format!("-- binds: [{user_id:?}, \"Netflix\", {from_date:?}, {to_date:?}]");
        assert!(sql.ends_with(&binds), "{sql}");
    }

    #[test]
    fn total_cost_date_filters_alone_start_at_first_placeholder() {
        let sql = sql_for(TotalCostFilter {
            to_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..Default::default()
        });

        assert!(sql.contains(r#""subscriptions"."end_date" <= $1"#), "{sql}");
        assert!(!sql.contains("start_date"), "{sql}");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn pool_wait_does_not_block_the_runtime() {
        // Nothing listens on port 1, so checkout waits for the full timeout.
        let manager = ConnectionManager::<PgConnection>::new("postgres://127.0.0.1:1/unreachable");
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_millis(600))
            .build_unchecked(manager);
        let repository = SubscriptionPostgres::new(Arc::new(pool));

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(50));
                loop {
                    interval.tick().await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        let result = repository.list_all().await;
        ticker.abort();

        assert!(matches!(result, Err(RepositoryError::Persistence(_))));
        assert!(
            ticks.load(Ordering::SeqCst) >= 5,
            "runtime starved: {} ticks",
            ticks.load(Ordering::SeqCst)
        );
    }
}
