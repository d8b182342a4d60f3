//! SeaORM store for subscriptions.
//!
//! Every query is generic over [`ConnectionTrait`], so the same code runs on a
//! pooled connection or inside a transaction handed out by
//! [`ConnectionProvider`](crate::database::ConnectionProvider).

use crate::entities::subscription_entity as subscriptions;
use crate::error::{AppError, AppResult};
use crate::models::{CostPeriod, Subscription};
use log::debug;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert<C: ConnectionTrait>(&self, conn: &C, s: &Subscription) -> AppResult<()> {
        debug!("Inserting subscription {}", s.id);
        subscriptions::Entity::insert(subscriptions::ActiveModel::from(s))
            .exec(conn)
            .await
            .map_err(AppError::database("insert subscription"))?;
        Ok(())
    }

    /// Rewrites every mutable column; returns the number of rows touched.
    pub async fn update<C: ConnectionTrait>(&self, conn: &C, s: &Subscription) -> AppResult<u64> {
        debug!("Updating subscription {}", s.id);
        let changes = subscriptions::ActiveModel {
            id: NotSet,
            ..subscriptions::ActiveModel::from(s)
        };
        let res = subscriptions::Entity::update_many()
            .set(changes)
            .filter(subscriptions::Column::Id.eq(s.id))
            .exec(conn)
            .await
            .map_err(AppError::database("update subscription"))?;
        Ok(res.rows_affected)
    }

    pub async fn delete_by_id<C: ConnectionTrait>(&self, conn: &C, id: Uuid) -> AppResult<u64> {
        debug!("Deleting subscription {id}");
        let res = subscriptions::Entity::delete_by_id(id)
            .exec(conn)
            .await
            .map_err(AppError::database("delete subscription"))?;
        Ok(res.rows_affected)
    }

    pub async fn get_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Subscription>> {
        let model = subscriptions::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(AppError::database("read subscription"))?;
        Ok(model.map(Subscription::from))
    }

    /// Newest first: `start_date` desc, then `id` desc.
    pub async fn list_by_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<Subscription>> {
        let models = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .order_by_desc(subscriptions::Column::StartDate)
            .order_by_desc(subscriptions::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(conn)
            .await
            .map_err(AppError::database("list subscriptions"))?;
        Ok(models.into_iter().map(Subscription::from).collect())
    }

    /// Most recent subscription of the pair by `start_date`; equal starts are
    /// settled by the larger `id`.
    pub async fn latest_for_pair<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        service_name: &str,
    ) -> AppResult<Option<Subscription>> {
        let model = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::ServiceName.eq(service_name))
            .order_by_desc(subscriptions::Column::StartDate)
            .order_by_desc(subscriptions::Column::Id)
            .one(conn)
            .await
            .map_err(AppError::database("read latest subscription"))?;
        Ok(model.map(Subscription::from))
    }

    /// Another row of `s`'s pair whose window runs past `s.start_date` and
    /// starts before `s.end_date`. Sharing a boundary month is not a conflict.
    pub async fn find_conflicting<C: ConnectionTrait>(
        &self,
        conn: &C,
        s: &Subscription,
    ) -> AppResult<Option<Subscription>> {
        let mut query = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(s.user_id))
            .filter(subscriptions::Column::ServiceName.eq(s.service_name.as_str()))
            .filter(subscriptions::Column::Id.ne(s.id))
            .filter(
                Condition::any()
                    .add(subscriptions::Column::EndDate.is_null())
                    .add(subscriptions::Column::EndDate.gt(s.start_date.first_day())),
            );
        if let Some(end) = s.end_date {
            query = query.filter(subscriptions::Column::StartDate.lt(end.first_day()));
        }

        let model = query
            .order_by_desc(subscriptions::Column::StartDate)
            .one(conn)
            .await
            .map_err(AppError::database("read conflicting subscription"))?;
        Ok(model.map(Subscription::from))
    }

    /// Rows of `user_id` (optionally one service) active at some month of `period`.
    pub async fn matching_for_period<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        service_name: Option<&str>,
        period: &CostPeriod,
    ) -> AppResult<Vec<Subscription>> {
        let mut query = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::StartDate.lte(period.end().first_day()))
            .filter(
                Condition::any()
                    .add(subscriptions::Column::EndDate.is_null())
                    .add(subscriptions::Column::EndDate.gte(period.start().first_day())),
            );
        if let Some(name) = service_name {
            query = query.filter(subscriptions::Column::ServiceName.eq(name));
        }

        let models = query
            .all(conn)
            .await
            .map_err(AppError::database("aggregate subscription cost"))?;
        Ok(models.into_iter().map(Subscription::from).collect())
    }

    pub async fn aggregate_cost<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        service_name: Option<&str>,
        period: &CostPeriod,
    ) -> AppResult<i64> {
        if period.is_empty() {
            return Ok(0);
        }
        let matching = self
            .matching_for_period(conn, user_id, service_name, period)
            .await?;
        period.total_cost(&matching)
    }
}
