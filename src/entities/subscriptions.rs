use crate::models::{Subscription, YearMonth};
use chrono::NaiveDate;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_name: String,
    pub monthly_cost: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Subscription {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            service_name: m.service_name,
            monthly_cost: m.monthly_cost,
            start_date: YearMonth::from(m.start_date),
            end_date: m.end_date.map(YearMonth::from),
        }
    }
}

impl From<&Subscription> for ActiveModel {
    fn from(s: &Subscription) -> Self {
        Self {
            id: Set(s.id),
            user_id: Set(s.user_id),
            service_name: Set(s.service_name.clone()),
            monthly_cost: Set(s.monthly_cost),
            start_date: Set(s.start_date.first_day()),
            end_date: Set(s.end_date.map(|d| d.first_day())),
        }
    }
}
