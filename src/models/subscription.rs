use crate::error::{AppError, AppResult};
use crate::models::YearMonth;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const MAX_SERVICE_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_name: String,
    /// minor currency units
    pub monthly_cost: i64,
    pub start_date: YearMonth,
    /// `None` while the subscription is still running
    pub end_date: Option<YearMonth>,
}

/// Every mutable field of a subscription, before an id is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionDraft {
    pub user_id: Uuid,
    pub service_name: String,
    pub monthly_cost: i64,
    pub start_date: YearMonth,
    pub end_date: Option<YearMonth>,
}

impl SubscriptionDraft {
    pub fn validate(&self) -> AppResult<()> {
        let name = self.service_name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "service_name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_SERVICE_NAME_LEN {
            return Err(AppError::ValidationError(format!(
                "service_name must be at most {MAX_SERVICE_NAME_LEN} characters"
            )));
        }
        if self.monthly_cost < 0 {
            return Err(AppError::ValidationError(
                "price must not be negative".to_string(),
            ));
        }
        if let Some(end) = self.end_date
            && end < self.start_date
        {
            return Err(AppError::ValidationError(format!(
                "end_date {end} is before start_date {}",
                self.start_date
            )));
        }
        Ok(())
    }

    /// Attaches `id`; the service name is stored trimmed so a pair is matched
    /// the same way by every caller.
    pub fn into_subscription(self, id: Uuid) -> Subscription {
        Subscription {
            id,
            user_id: self.user_id,
            service_name: self.service_name.trim().to_string(),
            monthly_cost: self.monthly_cost,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

pub(crate) fn parse_month(field: &str, value: &str) -> AppResult<YearMonth> {
    value
        .parse()
        .map_err(|e| AppError::ValidationError(format!("invalid {field}: {e}")))
}

pub(crate) fn parse_optional_month(field: &str, value: Option<&str>) -> AppResult<Option<YearMonth>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_month(field, v).map(Some),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    /// monthly cost in minor currency units
    #[schema(example = 400)]
    pub price: i64,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: Uuid,
    #[schema(example = "07-2025")]
    pub start_date: String,
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl TryFrom<SubscriptionRequest> for SubscriptionDraft {
    type Error = AppError;

    fn try_from(req: SubscriptionRequest) -> AppResult<Self> {
        let start_date = parse_month("start_date", &req.start_date)?;
        let end_date = parse_optional_month("end_date", req.end_date.as_deref())?;
        let draft = SubscriptionDraft {
            user_id: req.user_id,
            service_name: req.service_name.trim().to_string(),
            monthly_cost: req.price,
            start_date,
            end_date,
        };
        draft.validate()?;
        Ok(draft)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    #[schema(example = "07-2025")]
    pub start_date: String,
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(s: Subscription) -> Self {
        Self {
            id: s.id,
            service_name: s.service_name,
            price: s.monthly_cost,
            user_id: s.user_id,
            start_date: s.start_date.to_string(),
            end_date: s.end_date.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListSubscriptionsQuery {
    pub user_id: Uuid,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TotalCostQuery {
    pub user_id: Uuid,
    pub service_name: Option<String>,
    #[schema(example = "01-2025")]
    pub start_date: String,
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalCostResponse {
    pub total_cost: i64,
}
