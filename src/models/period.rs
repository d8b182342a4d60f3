//! Month-granular cost aggregation.
//!
//! A subscription contributes `monthly_cost × overlap_months`, where
//! `overlap_months` counts the calendar months, inclusive on both ends, that
//! its active window shares with the queried period.

use crate::error::{AppError, AppResult};
use crate::models::{Subscription, YearMonth};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostPeriod {
    start: YearMonth,
    end: YearMonth,
}

impl CostPeriod {
    /// A missing `end` means "through `current`". An explicit `end` before
    /// `start` is rejected; a defaulted one yields an empty period.
    pub fn resolve(start: YearMonth, end: Option<YearMonth>, current: YearMonth) -> AppResult<Self> {
        match end {
            Some(end) if end < start => Err(AppError::ValidationError(format!(
                "end_date {end} is before start_date {start}"
            ))),
            Some(end) => Ok(Self { start, end }),
            None => Ok(Self { start, end: current }),
        }
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    pub fn end(&self) -> YearMonth {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Inclusive count of months `[start, end]` (open `end` runs to the period
    /// end) shares with this period; 0 when they do not meet.
    pub fn overlap_months(&self, start: YearMonth, end: Option<YearMonth>) -> i64 {
        let effective_start = start.max(self.start);
        let effective_end = end.map_or(self.end, |end| end.min(self.end));
        if effective_end < effective_start {
            return 0;
        }
        effective_start.months_until(effective_end) + 1
    }

    /// Fails instead of wrapping when the product does not fit in `i64`.
    pub fn cost_of(&self, subscription: &Subscription) -> AppResult<i64> {
        let months = self.overlap_months(subscription.start_date, subscription.end_date);
        subscription.monthly_cost.checked_mul(months).ok_or_else(|| {
            AppError::ValidationError(format!(
                "cost of subscription {} over {months} months overflows",
                subscription.id
            ))
        })
    }

    pub fn total_cost<'a>(
        &self,
        subscriptions: impl IntoIterator<Item = &'a Subscription>,
    ) -> AppResult<i64> {
        subscriptions.into_iter().try_fold(0i64, |total, s| {
            total.checked_add(self.cost_of(s)?).ok_or_else(|| {
                AppError::ValidationError(format!(
                    "total cost from {} to {} overflows",
                    self.start, self.end
                ))
            })
        })
    }
}
