use crate::database::ConnectionProvider;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::repositories::SubscriptionRepository;
use crate::utils::PaginationParams;
use futures_util::FutureExt;
use uuid::Uuid;

const ENTITY: &str = "Subscription";

#[derive(Clone)]
pub struct SubscriptionService {
    provider: ConnectionProvider,
    repo: SubscriptionRepository,
}

/// Rejects `candidate` while the latest subscription of its pair is still
/// running at the candidate's start month.
pub fn ensure_no_overlap(latest: Option<&Subscription>, candidate: &Subscription) -> AppResult<()> {
    let Some(latest) = latest else {
        return Ok(());
    };
    match latest.end_date {
        Some(end) if end <= candidate.start_date => Ok(()),
        _ => Err(AppError::OverlapError {
            user_id: candidate.user_id,
            service_name: candidate.service_name.clone(),
        }),
    }
}

impl SubscriptionService {
    pub fn new(provider: ConnectionProvider, repo: SubscriptionRepository) -> Self {
        Self { provider, repo }
    }

    /// Checks the pair for overlap and inserts in one transaction.
    pub async fn create(&self, draft: SubscriptionDraft) -> AppResult<Subscription> {
        draft.validate()?;
        let subscription = draft.into_subscription(Uuid::new_v4());
        log::debug!(
            "Creating subscription {} for user {} ({})",
            subscription.id,
            subscription.user_id,
            subscription.service_name
        );

        let repo = self.repo;
        self.provider
            .execute_tx("create subscription", move |txn| {
                async move {
                    let latest = repo
                        .latest_for_pair(txn, subscription.user_id, &subscription.service_name)
                        .await?;
                    ensure_no_overlap(latest.as_ref(), &subscription)?;
                    repo.insert(txn, &subscription).await?;
                    Ok(subscription)
                }
                .boxed()
            })
            .await
    }

    /// Replaces every mutable field. The new window may not cut into another
    /// subscription of the same pair, so a finished row cannot be re-opened
    /// over its successor.
    pub async fn update(&self, id: Uuid, draft: SubscriptionDraft) -> AppResult<Subscription> {
        draft.validate()?;
        let subscription = draft.into_subscription(id);
        log::debug!("Updating subscription {id}");

        let repo = self.repo;
        self.provider
            .execute(|conn| async move {
                if repo.get_by_id(conn, id).await?.is_none() {
                    return Err(AppError::NotFound { entity: ENTITY, id });
                }
                if let Some(conflict) = repo.find_conflicting(conn, &subscription).await? {
                    log::debug!("Subscription {id} would overlap {}", conflict.id);
                    return Err(AppError::OverlapError {
                        user_id: subscription.user_id,
                        service_name: subscription.service_name.clone(),
                    });
                }
                if repo.update(conn, &subscription).await? == 0 {
                    return Err(AppError::NotFound { entity: ENTITY, id });
                }
                Ok(subscription)
            })
            .await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        log::debug!("Deleting subscription {id}");
        let deleted = self
            .provider
            .execute(|conn| self.repo.delete_by_id(conn, id))
            .await?;
        if deleted == 0 {
            return Err(AppError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Subscription> {
        self.provider
            .execute(|conn| self.repo.get_by_id(conn, id))
            .await?
            .ok_or(AppError::NotFound { entity: ENTITY, id })
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        params: PaginationParams,
    ) -> AppResult<Vec<Subscription>> {
        let (limit, offset) = (params.get_limit(), params.get_offset());
        log::debug!("Listing subscriptions of user {user_id} (limit {limit}, offset {offset})");
        self.provider
            .execute(|conn| self.repo.list_by_user(conn, user_id, limit, offset))
            .await
    }

    /// Sum of `monthly_cost × overlap months` over the user's subscriptions in
    /// `[period_start, period_end]`. A missing end means the current month and
    /// a blank `service_name` means every service.
    pub async fn total_cost(
        &self,
        user_id: Uuid,
        service_name: Option<String>,
        period_start: YearMonth,
        period_end: Option<YearMonth>,
    ) -> AppResult<i64> {
        let period = CostPeriod::resolve(period_start, period_end, YearMonth::current())?;
        let filter = service_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        log::debug!(
            "Computing total cost for user {user_id} from {} to {} (service: {})",
            period.start(),
            period.end(),
            filter.unwrap_or("*")
        );

        self.provider
            .execute(|conn| self.repo.aggregate_cost(conn, user_id, filter, &period))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::memory_provider;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn draft(user_id: Uuid, name: &str, cost: i64, start: &str, end: Option<&str>) -> SubscriptionDraft {
        SubscriptionDraft {
            user_id,
            service_name: name.to_string(),
            monthly_cost: cost,
            start_date: ym(start),
            end_date: end.map(ym),
        }
    }

    async fn service() -> SubscriptionService {
        SubscriptionService::new(memory_provider().await, SubscriptionRepository::new())
    }

    #[test]
    fn test_ensure_no_overlap_rules() {
        let user = Uuid::new_v4();
        let candidate = draft(user, "Netflix", 1, "06-2025", None).into_subscription(Uuid::new_v4());
        let previous = |end: Option<&str>| {
            draft(user, "Netflix", 1, "01-2025", end).into_subscription(Uuid::new_v4())
        };

        assert!(ensure_no_overlap(None, &candidate).is_ok());
        assert!(ensure_no_overlap(Some(&previous(Some("05-2025"))), &candidate).is_ok());
        assert!(ensure_no_overlap(Some(&previous(Some("06-2025"))), &candidate).is_ok());
        assert!(matches!(
            ensure_no_overlap(Some(&previous(Some("07-2025"))), &candidate),
            Err(AppError::OverlapError { .. })
        ));
        assert!(matches!(
            ensure_no_overlap(Some(&previous(None)), &candidate),
            Err(AppError::OverlapError { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_then_get_returns_equal_record() {
        let service = service().await;
        let user = Uuid::new_v4();

        let created = service
            .create(draft(user, "Yandex Plus", 400, "07-2025", None))
            .await
            .unwrap();
        assert_ne!(created.id, Uuid::nil());

        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_open_ended_blocks_second_create() {
        let service = service().await;
        let user = Uuid::new_v4();

        service
            .create(draft(user, "Netflix", 599, "01-2025", None))
            .await
            .unwrap();
        let err = service
            .create(draft(user, "Netflix", 599, "06-2030", None))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::OverlapError { user_id, ref service_name } if user_id == user && service_name == "Netflix")
        );

        // Other services and other users are unaffected.
        assert!(service.create(draft(user, "Spotify", 1, "01-2025", None)).await.is_ok());
        assert!(
            service
                .create(draft(Uuid::new_v4(), "Netflix", 1, "01-2025", None))
                .await
                .is_ok()
        );
        let listed = service
            .list_by_user(user, PaginationParams::new(None, None))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_create_after_previous_end_succeeds() {
        let service = service().await;
        let user = Uuid::new_v4();

        service
            .create(draft(user, "Netflix", 599, "01-2025", Some("03-2025")))
            .await
            .unwrap();
        let err = service
            .create(draft(user, "Netflix", 599, "02-2025", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OverlapError { .. }));

        assert!(
            service
                .create(draft(user, "Netflix", 699, "04-2025", None))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_rejected_create_leaves_store_untouched() {
        let service = service().await;
        let user = Uuid::new_v4();

        service
            .create(draft(user, "Netflix", 599, "01-2025", None))
            .await
            .unwrap();
        let _ = service
            .create(draft(user, "Netflix", 599, "02-2025", None))
            .await;

        let listed = service
            .list_by_user(user, PaginationParams::new(None, None))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_create_validates_draft() {
        let service = service().await;
        let err = service
            .create(draft(Uuid::new_v4(), "Netflix", 1, "05-2025", Some("04-2025")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = service().await;
        let user = Uuid::new_v4();

        let created = service
            .create(draft(user, "Netflix", 599, "01-2025", None))
            .await
            .unwrap();
        let updated = service
            .update(created.id, draft(user, "Netflix", 799, "01-2025", Some("12-2025")))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(service.get_by_id(created.id).await.unwrap(), updated);

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(created.id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let service = service().await;
        let id = Uuid::new_v4();

        assert!(matches!(
            service.delete(id).await,
            Err(AppError::NotFound { id: missing, .. }) if missing == id
        ));
        assert!(matches!(
            service.get_by_id(id).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service
                .update(id, draft(Uuid::new_v4(), "Netflix", 1, "01-2025", None))
                .await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_total_cost() {
        let service = service().await;
        let user = Uuid::new_v4();

        service
            .create(draft(user, "Netflix", 10, "01-2025", Some("03-2025")))
            .await
            .unwrap();
        service
            .create(draft(user, "Spotify", 7, "01-2025", None))
            .await
            .unwrap();

        let netflix = Some("Netflix".to_string());
        let total = |name: Option<String>, start: &str, end: &str| {
            service.total_cost(user, name, ym(start), Some(ym(end)))
        };
        assert_eq!(total(netflix.clone(), "01-2025", "01-2025").await.unwrap(), 10);
        assert_eq!(total(netflix.clone(), "01-2025", "03-2025").await.unwrap(), 30);
        assert_eq!(
            total(Some("Spotify".to_string()), "02-2025", "12-2025").await.unwrap(),
            77
        );
        assert_eq!(total(None, "01-2025", "03-2025").await.unwrap(), 30 + 21);
        assert_eq!(total(Some("  ".to_string()), "01-2025", "03-2025").await.unwrap(), 51);
        assert_eq!(total(netflix, "01-2024", "12-2024").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_total_cost_without_matches_is_zero() {
        let service = service().await;
        let total = service
            .total_cost(Uuid::new_v4(), None, ym("01-2025"), None)
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_total_cost_rejects_inverted_period() {
        let service = service().await;
        let err = service
            .total_cost(Uuid::new_v4(), None, ym("05-2025"), Some(ym("01-2025")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_service_name_is_stored_trimmed() {
        let service = service().await;
        let user = Uuid::new_v4();

        let created = service
            .create(draft(user, " Netflix ", 1, "01-2025", None))
            .await
            .unwrap();
        assert_eq!(created.service_name, "Netflix");
        assert_eq!(service.get_by_id(created.id).await.unwrap().service_name, "Netflix");

        let err = service
            .create(draft(user, "Netflix", 1, "06-2025", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OverlapError { .. }));

        let total = service
            .total_cost(user, Some(" Netflix".to_string()), ym("01-2025"), Some(ym("03-2025")))
            .await
            .unwrap();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_update_cannot_overlap_another_subscription() {
        let service = service().await;
        let user = Uuid::new_v4();

        let first = service
            .create(draft(user, "Netflix", 10, "01-2025", Some("03-2025")))
            .await
            .unwrap();
        let second = service
            .create(draft(user, "Netflix", 10, "04-2025", None))
            .await
            .unwrap();
        let spotify = service
            .create(draft(user, "Spotify", 5, "01-2025", None))
            .await
            .unwrap();

        // Editing a finished row inside its own window is fine.
        assert!(
            service
                .update(first.id, draft(user, "Netflix", 12, "01-2025", Some("04-2025")))
                .await
                .is_ok()
        );

        let reopen = service
            .update(first.id, draft(user, "Netflix", 10, "01-2025", None))
            .await;
        assert!(matches!(reopen, Err(AppError::OverlapError { .. })));

        let rename = service
            .update(spotify.id, draft(user, "Netflix", 5, "01-2025", None))
            .await;
        assert!(matches!(rename, Err(AppError::OverlapError { .. })));

        // Rejected updates leave the stored rows as they were.
        assert_eq!(service.get_by_id(second.id).await.unwrap(), second);
        assert_eq!(service.get_by_id(spotify.id).await.unwrap(), spotify);
        assert_eq!(
            service.get_by_id(first.id).await.unwrap().end_date,
            Some(ym("04-2025"))
        );
    }

    #[tokio::test]
    async fn test_total_cost_overflow_is_an_error() {
        let service = service().await;
        let user = Uuid::new_v4();

        service
            .create(draft(user, "Netflix", i64::MAX, "01-2025", Some("03-2025")))
            .await
            .unwrap();
        let result = service
            .total_cost(user, None, ym("01-2025"), Some(ym("03-2025")))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let single_month = service
            .total_cost(user, None, ym("02-2025"), Some(ym("02-2025")))
            .await
            .unwrap();
        assert_eq!(single_month, i64::MAX);
    }
}
