use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::subscription::{parse_month, parse_optional_month};
use crate::models::*;
use crate::services::SubscriptionService;
use crate::utils::PaginationParams;

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscription",
    request_body = SubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 409, description = "Previous subscription has not ended", body = ApiError)
    )
)]
pub async fn create_subscription(
    service: web::Data<SubscriptionService>,
    body: web::Json<SubscriptionRequest>,
) -> Result<HttpResponse> {
    let draft = match SubscriptionDraft::try_from(body.into_inner()) {
        Ok(draft) => draft,
        Err(e) => return Ok(e.error_response()),
    };

    match service.create(draft).await {
        Ok(created) => {
            log::info!("Subscription {} created for user {}", created.id, created.user_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(SubscriptionResponse::from(created))))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscription",
    params(
        ("user_id" = Uuid, Query, description = "Owner of the subscriptions"),
        ("limit" = Option<u32>, Query, description = "Page size, 1-100 (default 50)"),
        ("offset" = Option<u64>, Query, description = "Rows to skip (default 0)")
    ),
    responses(
        (status = 200, description = "Subscriptions of the user, newest first", body = [SubscriptionResponse]),
        (status = 400, description = "Invalid query", body = ApiError)
    )
)]
pub async fn list_subscriptions(
    service: web::Data<SubscriptionService>,
    query: web::Query<ListSubscriptionsQuery>,
) -> Result<HttpResponse> {
    let params = PaginationParams::new(query.limit, query.offset);

    match service.list_by_user(query.user_id, params).await {
        Ok(list) => {
            let items: Vec<SubscriptionResponse> =
                list.into_iter().map(SubscriptionResponse::from).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/total-cost",
    tag = "subscription",
    params(
        ("user_id" = Uuid, Query, description = "Owner of the subscriptions"),
        ("service_name" = Option<String>, Query, description = "Restrict to one service; empty means all"),
        ("start_date" = String, Query, description = "First month of the period (MM-YYYY)"),
        ("end_date" = Option<String>, Query, description = "Last month of the period (MM-YYYY), defaults to the current month")
    ),
    responses(
        (status = 200, description = "Total cost over the period", body = TotalCostResponse),
        (status = 400, description = "Invalid query", body = ApiError)
    )
)]
pub async fn total_cost(
    service: web::Data<SubscriptionService>,
    query: web::Query<TotalCostQuery>,
) -> Result<HttpResponse> {
    let TotalCostQuery {
        user_id,
        service_name,
        start_date,
        end_date,
    } = query.into_inner();

    let period = parse_month("start_date", &start_date).and_then(|start| {
        parse_optional_month("end_date", end_date.as_deref()).map(|end| (start, end))
    });
    let (start, end) = match period {
        Ok(period) => period,
        Err(e) => return Ok(e.error_response()),
    };

    match service.total_cost(user_id, service_name, start, end).await {
        Ok(total_cost) => Ok(HttpResponse::Ok().json(ApiResponse::success(TotalCostResponse { total_cost }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(("id" = Uuid, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found", body = ApiError)
    )
)]
pub async fn get_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match service.get_by_id(path.into_inner()).await {
        Ok(found) => Ok(HttpResponse::Ok().json(ApiResponse::success(SubscriptionResponse::from(found)))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(("id" = Uuid, Path, description = "Subscription id")),
    request_body = SubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = SubscriptionResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Subscription not found", body = ApiError)
    )
)]
pub async fn update_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
    body: web::Json<SubscriptionRequest>,
) -> Result<HttpResponse> {
    let draft = match SubscriptionDraft::try_from(body.into_inner()) {
        Ok(draft) => draft,
        Err(e) => return Ok(e.error_response()),
    };

    match service.update(path.into_inner(), draft).await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success(SubscriptionResponse::from(updated)))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(("id" = Uuid, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription deleted"),
        (status = 404, description = "Subscription not found", body = ApiError)
    )
)]
pub async fn delete_subscription(
    service: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match service.delete(id).await {
        Ok(()) => {
            log::info!("Subscription {id} deleted");
            Ok(HttpResponse::Ok().json(ApiResponse::message("Subscription deleted")))
        }
        Err(e) => Ok(e.error_response()),
    }
}

/// Malformed bodies, query strings and path ids answer with the same
/// `VALIDATION_ERROR` envelope as every other client error.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    );
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .configure(extractor_configs)
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(list_subscriptions))
            .route("/total-cost", web::get().to(total_cost))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
