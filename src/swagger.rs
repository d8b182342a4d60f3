use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscription::create_subscription,
        handlers::subscription::list_subscriptions,
        handlers::subscription::total_cost,
        handlers::subscription::get_subscription,
        handlers::subscription::update_subscription,
        handlers::subscription::delete_subscription,
    ),
    components(
        schemas(
            SubscriptionRequest,
            SubscriptionResponse,
            TotalCostResponse,
            ApiError,
        )
    ),
    tags(
        (name = "subscription", description = "Subscription records and cost aggregation"),
    ),
    info(
        title = "Subscriptions Service API",
        version = "1.0.0",
        description = "Tracks users' recurring service subscriptions and their cost over time"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_subscription_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/subscriptions",
            "/subscriptions/total-cost",
            "/subscriptions/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
