use crate::{
    abstract_trait::product::DynProductStockService,
    domain::{
        requests::product::UpdateStockRequest,
        response::product::ProduceEnvelope,
    },
    middleware::{jwt::auth_middleware, validate::SimpleValidatedJson},
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::put,
};
use shared::errors::{ErrorResponse, HttpError};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    put,
    path = "/api/v1/produce/update-stock/{product_id}",
    tag = "Produce",
    security(("bearer_auth" = [])),
    params(("product_id" = i32, Path, description = "Product ID")),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock updated", body = ProduceEnvelope),
        (status = 400, description = "Negative quantity", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the listing farmer", body = ErrorResponse),
        (status = 404, description = "Produce not found", body = ErrorResponse)
    )
)]
pub async fn update_stock(
    Extension(service): Extension<DynProductStockService>,
    Extension(farmer_id): Extension<i32>,
    Path(product_id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateStockRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let produce = service
        .update_stock(farmer_id, product_id, body.quantity)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ProduceEnvelope {
            success: true,
            message: "Stock updated successfully".to_string(),
            produce,
        }),
    ))
}

pub fn product_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route(
            "/api/v1/produce/update-stock/{product_id}",
            put(update_stock),
        )
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.product_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
