use crate::{
    abstract_trait::reservation::service::{
        DynReservationCommandService, DynReservationQueryService,
    },
    domain::{
        requests::reservation::{CreateReservationRequest, UpdateReservationRequest},
        response::{
            api::MessageResponse,
            reservation::{
                AvailableStockResponse, ReservationEnvelope, ReservationListEnvelope,
            },
        },
    },
    middleware::{
        jwt::{Viewer, auth_middleware, optional_auth_middleware},
        validate::SimpleValidatedJson,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use shared::errors::{ErrorResponse, HttpError};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/v1/reservations/create",
    tag = "Reservation",
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created or updated", body = ReservationEnvelope),
        (status = 400, description = "Invalid quantity or not enough stock", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn create_reservation(
    Extension(service): Extension<DynReservationCommandService>,
    Extension(user_id): Extension<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateReservationRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let reservation = service
        .create_reservation(user_id, body.product_id, body.quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationEnvelope {
            success: true,
            message: "Stock reserved successfully".to_string(),
            reservation,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/available-stock/{product_id}",
    tag = "Reservation",
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Stock free for the caller", body = AvailableStockResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn get_available_stock(
    Extension(service): Extension<DynReservationQueryService>,
    Extension(Viewer(viewer)): Extension<Viewer>,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let availability = service.compute_availability(product_id, viewer).await?;

    Ok((
        StatusCode::OK,
        Json(AvailableStockResponse::from(availability)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/update/{product_id}",
    tag = "Reservation",
    security(("bearer_auth" = [])),
    params(("product_id" = i32, Path, description = "Product ID")),
    request_body = UpdateReservationRequest,
    responses(
        (status = 200, description = "Reservation updated", body = ReservationEnvelope),
        (status = 400, description = "Invalid quantity or not enough stock", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn update_reservation(
    Extension(service): Extension<DynReservationCommandService>,
    Extension(user_id): Extension<i32>,
    Path(product_id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateReservationRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let reservation = service
        .upsert_reservation(user_id, product_id, body.quantity)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ReservationEnvelope {
            success: true,
            message: "Reservation updated successfully".to_string(),
            reservation,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/cancel/{product_id}",
    tag = "Reservation",
    security(("bearer_auth" = [])),
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "No active reservation", body = ErrorResponse)
    )
)]
pub async fn cancel_reservation(
    Extension(service): Extension<DynReservationCommandService>,
    Extension(user_id): Extension<i32>,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    service.cancel_reservation(user_id, product_id).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::ok("Reservation cancelled successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/mine",
    tag = "Reservation",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's active reservations", body = ReservationListEnvelope),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn my_reservations(
    Extension(service): Extension<DynReservationQueryService>,
    Extension(user_id): Extension<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let reservations = service.list_active_reservations(user_id).await?;

    Ok((
        StatusCode::OK,
        Json(ReservationListEnvelope {
            success: true,
            message: format!("{} active reservations", reservations.len()),
            reservations,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations/cleanup-expired",
    tag = "Reservation",
    responses(
        (status = 200, description = "Lapsed reservations expired", body = MessageResponse),
        (status = 500, description = "Sweep failed", body = ErrorResponse)
    )
)]
pub async fn cleanup_expired(
    Extension(service): Extension<DynReservationCommandService>,
) -> Result<impl IntoResponse, HttpError> {
    let report = service.sweep_expired().await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::ok(format!(
            "{} expired reservations cleaned up",
            report.expired
        ))),
    ))
}

pub fn reservation_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let protected = OpenApiRouter::new()
        .route("/api/v1/reservations/create", post(create_reservation))
        .route(
            "/api/v1/reservations/update/{product_id}",
            put(update_reservation),
        )
        .route(
            "/api/v1/reservations/cancel/{product_id}",
            delete(cancel_reservation),
        )
        .route("/api/v1/reservations/mine", get(my_reservations))
        .route_layer(middleware::from_fn(auth_middleware));

    let viewer = OpenApiRouter::new()
        .route(
            "/api/v1/reservations/available-stock/{product_id}",
            get(get_available_stock),
        )
        .route_layer(middleware::from_fn(optional_auth_middleware));

    let open = OpenApiRouter::new().route(
        "/api/v1/reservations/cleanup-expired",
        post(cleanup_expired),
    );

    protected
        .merge(viewer)
        .merge(open)
        .layer(Extension(app_state.di_container.reservation_command.clone()))
        .layer(Extension(app_state.di_container.reservation_query.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
