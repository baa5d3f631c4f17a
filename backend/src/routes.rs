use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use log::{error, warn};
use shared::{ErrorResponse, HealthResponse, InferenceResponse};

use crate::context::ServiceContext;
use crate::upload::{self, UploadError};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/summary").route(web::get().to(summary)))
        .service(web::resource("/inference").route(web::post().to(inference)));
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Empty request body")]
    EmptyBody,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("{0}")]
    Payload(String),
    #[error("{0}")]
    InferenceFailed(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmptyBody | ApiError::Payload(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InferenceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge => ApiError::PayloadTooLarge,
            other => ApiError::Payload(other.to_string()),
        }
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::ok())
}

async fn summary(context: web::Data<ServiceContext>) -> HttpResponse {
    HttpResponse::Ok().json(context.summary())
}

async fn inference(
    req: HttpRequest,
    payload: web::Payload,
    context: web::Data<ServiceContext>,
) -> Result<HttpResponse, ApiError> {
    let image_data = upload::read_image(&req, payload, context.max_upload_bytes)
        .await
        .map_err(|e| {
            warn!("Rejected upload: {}", e);
            ApiError::from(e)
        })?;

    if image_data.is_empty() {
        return Err(ApiError::EmptyBody);
    }

    let ctx = context.clone();
    let prediction = web::block(move || ctx.predict(&image_data))
        .await
        .map_err(|e| ApiError::InferenceFailed(e.to_string()))?
        .map_err(|e| {
            error!("Model inference error: {}", e);
            ApiError::InferenceFailed(e.to_string())
        })?;

    Ok(HttpResponse::Ok().json(InferenceResponse { prediction }))
}
