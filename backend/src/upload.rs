use actix_multipart::Multipart;
use actix_web::{HttpRequest, http::header, web};
use futures::{StreamExt, TryStreamExt};

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Payload too large")]
    TooLarge,
    #[error("{0}")]
    Multipart(#[from] actix_multipart::MultipartError),
    #[error("{0}")]
    Payload(#[from] actix_web::error::PayloadError),
}

/// Returns the uploaded image bytes: the `image` field of a multipart form,
/// or the raw body otherwise. An empty vec means nothing was uploaded.
pub async fn read_image(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<Vec<u8>, UploadError> {
    if is_multipart(req) {
        read_multipart_image(Multipart::new(req.headers(), payload), limit).await
    } else {
        read_body(payload, limit).await
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_multipart_image(mut payload: Multipart, limit: usize) -> Result<Vec<u8>, UploadError> {
    let mut image_data = Vec::new();
    let mut found = false;

    while let Some(mut field) = payload.try_next().await? {
        let wanted = !found && field.name() == Some(IMAGE_FIELD);

        // Other fields are drained so the stream can advance.
        while let Some(chunk) = field.try_next().await? {
            if wanted {
                append_limited(&mut image_data, &chunk, limit)?;
            }
        }
        found |= wanted;
    }

    Ok(image_data)
}

async fn read_body(mut payload: web::Payload, limit: usize) -> Result<Vec<u8>, UploadError> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        append_limited(&mut body, &chunk?, limit)?;
    }
    Ok(body)
}

fn append_limited(buf: &mut Vec<u8>, chunk: &[u8], limit: usize) -> Result<(), UploadError> {
    if buf.len() + chunk.len() > limit {
        return Err(UploadError::TooLarge);
    }
    buf.extend_from_slice(chunk);
    Ok(())
}
