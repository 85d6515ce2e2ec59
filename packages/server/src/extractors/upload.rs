use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{FromRequest, Multipart, Request};

use crate::error::AppError;
use crate::models::gram::{GramParams, PictureUpload};

/// Multipart gram submission whose parsing is deferred.
///
/// Extraction never fails, so authentication, existence and ownership checks
/// in the handler all run before a malformed body is reported. Call
/// [`GramUpload::read`] once those checks pass.
pub struct GramUpload(Result<Multipart, MultipartRejection>);

impl<S> FromRequest<S> for GramUpload
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(GramUpload(Multipart::from_request(req, state).await))
    }
}

impl GramUpload {
    /// Read the allow-listed `message` and `picture` fields, discarding any
    /// others. Pictures above `max_picture_size` bytes are refused.
    pub async fn read(self, max_picture_size: u64) -> Result<GramParams, AppError> {
        let mut multipart = self
            .0
            .map_err(|e| AppError::Validation(format!("Expected a multipart form: {e}")))?;
        let mut params = GramParams::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            match field.name() {
                Some("message") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read message: {e}")))?;
                    params.message = Some(text);
                }
                Some("picture") => {
                    params.picture = Some(read_picture(field, max_picture_size).await?);
                }
                other => {
                    tracing::debug!(field = ?other, "Ignoring unpermitted form field");
                }
            }
        }

        Ok(params)
    }
}

async fn read_picture(
    mut field: Field<'_>,
    max_picture_size: u64,
) -> Result<PictureUpload, AppError> {
    let filename = field.file_name().unwrap_or_default().to_owned();
    let declared_type = field.content_type().map(str::to_owned);

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        if (bytes.len() + chunk.len()) as u64 > max_picture_size {
            return Err(AppError::Validation(format!(
                "Picture exceeds maximum size of {max_picture_size} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(PictureUpload {
        filename,
        declared_type,
        bytes,
    })
}
