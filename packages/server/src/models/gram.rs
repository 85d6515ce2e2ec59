use chrono::{DateTime, Utc};
use common::storage::{PictureKey, PictureStore, StorageError};
use mime_guess::mime;
use serde::Serialize;

use crate::entity::gram;

/// Fields accepted from a create/update submission. Anything else in the
/// request body is dropped while reading it.
#[derive(Debug, Default)]
pub struct GramParams {
    pub message: Option<String>,
    pub picture: Option<PictureUpload>,
}

/// A picture file received with a submission, not yet stored.
#[derive(Debug, Clone)]
pub struct PictureUpload {
    pub filename: String,
    /// Content type declared by the client for the file part, if any.
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl PictureUpload {
    /// Client-supplied name with any directory part removed.
    pub fn base_name(&self) -> &str {
        self.filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// Content type guessed from the file name, else the declared one.
    pub fn content_type(&self) -> Option<mime::Mime> {
        mime_guess::from_path(self.base_name())
            .first()
            .or_else(|| self.declared_type.as_deref()?.parse().ok())
    }
}

/// Picture already held by the picture store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPicture {
    pub key: PictureKey,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
}

impl StoredPicture {
    fn of(model: &gram::Model) -> Option<Self> {
        Some(Self {
            key: model.picture_hash.parse().ok()?,
            filename: model.picture_filename.clone(),
            content_type: model.picture_content_type.clone(),
            size: model.picture_size,
        })
    }
}

#[derive(Debug, Clone)]
pub enum PictureInput {
    Stored(StoredPicture),
    Upload(PictureUpload),
}

impl PictureInput {
    fn filename(&self) -> &str {
        match self {
            PictureInput::Stored(p) => &p.filename,
            PictureInput::Upload(p) => p.base_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    #[schema(example = "message")]
    pub field: &'static str,
    #[schema(example = "Message can't be blank")]
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The state a gram would have after a submission, before validation.
#[derive(Debug, Clone)]
pub struct GramDraft {
    /// Set when editing an existing gram.
    pub id: Option<i32>,
    pub message: String,
    pub picture: Option<PictureInput>,
}

impl GramDraft {
    /// Draft for a brand-new gram.
    pub fn new(params: GramParams) -> Self {
        Self {
            id: None,
            message: params.message.unwrap_or_default(),
            picture: params.picture.map(PictureInput::Upload),
        }
    }

    /// Draft for `existing` with the submitted fields applied on top; fields
    /// left out of the submission keep their stored values.
    pub fn edit(existing: &gram::Model, params: GramParams) -> Self {
        Self {
            id: Some(existing.id),
            message: params
                .message
                .unwrap_or_else(|| existing.message.clone()),
            picture: match params.picture {
                Some(upload) => Some(PictureInput::Upload(upload)),
                None => StoredPicture::of(existing).map(PictureInput::Stored),
            },
        }
    }

    /// Presence rules: a non-blank message and an image picture.
    pub fn validate(self) -> Result<ValidGram, RejectedDraft> {
        let mut errors = Vec::new();

        if self.message.trim().is_empty() {
            errors.push(FieldError::new("message", "Message can't be blank"));
        }

        match &self.picture {
            None => errors.push(FieldError::new("picture", "Picture can't be blank")),
            Some(PictureInput::Upload(upload)) => {
                if upload.base_name().is_empty() || upload.bytes.is_empty() {
                    errors.push(FieldError::new("picture", "Picture can't be blank"));
                } else if upload.base_name().chars().any(|c| c.is_control()) {
                    errors.push(FieldError::new(
                        "picture",
                        "Picture file name contains control characters",
                    ));
                } else if !upload
                    .content_type()
                    .is_some_and(|m| m.type_() == mime::IMAGE)
                {
                    errors.push(FieldError::new("picture", "Picture must be an image"));
                }
            }
            Some(PictureInput::Stored(_)) => {}
        }

        match self.picture {
            Some(picture) if errors.is_empty() => Ok(ValidGram {
                message: self.message,
                picture,
            }),
            picture => Err(RejectedDraft {
                draft: GramDraft { picture, ..self },
                errors,
            }),
        }
    }

    pub fn form(&self, kind: FormKind, errors: Vec<FieldError>) -> FormPage {
        FormPage {
            form: kind,
            gram: GramFormFields {
                id: self.id,
                message: self.message.clone(),
                picture_filename: self.picture.as_ref().map(|p| p.filename().to_owned()),
            },
            errors,
        }
    }
}

/// A draft that failed validation, kept so the form can be re-rendered.
#[derive(Debug)]
pub struct RejectedDraft {
    pub draft: GramDraft,
    pub errors: Vec<FieldError>,
}

/// A draft that passed validation. Only [`GramDraft::validate`] makes one.
#[derive(Debug)]
pub struct ValidGram {
    message: String,
    picture: PictureInput,
}

impl ValidGram {
    /// Write an uploaded picture to the picture store, yielding the record
    /// the gram store persists.
    pub async fn store_picture(
        self,
        pictures: &dyn PictureStore,
    ) -> Result<GramRecord, StorageError> {
        let picture = match self.picture {
            PictureInput::Stored(stored) => stored,
            PictureInput::Upload(upload) => {
                let key = pictures.put(&upload.bytes).await?;
                let content_type = upload
                    .content_type()
                    .map(|m| m.essence_str().to_owned())
                    .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
                StoredPicture {
                    key,
                    filename: upload.base_name().to_owned(),
                    content_type,
                    size: i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX),
                }
            }
        };

        Ok(GramRecord {
            message: self.message,
            picture,
        })
    }
}

/// Validated fields with the picture already in storage.
#[derive(Debug)]
pub struct GramRecord {
    message: String,
    picture: StoredPicture,
}

impl GramRecord {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn picture(&self) -> &StoredPicture {
        &self.picture
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    New,
    Edit,
}

/// Submitted (or stored) state shown in a form.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GramFormFields {
    /// Present on the edit form.
    pub id: Option<i32>,
    #[schema(example = "Hello!")]
    pub message: String,
    #[schema(example = "picture.png")]
    pub picture_filename: Option<String>,
}

/// A rendered gram form: blank for `new`, pre-filled for `edit`, or
/// re-rendered with the invalid submission and its errors.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FormPage {
    pub form: FormKind,
    pub gram: GramFormFields,
    pub errors: Vec<FieldError>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PictureResponse {
    /// Where the picture bytes are served.
    #[schema(example = "/grams/1/picture")]
    pub url: String,
    #[schema(example = "picture.png")]
    pub filename: String,
    #[schema(example = "image/png")]
    pub content_type: String,
    pub size: i64,
    /// SHA-256 content hash.
    pub content_hash: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GramResponse {
    pub id: i32,
    #[schema(example = "Hello!")]
    pub message: String,
    pub picture: PictureResponse,
    /// Owner's user ID.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<gram::Model> for GramResponse {
    fn from(model: gram::Model) -> Self {
        Self {
            picture: PictureResponse {
                url: format!("/grams/{}/picture", model.id),
                filename: model.picture_filename,
                content_type: model.picture_content_type,
                size: model.picture_size,
                content_hash: model.picture_hash,
            },
            id: model.id,
            message: model.message,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GramListResponse {
    pub grams: Vec<GramResponse>,
    pub total: u64,
}
