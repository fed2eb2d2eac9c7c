use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;

use crate::HttpError;

const FILE_FIELD: &str = "file";

pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// A multipart form split into its `file` part and its text fields.
#[derive(Default)]
pub struct UploadedForm {
    pub file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadedForm {
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// Reads every part. A body that is not multipart yields an empty form so
    /// the endpoint can answer with its own missing-file message.
    pub async fn read(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, HttpError> {
        let mut multipart = match multipart {
            Ok(multipart) => multipart,
            Err(rejection) => {
                tracing::warn!(error = %rejection, "request body is not a multipart form");
                return Ok(Self::default());
            }
        };

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == FILE_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                tracing::debug!(
                    file_name = file_name.as_deref().unwrap_or("<none>"),
                    bytes = bytes.len(),
                    "received audio upload"
                );
                form.file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }
}

fn multipart_error(err: MultipartError) -> HttpError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!(error = %err, "upload exceeds body limit");
        HttpError::PayloadTooLarge {
            message: "Uploaded file is too large".to_string(),
        }
    } else {
        tracing::warn!(error = %err, "failed to read multipart body");
        HttpError::bad_request(format!("Failed to read multipart: {}", err.body_text()))
    }
}
