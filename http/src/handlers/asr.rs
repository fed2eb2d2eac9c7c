use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use asr_application::{TranscriptionForm, TranscriptionPayload};

use super::upload::UploadedForm;
use crate::error::{error_mapper, HttpError};
use crate::AppState;

const MISSING_WAV_MESSAGE: &str = "Missing or invalid WAV file";
const MISSING_AUDIO_MESSAGE: &str = "Missing audio file";

pub async fn inference_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpError> {
    let mut upload = UploadedForm::read(multipart).await?;
    let audio = upload
        .file
        .take()
        .filter(|file| {
            file.file_name
                .as_deref()
                .is_some_and(|name| name.to_ascii_lowercase().ends_with(".wav"))
        })
        .ok_or_else(|| {
            tracing::warn!("inference request without a .wav file part");
            HttpError::bad_request(MISSING_WAV_MESSAGE)
        })?
        .bytes;

    let form = TranscriptionForm {
        language: upload.take("language"),
        pnc: upload.take("pnc"),
        timestamps: upload.take("timestamps"),
        beam_size: upload.take("beam_size"),
        batch_size: upload.take("batch_size"),
        response_format: upload.take("response_format"),
        word_boosting: upload.take("word_boosting"),
    };
    transcribe(state, form, audio).await
}

/// OpenAI-style endpoint: only language, response format and word boosting
/// are read from the form.
pub async fn openai_transcriptions_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpError> {
    let mut upload = UploadedForm::read(multipart).await?;
    let audio = upload
        .file
        .take()
        .ok_or_else(|| {
            tracing::warn!("transcription request without a file part");
            HttpError::bad_request(MISSING_AUDIO_MESSAGE)
        })?
        .bytes;

    let form = TranscriptionForm::openai_compatible(
        upload.take("language"),
        upload.take("response_format"),
        upload.take("word_boosting"),
    );
    transcribe(state, form, audio).await
}

async fn transcribe(
    state: AppState,
    form: TranscriptionForm,
    audio: Vec<u8>,
) -> Result<Response, HttpError> {
    let request = form
        .into_request(audio, state.defaults)
        .map_err(error_mapper)?;
    tracing::info!(
        audio_bytes = request.audio.len(),
        language = %request.language,
        response_format = %request.response_format,
        beam_size = request.beam_size,
        "received transcription request"
    );

    let payload = state
        .usecase
        .transcribe(request)
        .await
        .map_err(error_mapper)?;
    tracing::info!("transcription request completed");
    Ok(payload_response(payload))
}

fn payload_response(payload: TranscriptionPayload) -> Response {
    match payload {
        TranscriptionPayload::Text(text) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        TranscriptionPayload::Json(body) => Json(body).into_response(),
        TranscriptionPayload::Srt(body) => {
            ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
        }
        TranscriptionPayload::Vtt(body) => {
            ([(header::CONTENT_TYPE, "text/vtt")], body).into_response()
        }
    }
}
