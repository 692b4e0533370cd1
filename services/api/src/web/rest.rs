//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::library::records::{
    BookRecord, DictionaryWordRecord, FolderRecord, LevelAnalysisRecord, LineRecord,
    OverviewRecord, ProgressRecord, SegmentRecord, SettingsRecord, TextAlignRecord,
    WordExampleRecord, WordInContextRecord,
};
use crate::translation::TranslationOutcome;
use crate::web::state::AppState;
use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;
use vocab_reader_core::domain::{FolderDeletePolicy, TranslationRequest};
use vocab_reader_core::ports::PortError;

type HandlerResult<T> = Result<T, (StatusCode, String)>;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_books_handler,
        upload_books_handler,
        get_book_handler,
        delete_book_handler,
        move_book_handler,
        split_book_handler,
        render_book_handler,
        learning_queue_handler,
        record_progress_handler,
        level_analysis_handler,
        list_words_handler,
        add_word_handler,
        mark_known_handler,
        mark_learning_handler,
        toggle_word_handler,
        delete_word_handler,
        import_dictionary_handler,
        export_dictionary_handler,
        list_folders_handler,
        create_folder_handler,
        rename_folder_handler,
        delete_folder_handler,
        get_settings_handler,
        update_settings_handler,
        translate_handler,
        stats_handler,
    ),
    components(
        schemas(
            BookRecord, DictionaryWordRecord, FolderRecord, ProgressRecord, SettingsRecord,
            TextAlignRecord, OverviewRecord, LineRecord, SegmentRecord, WordInContextRecord,
            LevelAnalysisRecord, WordExampleRecord, MoveBookRequest, SplitRequest,
            SplitResponse, ProgressRequest, LevelAnalysisRequest, WordRequest, ImportResponse,
            FolderNameRequest, DeleteFolderResponse, TranslateMode, TranslateRequest,
            TranslateResponse, OnDelete,
        )
    ),
    tags(
        (name = "Vocabulary Reader API", description = "Library, dictionary and translation endpoints for the vocabulary reader.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveBookRequest {
    /// Target folder; `null` moves the book back to the root.
    pub folder_id: Option<Uuid>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SplitRequest {
    /// Approximate size of each part, in characters.
    pub target_chars: usize,
}

#[derive(Serialize, ToSchema)]
pub struct SplitResponse {
    pub folder: FolderRecord,
    pub parts: Vec<BookRecord>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub scroll_offset: f64,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct LevelAnalysisRequest {
    /// Zero-based batch of 50 unknown words.
    #[serde(default)]
    pub batch: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct WordRequest {
    pub word: String,
}

#[derive(Serialize, ToSchema)]
pub struct ImportResponse {
    pub added: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct FolderNameRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OnDelete {
    Orphan,
    Cascade,
}

impl From<OnDelete> for FolderDeletePolicy {
    fn from(value: OnDelete) -> Self {
        match value {
            OnDelete::Orphan => FolderDeletePolicy::Orphan,
            OnDelete::Cascade => FolderDeletePolicy::Cascade,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteFolderParams {
    /// What happens to the books inside the folder. Required.
    pub on_delete: OnDelete,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderResponse {
    pub affected_books: usize,
}

#[derive(Deserialize, ToSchema, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TranslateMode {
    Word,
    Sentence,
    General,
}

#[derive(Deserialize, ToSchema)]
pub struct TranslateRequest {
    pub mode: TranslateMode,
    pub word: Option<String>,
    pub sentence: Option<String>,
    pub text: Option<String>,
}

impl TranslateRequest {
    fn into_domain(self) -> Result<TranslationRequest, String> {
        let required = |value: Option<String>, name: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| format!("'{}' is required for this mode", name))
        };
        Ok(match self.mode {
            TranslateMode::Word => TranslationRequest::Word {
                word: required(self.word, "word")?,
                sentence: self.sentence.unwrap_or_default(),
            },
            TranslateMode::Sentence => TranslationRequest::Sentence {
                sentence: required(self.sentence.or(self.text), "sentence")?,
            },
            TranslateMode::General => TranslationRequest::General {
                text: required(self.text, "text")?,
            },
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum TranslateResponse {
    Ready { translation: String },
    Pending { status: String },
}

//=========================================================================================
// Error Mapping and Multipart Helpers
//=========================================================================================

fn port_error(e: PortError) -> (StatusCode, String) {
    let status = match &e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PortError::MissingCredential => StatusCode::PRECONDITION_FAILED,
        PortError::StorageFull(_) => StatusCode::INSUFFICIENT_STORAGE,
        PortError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        PortError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else {
        warn!("Request rejected: {}", e);
    }
    (status, e.to_string())
}

fn bad_request(message: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message.into())
}

fn decode_text(name: &str, data: Bytes) -> HandlerResult<String> {
    String::from_utf8(data.to_vec()).map_err(|e| {
        bad_request(format!("Uploaded file '{}' is not valid UTF-8 text: {}", name, e))
    })
}

async fn field_bytes(field: Field<'_>) -> HandlerResult<Bytes> {
    field
        .bytes()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))
}

//=========================================================================================
// Book Handlers
//=========================================================================================

/// List every book in the library.
#[utoipa::path(
    get,
    path = "/books",
    responses((status = 200, description = "All books", body = [BookRecord]))
)]
pub async fn list_books_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<BookRecord>>> {
    let documents = app_state.library.list_documents().await.map_err(port_error)?;
    Ok(Json(documents.iter().map(BookRecord::from_domain).collect()))
}

/// Upload one or more plain-text books.
///
/// Accepts a multipart/form-data request with one part per file and an
/// optional `folder_id` text part.
#[utoipa::path(
    post,
    path = "/books",
    request_body(content_type = "multipart/form-data", description = "The text files to upload."),
    responses(
        (status = 201, description = "Books created", body = [BookRecord]),
        (status = 400, description = "Bad request (e.g., no file or not UTF-8 text)"),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn upload_books_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> HandlerResult<impl IntoResponse> {
    let mut files = Vec::new();
    let mut folder_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        if field.name() == Some("folder_id") {
            let raw = decode_text("folder_id", field_bytes(field).await?)?;
            if !raw.trim().is_empty() {
                let id = Uuid::parse_str(raw.trim())
                    .map_err(|_| bad_request("Invalid folder_id format"))?;
                folder_id = Some(id);
            }
            continue;
        }
        let name = field.file_name().unwrap_or("untitled.txt").to_string();
        let text = decode_text(&name, field_bytes(field).await?)?;
        files.push((name, text));
    }

    if files.is_empty() {
        return Err(bad_request("Multipart form must include a file"));
    }

    let mut created = Vec::with_capacity(files.len());
    for (name, text) in files {
        let document = app_state
            .library
            .upload_document(&name, &text, folder_id)
            .await
            .map_err(port_error)?;
        created.push(BookRecord::from_domain(&document));
    }
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch a single book.
#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookRecord),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Json<BookRecord>> {
    let document = app_state.library.get_document(id).await.map_err(port_error)?;
    Ok(Json(BookRecord::from_domain(&document)))
}

/// Delete a book and its reading progress.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<StatusCode> {
    app_state.library.delete_document(id).await.map_err(port_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a book into a folder, or back to the root.
#[utoipa::path(
    put,
    path = "/books/{id}/folder",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = MoveBookRequest,
    responses(
        (status = 200, description = "Book moved", body = BookRecord),
        (status = 404, description = "Book or folder not found")
    )
)]
pub async fn move_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveBookRequest>,
) -> HandlerResult<Json<BookRecord>> {
    let document = app_state
        .library
        .move_document(id, body.folder_id)
        .await
        .map_err(port_error)?;
    Ok(Json(BookRecord::from_domain(&document)))
}

/// Split a book into parts of roughly `targetChars` characters.
#[utoipa::path(
    post,
    path = "/books/{id}/split",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = SplitRequest,
    responses(
        (status = 201, description = "Parts created in a new folder", body = SplitResponse),
        (status = 400, description = "Invalid target size or empty book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn split_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<SplitRequest>,
) -> HandlerResult<impl IntoResponse> {
    let outcome = app_state
        .library
        .split_document(id, body.target_chars)
        .await
        .map_err(port_error)?;
    let response = SplitResponse {
        folder: FolderRecord::from_domain(&outcome.folder),
        parts: outcome.parts.iter().map(BookRecord::from_domain).collect(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// The book's text as lines of tagged segments for the reading view.
#[utoipa::path(
    get,
    path = "/books/{id}/render",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Rendered lines", body = [LineRecord]),
        (status = 404, description = "Book not found")
    )
)]
pub async fn render_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Json<Vec<LineRecord>>> {
    let lines = app_state.library.render_document(id).await.map_err(port_error)?;
    Ok(Json(lines.into_iter().map(LineRecord::from).collect()))
}

/// Unknown words of the book, each with surrounding context.
#[utoipa::path(
    get,
    path = "/books/{id}/learning-queue",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "Words to learn", body = [WordInContextRecord]),
        (status = 404, description = "Book not found")
    )
)]
pub async fn learning_queue_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Json<Vec<WordInContextRecord>>> {
    let queue = app_state.library.learning_queue(id).await.map_err(port_error)?;
    Ok(Json(queue.into_iter().map(WordInContextRecord::from).collect()))
}

/// Record the reading position in a book.
#[utoipa::path(
    put,
    path = "/books/{id}/progress",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Progress stored", body = ProgressRecord),
        (status = 404, description = "Book not found")
    )
)]
pub async fn record_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProgressRequest>,
) -> HandlerResult<Json<ProgressRecord>> {
    let progress = app_state
        .library
        .record_progress(id, body.scroll_offset)
        .await
        .map_err(port_error)?;
    Ok(Json(ProgressRecord::from_domain(&progress)))
}

/// Estimate the language level of one batch of the book's unknown words.
#[utoipa::path(
    post,
    path = "/books/{id}/level-analysis",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = LevelAnalysisRequest,
    responses(
        (status = 200, description = "Level estimate", body = LevelAnalysisRecord),
        (status = 404, description = "Book not found"),
        (status = 412, description = "Translation API key is not configured"),
        (status = 502, description = "Translation provider failed")
    )
)]
pub async fn level_analysis_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Option<Json<LevelAnalysisRequest>>,
) -> HandlerResult<Json<LevelAnalysisRecord>> {
    let batch = body.map(|Json(b)| b).unwrap_or_default().batch;
    let library = &app_state.library;
    let document = library.get_document(id).await.map_err(port_error)?;
    let known = library.known_words().await.map_err(port_error)?;
    let settings = library.load_settings().await.map_err(port_error)?;

    let analysis = app_state
        .translations
        .analyze_level(&settings.api_key, &document.content, &known, batch)
        .await
        .map_err(port_error)?;
    Ok(Json(LevelAnalysisRecord::from_domain(&analysis)))
}

//=========================================================================================
// Dictionary Handlers
//=========================================================================================

/// List every dictionary entry.
#[utoipa::path(
    get,
    path = "/dictionary",
    responses((status = 200, description = "Dictionary entries", body = [DictionaryWordRecord]))
)]
pub async fn list_words_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<DictionaryWordRecord>>> {
    let words = app_state.library.list_words().await.map_err(port_error)?;
    Ok(Json(words.iter().map(DictionaryWordRecord::from_domain).collect()))
}

/// Add a new known word. Fails if the word is already tracked.
#[utoipa::path(
    post,
    path = "/dictionary/words",
    request_body = WordRequest,
    responses(
        (status = 201, description = "Word added", body = DictionaryWordRecord),
        (status = 400, description = "Empty word"),
        (status = 409, description = "Word already tracked"),
        (status = 507, description = "Storage is full")
    )
)]
pub async fn add_word_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<WordRequest>,
) -> HandlerResult<impl IntoResponse> {
    let word = app_state.library.add_word(&body.word).await.map_err(port_error)?;
    Ok((StatusCode::CREATED, Json(DictionaryWordRecord::from_domain(&word))))
}

/// Mark a word as known, adding it if needed.
#[utoipa::path(
    post,
    path = "/dictionary/words/known",
    request_body = WordRequest,
    responses(
        (status = 200, description = "Word marked known", body = DictionaryWordRecord),
        (status = 400, description = "Empty word"),
        (status = 507, description = "Storage is full")
    )
)]
pub async fn mark_known_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<WordRequest>,
) -> HandlerResult<Json<DictionaryWordRecord>> {
    let word = app_state.library.mark_known(&body.word).await.map_err(port_error)?;
    Ok(Json(DictionaryWordRecord::from_domain(&word)))
}

/// Mark a word as still being learned, adding it if needed.
#[utoipa::path(
    post,
    path = "/dictionary/words/learning",
    request_body = WordRequest,
    responses(
        (status = 200, description = "Word marked as learning", body = DictionaryWordRecord),
        (status = 400, description = "Empty word"),
        (status = 507, description = "Storage is full")
    )
)]
pub async fn mark_learning_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<WordRequest>,
) -> HandlerResult<Json<DictionaryWordRecord>> {
    let word = app_state
        .library
        .upsert_word(&body.word, false)
        .await
        .map_err(port_error)?;
    Ok(Json(DictionaryWordRecord::from_domain(&word)))
}

/// Flip a word between known and learning.
#[utoipa::path(
    patch,
    path = "/dictionary/words/{id}/toggle",
    params(("id" = Uuid, Path, description = "Word id")),
    responses(
        (status = 200, description = "Word toggled", body = DictionaryWordRecord),
        (status = 404, description = "Word not found")
    )
)]
pub async fn toggle_word_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Json<DictionaryWordRecord>> {
    let word = app_state.library.toggle_word(id).await.map_err(port_error)?;
    Ok(Json(DictionaryWordRecord::from_domain(&word)))
}

/// Remove a word from the dictionary.
#[utoipa::path(
    delete,
    path = "/dictionary/words/{id}",
    params(("id" = Uuid, Path, description = "Word id")),
    responses(
        (status = 200, description = "Word removed", body = DictionaryWordRecord),
        (status = 404, description = "Word not found")
    )
)]
pub async fn delete_word_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<Json<DictionaryWordRecord>> {
    let word = app_state.library.delete_word(id).await.map_err(port_error)?;
    Ok(Json(DictionaryWordRecord::from_domain(&word)))
}

/// Import a one-word-per-line file as known words.
#[utoipa::path(
    post,
    path = "/dictionary/import",
    request_body(content_type = "multipart/form-data", description = "The word list to import."),
    responses(
        (status = 200, description = "Number of new words", body = ImportResponse),
        (status = 400, description = "No file or not UTF-8 text"),
        (status = 507, description = "Storage is full")
    )
)]
pub async fn import_dictionary_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> HandlerResult<Json<ImportResponse>> {
    let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
    else {
        return Err(bad_request("Multipart form must include a file"));
    };
    let name = field.file_name().unwrap_or("dictionary.txt").to_string();
    let text = decode_text(&name, field_bytes(field).await?)?;

    let added = app_state
        .library
        .import_dictionary(&text)
        .await
        .map_err(port_error)?;
    Ok(Json(ImportResponse { added }))
}

/// Download the dictionary as plain text.
#[utoipa::path(
    get,
    path = "/dictionary/export",
    responses((status = 200, description = "Known words, then words being learned", content_type = "text/plain", body = String))
)]
pub async fn export_dictionary_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let text = app_state.library.export_dictionary().await.map_err(port_error)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"dictionary.txt\""),
        ],
        text,
    ))
}

//=========================================================================================
// Folder Handlers
//=========================================================================================

/// List every folder.
#[utoipa::path(
    get,
    path = "/folders",
    responses((status = 200, description = "All folders", body = [FolderRecord]))
)]
pub async fn list_folders_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<FolderRecord>>> {
    let folders = app_state.library.list_folders().await.map_err(port_error)?;
    Ok(Json(folders.iter().map(FolderRecord::from_domain).collect()))
}

/// Create a folder.
#[utoipa::path(
    post,
    path = "/folders",
    request_body = FolderNameRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderRecord),
        (status = 400, description = "Empty name")
    )
)]
pub async fn create_folder_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<FolderNameRequest>,
) -> HandlerResult<impl IntoResponse> {
    let folder = app_state.library.create_folder(&body.name).await.map_err(port_error)?;
    Ok((StatusCode::CREATED, Json(FolderRecord::from_domain(&folder))))
}

/// Rename a folder.
#[utoipa::path(
    patch,
    path = "/folders/{id}",
    params(("id" = Uuid, Path, description = "Folder id")),
    request_body = FolderNameRequest,
    responses(
        (status = 200, description = "Folder renamed", body = FolderRecord),
        (status = 400, description = "Empty name"),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn rename_folder_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<FolderNameRequest>,
) -> HandlerResult<Json<FolderRecord>> {
    let folder = app_state
        .library
        .rename_folder(id, &body.name)
        .await
        .map_err(port_error)?;
    Ok(Json(FolderRecord::from_domain(&folder)))
}

/// Delete a folder. The caller must choose what happens to its books.
#[utoipa::path(
    delete,
    path = "/folders/{id}",
    params(("id" = Uuid, Path, description = "Folder id"), DeleteFolderParams),
    responses(
        (status = 200, description = "Folder deleted", body = DeleteFolderResponse),
        (status = 400, description = "Missing or invalid on_delete policy"),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn delete_folder_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteFolderParams>,
) -> HandlerResult<Json<DeleteFolderResponse>> {
    let affected_books = app_state
        .library
        .delete_folder(id, params.on_delete.into())
        .await
        .map_err(port_error)?;
    Ok(Json(DeleteFolderResponse { affected_books }))
}

//=========================================================================================
// Settings, Translation and Statistics Handlers
//=========================================================================================

/// Current reader settings, with defaults for anything never stored.
#[utoipa::path(
    get,
    path = "/settings",
    responses((status = 200, description = "Settings", body = SettingsRecord))
)]
pub async fn get_settings_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<Json<SettingsRecord>> {
    let settings = app_state.library.load_settings().await.map_err(port_error)?;
    Ok(Json(SettingsRecord::from_domain(&settings)))
}

/// Replace the reader settings.
#[utoipa::path(
    put,
    path = "/settings",
    request_body = SettingsRecord,
    responses((status = 200, description = "Settings stored", body = SettingsRecord))
)]
pub async fn update_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<SettingsRecord>,
) -> HandlerResult<Json<SettingsRecord>> {
    let settings = body.to_domain();
    app_state
        .library
        .save_settings(&settings)
        .await
        .map_err(port_error)?;
    Ok(Json(SettingsRecord::from_domain(&settings)))
}

/// Translate a word in context, a sentence, or a free-form prompt.
///
/// Replies 202 with `{"status": "pending"}` while the same request is already in flight.
#[utoipa::path(
    post,
    path = "/translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Translation", body = TranslateResponse),
        (status = 202, description = "Same request already in flight", body = TranslateResponse),
        (status = 412, description = "Translation API key is not configured"),
        (status = 429, description = "Provider is rate limiting"),
        (status = 502, description = "Provider failed")
    )
)]
pub async fn translate_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<TranslateRequest>,
) -> HandlerResult<impl IntoResponse> {
    let request = body.into_domain().map_err(bad_request)?;
    let settings = app_state.library.load_settings().await.map_err(port_error)?;

    let outcome = app_state
        .translations
        .request(&settings.api_key, &request)
        .await
        .map_err(port_error)?;
    Ok(match outcome {
        TranslationOutcome::Ready(translation) => {
            (StatusCode::OK, Json(TranslateResponse::Ready { translation }))
        }
        TranslationOutcome::Pending => (
            StatusCode::ACCEPTED,
            Json(TranslateResponse::Pending {
                status: "pending".to_string(),
            }),
        ),
    })
}

/// Library-wide statistics.
#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Library overview", body = OverviewRecord))
)]
pub async fn stats_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<Json<OverviewRecord>> {
    let overview = app_state.library.overview().await.map_err(port_error)?;
    Ok(Json(overview.into()))
}
