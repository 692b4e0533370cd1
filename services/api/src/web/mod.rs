pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

use rest::*;
use state::AppState;

/// Uploaded books may be large; the default body limit is too small for them.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Builds the API router. CORS and the Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    let books = Router::new()
        .route("/books", get(list_books_handler).post(upload_books_handler))
        .route("/books/{id}", get(get_book_handler).delete(delete_book_handler))
        .route("/books/{id}/folder", put(move_book_handler))
        .route("/books/{id}/split", post(split_book_handler))
        .route("/books/{id}/render", get(render_book_handler))
        .route("/books/{id}/learning-queue", get(learning_queue_handler))
        .route("/books/{id}/progress", put(record_progress_handler))
        .route("/books/{id}/level-analysis", post(level_analysis_handler));

    let dictionary = Router::new()
        .route("/dictionary", get(list_words_handler))
        .route("/dictionary/words", post(add_word_handler))
        .route("/dictionary/words/known", post(mark_known_handler))
        .route("/dictionary/words/learning", post(mark_learning_handler))
        .route("/dictionary/words/{id}/toggle", patch(toggle_word_handler))
        .route("/dictionary/words/{id}", delete(delete_word_handler))
        .route("/dictionary/import", post(import_dictionary_handler))
        .route("/dictionary/export", get(export_dictionary_handler));

    let folders = Router::new()
        .route("/folders", get(list_folders_handler).post(create_folder_handler))
        .route(
            "/folders/{id}",
            patch(rename_folder_handler).delete(delete_folder_handler),
        );

    Router::new()
        .merge(books)
        .merge(dictionary)
        .merge(folders)
        .route(
            "/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .route("/translate", post(translate_handler))
        .route("/stats", get(stats_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state)
}
