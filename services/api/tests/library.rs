mod common;

use api_lib::library::LibraryService;
use common::{library, CrowdedStore, RejectingStore, PREFIX};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use vocab_reader_core::domain::{AppSettings, FolderDeletePolicy, TextAlign};
use vocab_reader_core::ports::{KeyValueStore, PortError};

#[tokio::test]
async fn upload_analyzes_against_current_vocabulary() {
    let (_, library) = library();
    library.import_dictionary("the\ncat").await.unwrap();

    let document = library
        .upload_document("Cats.txt", "The cat sat.", None)
        .await
        .unwrap();

    assert_eq!(document.title, "Cats");
    assert_eq!(document.stats.char_count, 12);
    assert_eq!(document.stats.unique_word_count, 3);
    assert_eq!(document.stats.known_word_count, 2);
    assert_eq!(document.stats.difficulty_percentage, 33);
    assert_eq!(library.list_documents().await.unwrap(), vec![document]);
}

#[tokio::test]
async fn blank_upload_is_rejected() {
    let (_, library) = library();
    let err = library.upload_document("empty.txt", " \n ", None).await;
    assert!(matches!(err, Err(PortError::InvalidInput(_))));
    assert!(library.list_documents().await.unwrap().is_empty());
}

#[tokio::test]
async fn import_counts_only_new_words_and_refreshes_documents() {
    let (_, library) = library();
    let document = library
        .upload_document("fruit.txt", "Apple and banana.", None)
        .await
        .unwrap();
    assert_eq!(document.stats.difficulty_percentage, 100);

    let added = library.import_dictionary("Apple\napple\nBANANA\n\n").await.unwrap();
    assert_eq!(added, 2);
    assert_eq!(library.import_dictionary("banana").await.unwrap(), 0);

    let refreshed = library.get_document(document.id).await.unwrap();
    assert_eq!(refreshed.stats.known_word_count, 2);
    assert_eq!(refreshed.stats.unknown_word_count, 1);
    assert_eq!(refreshed.stats.difficulty_percentage, 33);
    assert_eq!(refreshed.content, document.content);
}

#[tokio::test]
async fn upsert_is_idempotent() {
    let (_, library) = library();
    let first = library.upsert_word("Hello", true).await.unwrap();
    let second = library.upsert_word("hello", true).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.text, "hello");
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(library.list_words().await.unwrap().len(), 1);
}

#[tokio::test]
async fn adding_a_tracked_word_is_a_conflict() {
    let (_, library) = library();
    library.add_word("river").await.unwrap();
    let err = library.add_word("River").await;
    assert!(matches!(err, Err(PortError::Conflict(_))));

    let err = library.add_word("  ").await;
    assert!(matches!(err, Err(PortError::InvalidInput(_))));
}

#[tokio::test]
async fn toggle_and_delete_propagate_to_documents() {
    let (_, library) = library();
    let document = library
        .upload_document("a.txt", "Dogs bark.", None)
        .await
        .unwrap();
    let word = library.mark_known("dogs").await.unwrap();
    assert_eq!(
        library.get_document(document.id).await.unwrap().stats.known_word_count,
        1
    );

    let toggled = library.toggle_word(word.id).await.unwrap();
    assert!(!toggled.is_known);
    assert_eq!(
        library.get_document(document.id).await.unwrap().stats.known_word_count,
        0
    );

    library.toggle_word(word.id).await.unwrap();
    library.delete_word(word.id).await.unwrap();
    let stats = library.get_document(document.id).await.unwrap().stats;
    assert_eq!(stats.known_word_count, 0);
    assert_eq!(stats.difficulty_percentage, 100);

    let missing = library.delete_word(word.id).await;
    assert!(matches!(missing, Err(PortError::NotFound(_))));
}

#[tokio::test]
async fn export_lists_known_words_before_learning_ones() {
    let (_, library) = library();
    library.upsert_word("alpha", true).await.unwrap();
    library.upsert_word("beta", false).await.unwrap();

    let text = library.export_dictionary().await.unwrap();
    let alpha = text.find("alpha").unwrap();
    let beta = text.find("beta").unwrap();
    assert!(alpha < beta);
}

#[tokio::test]
async fn deleting_a_document_drops_its_progress() {
    let (_, library) = library();
    let document = library
        .upload_document("a.txt", "Some text.", None)
        .await
        .unwrap();
    library.record_progress(document.id, 120.0).await.unwrap();
    library.record_progress(document.id, 340.5).await.unwrap();
    assert_eq!(
        library.get_progress(document.id).await.unwrap().unwrap().scroll_offset,
        340.5
    );

    library.delete_document(document.id).await.unwrap();
    assert!(library.get_progress(document.id).await.unwrap().is_none());
    assert!(matches!(
        library.get_document(document.id).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn progress_rejects_bad_offsets_and_unknown_documents() {
    let (_, library) = library();
    let document = library.upload_document("a.txt", "Text.", None).await.unwrap();

    assert!(matches!(
        library.record_progress(document.id, -1.0).await,
        Err(PortError::InvalidInput(_))
    ));
    assert!(matches!(
        library.record_progress(document.id, f64::NAN).await,
        Err(PortError::InvalidInput(_))
    ));
    assert!(matches!(
        library.record_progress(uuid::Uuid::new_v4(), 1.0).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn folder_deletion_orphans_or_cascades() {
    let (_, library) = library();
    let kept = library.create_folder("Kept books").await.unwrap();
    let dropped = library.create_folder("Dropped books").await.unwrap();

    let orphan = library
        .upload_document("a.txt", "First.", Some(kept.id))
        .await
        .unwrap();
    let doomed = library
        .upload_document("b.txt", "Second.", Some(dropped.id))
        .await
        .unwrap();
    library.record_progress(doomed.id, 10.0).await.unwrap();

    let affected = library
        .delete_folder(kept.id, FolderDeletePolicy::Orphan)
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(library.get_document(orphan.id).await.unwrap().folder_id, None);

    let affected = library
        .delete_folder(dropped.id, FolderDeletePolicy::Cascade)
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert!(library.get_document(doomed.id).await.is_err());
    assert!(library.get_progress(doomed.id).await.unwrap().is_none());
    assert!(library.list_folders().await.unwrap().is_empty());
    assert_eq!(library.list_documents().await.unwrap().len(), 1);
}

#[tokio::test]
async fn folders_are_renamed_and_validated() {
    let (_, library) = library();
    let folder = library.create_folder("Novels").await.unwrap();
    let renamed = library.rename_folder(folder.id, " Classics ").await.unwrap();
    assert_eq!(renamed.name, "Classics");

    assert!(matches!(
        library.rename_folder(folder.id, "   ").await,
        Err(PortError::InvalidInput(_))
    ));
    assert!(matches!(
        library.upload_document("a.txt", "Text.", Some(uuid::Uuid::new_v4())).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn moving_a_document_between_folders() {
    let (_, library) = library();
    let folder = library.create_folder("Later").await.unwrap();
    let document = library.upload_document("a.txt", "Text.", None).await.unwrap();

    let moved = library.move_document(document.id, Some(folder.id)).await.unwrap();
    assert_eq!(moved.folder_id, Some(folder.id));
    let back = library.move_document(document.id, None).await.unwrap();
    assert_eq!(back.folder_id, None);
}

#[tokio::test]
async fn split_stores_folder_and_parts_and_keeps_the_source() {
    let (_, library) = library();
    let content = "One two. Three four. Five six. Seven eight.";
    let source = library
        .upload_document("Long Story.txt", content, None)
        .await
        .unwrap();

    let outcome = library.split_document(source.id, 12).await.unwrap();
    assert!(outcome.parts.len() > 1);
    assert_eq!(outcome.folder.name, "Long Story");

    let folders = library.list_folders().await.unwrap();
    assert_eq!(folders, vec![outcome.folder.clone()]);

    let documents = library.list_documents().await.unwrap();
    assert_eq!(documents.len(), 1 + outcome.parts.len());
    assert!(documents.iter().any(|d| d.id == source.id));
    let count = outcome.parts.len();
    for (i, part) in outcome.parts.iter().enumerate() {
        assert_eq!(part.folder_id, Some(outcome.folder.id));
        assert_eq!(part.title, format!("Long Story ({}/{})", i + 1, count));
    }

    assert!(matches!(
        library.split_document(source.id, 0).await,
        Err(PortError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn overview_summarizes_library() {
    let (_, library) = library();
    library.upload_document("a.txt", "red blue", None).await.unwrap();
    library.upload_document("b.txt", "red green", None).await.unwrap();
    library.upsert_word("red", true).await.unwrap();
    library.upsert_word("blue", false).await.unwrap();

    let overview = library.overview().await.unwrap();
    assert_eq!(overview.total_documents, 2);
    assert_eq!(overview.total_unique_words, 4);
    assert_eq!(overview.known_words, 1);
    assert_eq!(overview.dictionary_words, 2);
    assert_eq!(overview.average_difficulty, 50);
    assert_eq!(overview.known_word_percentage, 50);
}

#[tokio::test]
async fn settings_merge_onto_defaults() {
    let (store, library) = library();
    assert_eq!(library.load_settings().await.unwrap(), AppSettings::default());

    store
        .set(
            &format!("{PREFIX}_settings"),
            r#"{"fontSize": 20, "textAlign": "justify"}"#,
        )
        .await
        .unwrap();
    let settings = library.load_settings().await.unwrap();
    assert_eq!(settings.font_size, 20);
    assert_eq!(settings.text_align, TextAlign::Justify);
    assert_eq!(settings.highlight_color, AppSettings::default().highlight_color);

    let updated = AppSettings {
        api_key: "key".into(),
        ..settings
    };
    library.save_settings(&updated).await.unwrap();
    assert_eq!(library.load_settings().await.unwrap(), updated);
}

#[tokio::test]
async fn corrupt_settings_fall_back_to_defaults() {
    let (store, library) = library();
    store
        .set(&format!("{PREFIX}_settings"), "not json")
        .await
        .unwrap();
    assert_eq!(library.load_settings().await.unwrap(), AppSettings::default());
}

//=========================================================================================
// Storage Recovery
//=========================================================================================

async fn crowded_library(
    max_books: Option<usize>,
    with_progress: usize,
) -> (Arc<CrowdedStore>, LibraryService, Vec<uuid::Uuid>) {
    let store = Arc::new(CrowdedStore::new(max_books));
    let library = LibraryService::new(store.clone(), PREFIX);
    let mut ids = Vec::new();
    for i in 0..22 {
        let document = library
            .upload_document(&format!("book{i}.txt"), &format!("Chapter {i} text."), None)
            .await
            .unwrap();
        ids.push(document.id);
    }
    for id in &ids[..with_progress] {
        library.record_progress(*id, 1.0).await.unwrap();
    }
    (store, library, ids)
}

#[tokio::test]
async fn full_storage_evicts_old_data_and_retries_once() {
    let (store, library, ids) = crowded_library(Some(20), 12).await;

    let added = library.import_dictionary("chapter").await.unwrap();
    assert_eq!(added, 1);
    assert_eq!(store.dictionary_attempts.load(Ordering::SeqCst), 2);

    let documents = library.list_documents().await.unwrap();
    assert_eq!(documents.len(), 20);
    assert!(library.get_document(ids[0]).await.is_err());
    assert!(library.get_document(ids[1]).await.is_err());
    assert!(documents.iter().all(|d| d.stats.known_word_count == 1));

    assert!(library.get_progress(ids[0]).await.unwrap().is_none());
    assert!(library.get_progress(ids[1]).await.unwrap().is_none());
    assert!(library.get_progress(ids[11]).await.unwrap().is_some());
}

#[tokio::test]
async fn storage_still_full_after_cleanup_is_reported() {
    let (store, library, _) = crowded_library(None, 12).await;

    let err = library.mark_known("chapter").await;
    assert!(matches!(err, Err(PortError::StorageFull(_))));
    assert_eq!(store.dictionary_attempts.load(Ordering::SeqCst), 2);
    assert!(library.list_words().await.unwrap().is_empty());
    assert_eq!(library.list_documents().await.unwrap().len(), 20);
}

#[tokio::test]
async fn evicted_documents_take_their_progress_along() {
    let (_, library, ids) = crowded_library(Some(20), 1).await;

    library.import_dictionary("chapter").await.unwrap();
    assert!(library.get_document(ids[0]).await.is_err());
    assert!(library.get_progress(ids[0]).await.unwrap().is_none());
}

//=========================================================================================
// Failed and Concurrent Writes
//=========================================================================================

#[tokio::test]
async fn failed_stats_refresh_restores_the_dictionary() {
    let store = Arc::new(RejectingStore::default());
    let library = LibraryService::new(store.clone(), PREFIX);
    let document = library
        .upload_document("pets.txt", "cat dog", None)
        .await
        .unwrap();

    store.reject("books");
    let err = library.mark_known("cat").await;
    assert!(matches!(err, Err(PortError::StorageFull(_))));

    assert!(library.list_words().await.unwrap().is_empty());
    let stats = library.get_document(document.id).await.unwrap().stats;
    assert_eq!(stats.known_word_count, 0);
    assert_eq!(stats.difficulty_percentage, 100);
}

#[tokio::test]
async fn failed_cascade_leaves_folder_books_and_progress() {
    let store = Arc::new(RejectingStore::default());
    let library = LibraryService::new(store.clone(), PREFIX);
    let folder = library.create_folder("Shelf").await.unwrap();
    let document = library
        .upload_document("a.txt", "Text.", Some(folder.id))
        .await
        .unwrap();
    library.record_progress(document.id, 42.0).await.unwrap();

    store.reject("folders");
    let err = library
        .delete_folder(folder.id, FolderDeletePolicy::Cascade)
        .await;
    assert!(matches!(err, Err(PortError::StorageFull(_))));

    assert_eq!(library.list_folders().await.unwrap().len(), 1);
    assert_eq!(
        library.get_document(document.id).await.unwrap().folder_id,
        Some(folder.id)
    );
    assert!(library.get_progress(document.id).await.unwrap().is_some());
}

#[tokio::test]
async fn failed_split_stores_nothing() {
    let store = Arc::new(RejectingStore::default());
    let library = LibraryService::new(store.clone(), PREFIX);
    let source = library
        .upload_document("Story.txt", "One two. Three four. Five six.", None)
        .await
        .unwrap();

    store.reject("books");
    assert!(library.split_document(source.id, 10).await.is_err());
    assert!(library.list_folders().await.unwrap().is_empty());
    assert_eq!(library.list_documents().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_are_all_kept() {
    let (_, library) = library();
    let library = Arc::new(library);

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let library = library.clone();
            tokio::spawn(async move { library.mark_known(&format!("word{i}")).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(library.list_words().await.unwrap().len(), 64);
}
