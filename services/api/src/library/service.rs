//! services/api/src/library/service.rs
//!
//! Orchestrates the core engine over the key-value store. This is the only
//! component that reads or writes library state; everything it hands to the
//! core is an explicit snapshot.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;
use vocab_reader_core::analyzer::{analyze, learning_queue, WordInContext};
use vocab_reader_core::domain::{
    AppSettings, Document, Folder, FolderDeletePolicy, KnownWords, ReadingProgress, Word,
};
use vocab_reader_core::ports::{KeyValueStore, PortError, PortResult};
use vocab_reader_core::render::{self, RenderLine};
use vocab_reader_core::segmenter::{self, SplitOutcome};
use vocab_reader_core::stats::{recompute_in_place, LibraryOverview};
use vocab_reader_core::vocabulary::{parse_word_list, Vocabulary};

use super::records::{
    BookRecord, DictionaryWordRecord, FolderRecord, ProgressRecord, SettingsRecord, StoredSettings,
};

/// Progress entries kept when storage runs out of room.
const PROGRESS_KEEP: usize = 10;
/// Documents kept when storage runs out of room.
const DOCUMENTS_KEEP: usize = 20;

/// The namespaced keys the library lives under.
#[derive(Debug, Clone)]
pub struct StorageKeys {
    pub books: String,
    pub folders: String,
    pub dictionary: String,
    pub progress: String,
    pub settings: String,
}

impl StorageKeys {
    pub fn new(prefix: &str) -> Self {
        Self {
            books: format!("{prefix}_books"),
            folders: format!("{prefix}_folders"),
            dictionary: format!("{prefix}_dictionary"),
            progress: format!("{prefix}_progress"),
            settings: format!("{prefix}_settings"),
        }
    }
}

pub struct LibraryService {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    /// Held for the whole load, mutate, save cycle of every write.
    writes: Mutex<()>,
}

impl LibraryService {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: &str) -> Self {
        Self {
            store,
            keys: StorageKeys::new(prefix),
            writes: Mutex::new(()),
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    //=====================================================================================
    // Documents
    //=====================================================================================

    pub async fn list_documents(&self) -> PortResult<Vec<Document>> {
        self.documents().await
    }

    pub async fn get_document(&self, id: Uuid) -> PortResult<Document> {
        self.documents()
            .await?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| document_not_found(id))
    }

    /// Stores a new document, analyzed against the current vocabulary.
    pub async fn upload_document(
        &self,
        file_name: &str,
        content: &str,
        folder_id: Option<Uuid>,
    ) -> PortResult<Document> {
        if content.trim().is_empty() {
            return Err(PortError::InvalidInput(format!("'{}' is empty", file_name)));
        }
        let _writes = self.writes.lock().await;
        if let Some(folder_id) = folder_id {
            self.ensure_folder(folder_id).await?;
        }

        let known = self.known_words().await?;
        let document = Document {
            id: Uuid::new_v4(),
            title: title_from_file_name(file_name),
            file_name: file_name.to_string(),
            content: content.to_string(),
            uploaded_at: Utc::now(),
            stats: analyze(content, &known),
            folder_id,
        };

        let mut documents = self.documents().await?;
        documents.push(document.clone());
        self.save_documents(&documents).await?;
        info!(
            "Uploaded '{}': {} unique words, {}% unknown",
            document.title, document.stats.unique_word_count, document.stats.difficulty_percentage
        );
        Ok(document)
    }

    /// Deletes a document together with its reading progress.
    pub async fn delete_document(&self, id: Uuid) -> PortResult<()> {
        let _writes = self.writes.lock().await;
        let mut documents = self.documents().await?;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Err(document_not_found(id));
        }
        let mut progress = self.progress_entries().await?;
        progress.retain(|p| p.document_id != id);

        self.write_all(vec![
            (self.keys.books.clone(), books_json(&documents)?),
            (self.keys.progress.clone(), progress_json(&progress)?),
        ])
        .await?;
        info!("Deleted document {}", id);
        Ok(())
    }

    /// Moves a document into `folder_id`, or back to the root when `None`.
    pub async fn move_document(&self, id: Uuid, folder_id: Option<Uuid>) -> PortResult<Document> {
        let _writes = self.writes.lock().await;
        if let Some(folder_id) = folder_id {
            self.ensure_folder(folder_id).await?;
        }
        let mut documents = self.documents().await?;
        let document = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| document_not_found(id))?;
        document.folder_id = folder_id;
        let moved = document.clone();
        self.save_documents(&documents).await?;
        Ok(moved)
    }

    /// Splits a stored document into parts inside a new folder. The source
    /// document is kept; on failure storage is left as it was.
    pub async fn split_document(&self, id: Uuid, target_chars: usize) -> PortResult<SplitOutcome> {
        let target = NonZeroUsize::new(target_chars).ok_or_else(|| {
            PortError::InvalidInput("the target part size must be positive".to_string())
        })?;
        let _writes = self.writes.lock().await;

        let mut documents = self.documents().await?;
        let source = documents
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| document_not_found(id))?;
        let known = self.known_words().await?;
        let outcome = segmenter::split_document(source, target, &known, Utc::now())?;

        let mut folders = self.folders().await?;
        folders.push(outcome.folder.clone());
        documents.extend(outcome.parts.iter().cloned());

        self.write_all(vec![
            (self.keys.folders.clone(), folders_json(&folders)?),
            (self.keys.books.clone(), books_json(&documents)?),
        ])
        .await?;

        info!(
            "Split document {} into {} parts in folder '{}'",
            id,
            outcome.parts.len(),
            outcome.folder.name
        );
        Ok(outcome)
    }

    //=====================================================================================
    // Vocabulary
    //=====================================================================================

    pub async fn list_words(&self) -> PortResult<Vec<Word>> {
        Ok(self.vocabulary().await?.into_words())
    }

    pub async fn known_words(&self) -> PortResult<KnownWords> {
        Ok(self.vocabulary().await?.known_words())
    }

    pub async fn upsert_word(&self, word: &str, is_known: bool) -> PortResult<Word> {
        let _writes = self.writes.lock().await;
        let mut vocabulary = self.vocabulary().await?;
        let entry = vocabulary.upsert(word, is_known, Utc::now())?.clone();
        self.commit_vocabulary(&vocabulary).await?;
        Ok(entry)
    }

    /// The reading view's one-click action.
    pub async fn mark_known(&self, word: &str) -> PortResult<Word> {
        self.upsert_word(word, true).await
    }

    /// Adds a new known word; a word already tracked is a conflict.
    pub async fn add_word(&self, word: &str) -> PortResult<Word> {
        let _writes = self.writes.lock().await;
        let mut vocabulary = self.vocabulary().await?;
        let entry = vocabulary.add(word, Utc::now())?.clone();
        self.commit_vocabulary(&vocabulary).await?;
        Ok(entry)
    }

    pub async fn toggle_word(&self, id: Uuid) -> PortResult<Word> {
        let _writes = self.writes.lock().await;
        let mut vocabulary = self.vocabulary().await?;
        let entry = vocabulary
            .toggle(id, Utc::now())
            .cloned()
            .ok_or_else(|| word_not_found(id))?;
        self.commit_vocabulary(&vocabulary).await?;
        Ok(entry)
    }

    pub async fn delete_word(&self, id: Uuid) -> PortResult<Word> {
        let _writes = self.writes.lock().await;
        let mut vocabulary = self.vocabulary().await?;
        let removed = vocabulary.remove(id).ok_or_else(|| word_not_found(id))?;
        self.commit_vocabulary(&vocabulary).await?;
        Ok(removed)
    }

    /// Imports a one-word-per-line file and returns how many words were new.
    pub async fn import_dictionary(&self, file_text: &str) -> PortResult<usize> {
        let words = parse_word_list(file_text);
        let _writes = self.writes.lock().await;
        let mut vocabulary = self.vocabulary().await?;
        let added = vocabulary.bulk_import(&words, Utc::now());
        if added > 0 {
            self.commit_vocabulary(&vocabulary).await?;
        }
        info!("Imported {} new words out of {} lines", added, words.len());
        Ok(added)
    }

    pub async fn export_dictionary(&self) -> PortResult<String> {
        Ok(self.vocabulary().await?.export_text())
    }

    //=====================================================================================
    // Folders
    //=====================================================================================

    pub async fn list_folders(&self) -> PortResult<Vec<Folder>> {
        self.folders().await
    }

    pub async fn create_folder(&self, name: &str) -> PortResult<Folder> {
        let _writes = self.writes.lock().await;
        let folder = Folder {
            id: Uuid::new_v4(),
            name: folder_name(name)?,
            created_at: Utc::now(),
        };
        let mut folders = self.folders().await?;
        folders.push(folder.clone());
        self.save_folders(&folders).await?;
        Ok(folder)
    }

    pub async fn rename_folder(&self, id: Uuid, name: &str) -> PortResult<Folder> {
        let name = folder_name(name)?;
        let _writes = self.writes.lock().await;
        let mut folders = self.folders().await?;
        let folder = folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| folder_not_found(id))?;
        folder.name = name;
        let renamed = folder.clone();
        self.save_folders(&folders).await?;
        Ok(renamed)
    }

    /// Deletes a folder and returns how many documents it held. What happens
    /// to those documents is the caller's explicit choice.
    pub async fn delete_folder(&self, id: Uuid, policy: FolderDeletePolicy) -> PortResult<usize> {
        let _writes = self.writes.lock().await;
        let mut folders = self.folders().await?;
        let before = folders.len();
        folders.retain(|f| f.id != id);
        if folders.len() == before {
            return Err(folder_not_found(id));
        }

        let mut documents = self.documents().await?;
        let contained: HashSet<Uuid> = documents
            .iter()
            .filter(|d| d.folder_id == Some(id))
            .map(|d| d.id)
            .collect();

        let mut writes = Vec::new();
        match policy {
            FolderDeletePolicy::Orphan => {
                for document in documents.iter_mut().filter(|d| contained.contains(&d.id)) {
                    document.folder_id = None;
                }
                writes.push((self.keys.books.clone(), books_json(&documents)?));
            }
            FolderDeletePolicy::Cascade => {
                documents.retain(|d| !contained.contains(&d.id));
                let mut progress = self.progress_entries().await?;
                progress.retain(|p| !contained.contains(&p.document_id));
                writes.push((self.keys.books.clone(), books_json(&documents)?));
                writes.push((self.keys.progress.clone(), progress_json(&progress)?));
            }
        }
        writes.push((self.keys.folders.clone(), folders_json(&folders)?));
        self.write_all(writes).await?;

        info!(
            "Deleted folder {} ({:?}, {} documents affected)",
            id,
            policy,
            contained.len()
        );
        Ok(contained.len())
    }

    //=====================================================================================
    // Reading
    //=====================================================================================

    /// Upserts the reading position of a document.
    pub async fn record_progress(
        &self,
        document_id: Uuid,
        scroll_offset: f64,
    ) -> PortResult<ReadingProgress> {
        if !scroll_offset.is_finite() || scroll_offset < 0.0 {
            return Err(PortError::InvalidInput(format!(
                "invalid scroll offset {}",
                scroll_offset
            )));
        }
        let _writes = self.writes.lock().await;
        self.get_document(document_id).await?;

        let entry = ReadingProgress {
            document_id,
            scroll_offset,
            last_read_at: Utc::now(),
        };
        let mut progress = self.progress_entries().await?;
        match progress.iter_mut().find(|p| p.document_id == document_id) {
            Some(existing) => *existing = entry.clone(),
            None => progress.push(entry.clone()),
        }
        self.save_progress(&progress).await?;
        Ok(entry)
    }

    pub async fn get_progress(&self, document_id: Uuid) -> PortResult<Option<ReadingProgress>> {
        Ok(self
            .progress_entries()
            .await?
            .into_iter()
            .find(|p| p.document_id == document_id))
    }

    pub async fn render_document(&self, id: Uuid) -> PortResult<Vec<RenderLine>> {
        let document = self.get_document(id).await?;
        let known = self.known_words().await?;
        Ok(render::segment(&document.content, &known).collect())
    }

    pub async fn learning_queue(&self, id: Uuid) -> PortResult<Vec<WordInContext>> {
        let document = self.get_document(id).await?;
        let known = self.known_words().await?;
        Ok(learning_queue(&document.content, &known))
    }

    pub async fn overview(&self) -> PortResult<LibraryOverview> {
        let documents = self.documents().await?;
        let vocabulary = self.vocabulary().await?;
        Ok(LibraryOverview::compute(&documents, vocabulary.words()))
    }

    //=====================================================================================
    // Settings
    //=====================================================================================

    /// Loads settings, merging whatever is stored onto the defaults.
    pub async fn load_settings(&self) -> PortResult<AppSettings> {
        let Some(raw) = self.store.get(&self.keys.settings).await? else {
            return Ok(AppSettings::default());
        };
        match serde_json::from_str::<StoredSettings>(&raw) {
            Ok(stored) => Ok(stored.merge_onto(AppSettings::default())),
            Err(e) => {
                warn!("Stored settings are unreadable, using defaults: {}", e);
                Ok(AppSettings::default())
            }
        }
    }

    pub async fn save_settings(&self, settings: &AppSettings) -> PortResult<()> {
        let _writes = self.writes.lock().await;
        let raw = to_json(&SettingsRecord::from_domain(settings))?;
        self.store.set(&self.keys.settings, &raw).await
    }

    //=====================================================================================
    // Storage Helpers
    //=====================================================================================

    async fn load_list<R: DeserializeOwned>(&self, key: &str) -> PortResult<Vec<R>> {
        match self.store.get(key).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                PortError::Unexpected(format!("Stored value under '{}' is corrupt: {}", key, e))
            }),
        }
    }


    async fn documents(&self) -> PortResult<Vec<Document>> {
        let records: Vec<BookRecord> = self.load_list(&self.keys.books).await?;
        Ok(records.into_iter().map(BookRecord::to_domain).collect())
    }

    async fn save_documents(&self, documents: &[Document]) -> PortResult<()> {
        self.store.set(&self.keys.books, &books_json(documents)?).await
    }

    async fn folders(&self) -> PortResult<Vec<Folder>> {
        let records: Vec<FolderRecord> = self.load_list(&self.keys.folders).await?;
        Ok(records.into_iter().map(FolderRecord::to_domain).collect())
    }

    async fn save_folders(&self, folders: &[Folder]) -> PortResult<()> {
        self.store.set(&self.keys.folders, &folders_json(folders)?).await
    }

    async fn ensure_folder(&self, id: Uuid) -> PortResult<()> {
        if self.folders().await?.iter().any(|f| f.id == id) {
            Ok(())
        } else {
            Err(folder_not_found(id))
        }
    }

    async fn progress_entries(&self) -> PortResult<Vec<ReadingProgress>> {
        let records: Vec<ProgressRecord> = self.load_list(&self.keys.progress).await?;
        Ok(records.into_iter().map(ProgressRecord::to_domain).collect())
    }

    async fn save_progress(&self, progress: &[ReadingProgress]) -> PortResult<()> {
        self.store.set(&self.keys.progress, &progress_json(progress)?).await
    }

    async fn vocabulary(&self) -> PortResult<Vocabulary> {
        let records: Vec<DictionaryWordRecord> = self.load_list(&self.keys.dictionary).await?;
        Ok(Vocabulary::from_words(
            records.into_iter().map(DictionaryWordRecord::to_domain).collect(),
        ))
    }

    /// Persists the dictionary, then refreshes every document's statistics.
    async fn commit_vocabulary(&self, vocabulary: &Vocabulary) -> PortResult<()> {
        let records: Vec<DictionaryWordRecord> = vocabulary
            .words()
            .iter()
            .map(DictionaryWordRecord::from_domain)
            .collect();
        let raw = to_json(&records)?;
        let previous = self.store.get(&self.keys.dictionary).await?;
        self.set_with_recovery(&self.keys.dictionary, &raw).await?;

        // Read after the write: recovery may have evicted documents.
        let refreshed = async {
            let mut documents = self.documents().await?;
            recompute_in_place(&mut documents, &vocabulary.known_words());
            self.save_documents(&documents).await
        }
        .await;
        if let Err(e) = refreshed {
            warn!("Refreshing book statistics failed, restoring the previous dictionary");
            self.roll_back(vec![(self.keys.dictionary.clone(), previous)]).await;
            return Err(e);
        }
        Ok(())
    }

    /// Writes every `(key, value)` in order. If one write fails, the keys
    /// already written get their previous values back.
    async fn write_all(&self, writes: Vec<(String, String)>) -> PortResult<()> {
        let mut previous = Vec::with_capacity(writes.len());
        for (key, _) in &writes {
            previous.push((key.clone(), self.store.get(key).await?));
        }
        for (written, (key, value)) in writes.iter().enumerate() {
            if let Err(e) = self.store.set(key, value).await {
                warn!("Write to '{}' failed, rolling back {} earlier writes", key, written);
                previous.truncate(written);
                self.roll_back(previous).await;
                return Err(e);
            }
        }
        Ok(())
    }

    async fn roll_back(&self, previous: Vec<(String, Option<String>)>) {
        for (key, value) in previous.into_iter().rev() {
            let restored = match value {
                Some(raw) => self.store.set(&key, &raw).await,
                None => self.store.remove(&key).await,
            };
            if let Err(e) = restored {
                error!("Failed to restore '{}': {}", key, e);
            }
        }
    }

    /// Writes `raw`, and on a full store evicts old data and retries exactly once.
    async fn set_with_recovery(&self, key: &str, raw: &str) -> PortResult<()> {
        match self.store.set(key, raw).await {
            Err(PortError::StorageFull(reason)) => {
                warn!("Storage quota exceeded ({}). Attempting to clean up...", reason);
                self.cleanup_old_data().await?;
                self.store.set(key, raw).await.map_err(|e| match e {
                    PortError::StorageFull(reason) => {
                        error!("Write to '{}' failed after cleanup: {}", key, reason);
                        PortError::StorageFull(
                            "the dictionary is too large to store; remove some words or old books"
                                .to_string(),
                        )
                    }
                    other => other,
                })
            }
            other => other,
        }
    }

    /// Keeps the most recently read progress entries and the most recently
    /// uploaded documents. Folders are never evicted.
    async fn cleanup_old_data(&self) -> PortResult<()> {
        let mut documents = self.documents().await?;
        if documents.len() > DOCUMENTS_KEEP {
            let mut uploads: Vec<_> = documents.iter().map(|d| (d.uploaded_at, d.id)).collect();
            uploads.sort_by(|a, b| b.0.cmp(&a.0));
            let keep: HashSet<Uuid> = uploads
                .into_iter()
                .take(DOCUMENTS_KEEP)
                .map(|(_, id)| id)
                .collect();
            let before = documents.len();
            documents.retain(|d| keep.contains(&d.id));
            self.save_documents(&documents).await?;
            info!("Evicted {} old documents", before - documents.len());
        }

        // Progress of evicted documents goes too.
        let remaining: HashSet<Uuid> = documents.iter().map(|d| d.id).collect();
        let mut progress = self.progress_entries().await?;
        let tracked = progress.len();
        progress.retain(|p| remaining.contains(&p.document_id));
        progress.sort_by(|a, b| b.last_read_at.cmp(&a.last_read_at));
        progress.truncate(PROGRESS_KEEP);
        if progress.len() != tracked {
            self.save_progress(&progress).await?;
            info!("Evicted old reading progress, kept {}", progress.len());
        }
        Ok(())
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> PortResult<String> {
    serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))
}

fn books_json(documents: &[Document]) -> PortResult<String> {
    let records: Vec<BookRecord> = documents.iter().map(BookRecord::from_domain).collect();
    to_json(&records)
}

fn folders_json(folders: &[Folder]) -> PortResult<String> {
    let records: Vec<FolderRecord> = folders.iter().map(FolderRecord::from_domain).collect();
    to_json(&records)
}

fn progress_json(progress: &[ReadingProgress]) -> PortResult<String> {
    let records: Vec<ProgressRecord> = progress.iter().map(ProgressRecord::from_domain).collect();
    to_json(&records)
}

/// The display title of an uploaded file: its name without the `.txt` extension.
fn title_from_file_name(file_name: &str) -> String {
    let name = file_name.trim();
    let stem = name
        .len()
        .checked_sub(4)
        .filter(|&cut| name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".txt"))
        .map_or(name, |cut| &name[..cut]);
    if stem.is_empty() {
        "Untitled".to_string()
    } else {
        stem.to_string()
    }
}

fn folder_name(name: &str) -> PortResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PortError::InvalidInput("folder name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn document_not_found(id: Uuid) -> PortError {
    PortError::NotFound(format!("Document {} not found", id))
}

fn folder_not_found(id: Uuid) -> PortError {
    PortError::NotFound(format!("Folder {} not found", id))
}

fn word_not_found(id: Uuid) -> PortError {
    PortError::NotFound(format!("Word {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_drop_the_text_extension() {
        assert_eq!(title_from_file_name("Moby Dick.txt"), "Moby Dick");
        assert_eq!(title_from_file_name("NOTES.TXT"), "NOTES");
        assert_eq!(title_from_file_name("story.md"), "story.md");
        assert_eq!(title_from_file_name(".txt"), "Untitled");
        assert_eq!(title_from_file_name("ё.txt"), "ё");
    }

    #[test]
    fn keys_are_namespaced() {
        let keys = StorageKeys::new("language_reader");
        assert_eq!(keys.books, "language_reader_books");
        assert_eq!(keys.dictionary, "language_reader_dictionary");
    }
}
