use std::collections::HashMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::books::domain::model::{BookEntity, BookPatch};
use crate::books::repository::BookRepository;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;

const SEARCHABLE_FIELDS: [&str; 2] = ["title", "author"];

// JsonBookRepository keeps the whole catalog in a single JSON array on disk. Every
// mutation loads the file, applies one change and rewrites it through a temp file
// and rename, all under `write_lock`, so a failed write never replaces the last
// good store and concurrent mutations never work from a stale snapshot.
#[derive(Debug)]
pub struct JsonBookRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonBookRepository {
    pub(crate) async fn open(path: &Path) -> LibraryResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|err| store_error("create directory", parent, err))?;
            }
        }
        let repo = Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        };
        match fs::metadata(path).await {
            Ok(_) => {
                let books = repo.load().await?;
                info!(path = %path.display(), books = books.len(), "opened book store");
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                repo.save(&[]).await?;
                info!(path = %path.display(), "created empty book store");
            }
            Err(err) => return Err(store_error("inspect", path, err)),
        }
        Ok(repo)
    }

    pub(crate) fn path(&self) -> &Path {
        self.path.as_path()
    }

    async fn load(&self) -> LibraryResult<Vec<BookEntity>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(store_error("read", &self.path, err)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(vec![]);
        }
        serde_json::from_slice(&bytes).map_err(|err| LibraryError::database(
            format!("malformed book store {}: {}", self.path.display(), err).as_str(),
            Some("malformed".to_string()), false))
    }

    async fn save(&self, books: &[BookEntity]) -> LibraryResult<()> {
        let json = serde_json::to_vec_pretty(books).map_err(|err| LibraryError::database(
            format!("failed to encode book store {}: {}", self.path.display(), err).as_str(), None, false))?;
        let tmp_path = self.temp_path();
        if let Err(err) = write_synced(&tmp_path, &json).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(store_error("write", &tmp_path, err));
        }
        if let Err(err) = fs::rename(&tmp_path, &self.path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(store_error("replace", &self.path, err));
        }
        debug!(path = %self.path.display(), books = books.len(), "saved book store");
        Ok(())
    }

    // Runs `op` against a fresh snapshot and persists the result only if `op` succeeds.
    async fn mutate<T, F>(&self, op: F) -> LibraryResult<T>
        where F: FnOnce(&mut Vec<BookEntity>) -> LibraryResult<T> + Send, T: Send {
        let _guard = self.write_lock.lock().await;
        let mut books = self.load().await?;
        let res = op(&mut books)?;
        self.save(&books).await?;
        Ok(res)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("books"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Repository<BookEntity> for JsonBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        self.mutate(|books| {
            if position(books, entity.isbn.as_str()).is_some() {
                return Err(LibraryError::duplicate_key(
                    format!("book with isbn {} already exists", entity.isbn).as_str()));
            }
            books.push(entity.clone());
            Ok(1)
        }).await
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        self.mutate(|books| {
            let ndx = position(books, entity.isbn.as_str())
                .ok_or_else(|| book_not_found(entity.isbn.as_str()))?;
            books[ndx] = entity.clone();
            Ok(1)
        }).await
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        self.load().await?
            .into_iter()
            .find(|b| b.isbn == id)
            .ok_or_else(|| book_not_found(id))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.mutate(|books| {
            let ndx = position(books, id).ok_or_else(|| book_not_found(id))?;
            books.remove(ndx);
            Ok(1)
        }).await
    }

    async fn list(&self) -> LibraryResult<Vec<BookEntity>> {
        self.load().await
    }

    // Matching is case-insensitive substring on every predicate field.
    async fn query(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<BookEntity>> {
        for k in predicate.keys() {
            if !SEARCHABLE_FIELDS.contains(&k.as_str()) {
                return Err(LibraryError::validation(
                    format!("cannot search books by {}", k).as_str(), Some(k.to_string())));
            }
        }
        let needles: Vec<(&str, String)> = predicate.iter()
            .map(|(k, v)| (k.as_str(), v.to_lowercase()))
            .collect();
        let books = self.load().await?;
        Ok(books.into_iter()
            .filter(|b| needles.iter().all(|(field, needle)| {
                field_value(b, field).to_lowercase().contains(needle.as_str())
            }))
            .collect())
    }
}

#[async_trait]
impl BookRepository for JsonBookRepository {
    async fn find_by_title(&self, title: &str) -> LibraryResult<Vec<BookEntity>> {
        self.query(&HashMap::from([("title".to_string(), title.to_string())])).await
    }

    async fn find_by_author(&self, author: &str) -> LibraryResult<Vec<BookEntity>> {
        self.query(&HashMap::from([("author".to_string(), author.to_string())])).await
    }

    async fn patch(&self, isbn: &str, patch: &BookPatch) -> LibraryResult<BookEntity> {
        self.mutate(|books| {
            let ndx = position(books, isbn).ok_or_else(|| book_not_found(isbn))?;
            patch.apply(&mut books[ndx]);
            Ok(books[ndx].clone())
        }).await
    }

    async fn toggle_read(&self, isbn: &str) -> LibraryResult<BookEntity> {
        self.mutate(|books| {
            let ndx = position(books, isbn).ok_or_else(|| book_not_found(isbn))?;
            books[ndx].is_read = !books[ndx].is_read;
            Ok(books[ndx].clone())
        }).await
    }

    async fn close(&self) -> LibraryResult<()> {
        let _guard = self.write_lock.lock().await;
        info!(path = %self.path.display(), "closed book store");
        Ok(())
    }
}

fn position(books: &[BookEntity], isbn: &str) -> Option<usize> {
    books.iter().position(|b| b.id() == isbn)
}

fn field_value<'a>(book: &'a BookEntity, field: &str) -> &'a str {
    match field {
        "title" => book.title.as_str(),
        _ => book.author.as_str(),
    }
}

fn book_not_found(isbn: &str) -> LibraryError {
    LibraryError::not_found(format!("book not found for {}", isbn).as_str())
}

fn store_error(action: &str, path: &Path, err: std::io::Error) -> LibraryError {
    LibraryError::database(
        format!("failed to {} book store {}: {}", action, path.display(), err).as_str(),
        Some(format!("{:?}", err.kind())), false)
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}
