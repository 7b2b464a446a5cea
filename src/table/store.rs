//! File-backed record store
//!
//! Owns the table file, the id counter and the CRUD operations.
//!
//! - Creates append one row and fsync. A table with no header yet (missing,
//!   empty, blank lines or a lone BOM) is written whole with the header instead.
//! - Replace and delete rewrite the whole file through a temp file + rename,
//!   so readers never see a half-written table.
//! - The next id is seeded once in [`RecordStore::open`] and only ever
//!   increases afterwards, deletes included.
//!
//! All access to the file goes through one in-process `RwLock`: mutations
//! hold it exclusively from read to write, reads hold it shared.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::codec;
use super::errors::{TableError, TableResult};
use super::record::{CatFields, CatRecord};

/// State guarded by the table lock.
#[derive(Debug)]
struct TableState {
    /// Id handed to the next successful or failed create, `None` once
    /// `u64::MAX` has been handed out
    next_id: Option<u64>,
}

/// Record store over a single CSV table file.
#[derive(Debug)]
pub struct RecordStore {
    /// Path to the table file
    table_path: PathBuf,
    /// Sibling path used for atomic rewrites
    temp_path: PathBuf,
    state: RwLock<TableState>,
}

impl RecordStore {
    /// Opens the store and seeds the id counter from the table.
    ///
    /// A missing or empty file is an empty table and the counter starts at
    /// 1. Otherwise it starts one past the highest id on disk. The file is
    /// not created here; the first create does that.
    ///
    /// # Errors
    ///
    /// `StorageRead` if the file exists but cannot be read, `MalformedRow`
    /// if any row fails to decode. A table already holding `u64::MAX` opens
    /// fine; creates then fail with `IdsExhausted`.
    pub fn open(table_path: impl Into<PathBuf>) -> TableResult<Self> {
        let table_path = table_path.into();
        let records = read_table(&table_path)?;
        let next_id = records
            .iter()
            .map(|r| r.id)
            .max()
            .map_or(Some(1), |max| max.checked_add(1));

        Ok(Self {
            temp_path: temp_path_for(&table_path),
            table_path,
            state: RwLock::new(TableState { next_id }),
        })
    }

    /// Creates a table file holding only the header.
    ///
    /// # Errors
    ///
    /// `StorageWrite` if the file already exists or cannot be created.
    pub fn create_table(table_path: &Path) -> TableResult<()> {
        ensure_parent_dir(table_path)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(table_path)
            .map_err(|e| {
                TableError::write_failed(
                    format!("Failed to create table file: {}", table_path.display()),
                    e,
                )
            })?;

        file.write_all(codec::encode_header().as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| TableError::write_failed("Failed to write table header", e))
    }

    /// Returns the path to the table file.
    pub fn path(&self) -> &Path {
        &self.table_path
    }

    /// Returns the id the next create will receive, or `None` if ids are
    /// exhausted.
    pub fn next_id(&self) -> Option<u64> {
        self.read_state().next_id
    }

    /// Validates `fields`, assigns the next id and appends the new row.
    ///
    /// The id is consumed before the append. If the append fails the id is
    /// burned, so ids stay unique but may have gaps.
    ///
    /// # Errors
    ///
    /// `IdsExhausted` once `u64::MAX` has been assigned.
    pub fn create(&self, fields: CatFields) -> TableResult<CatRecord> {
        fields.validate()?;

        let mut state = self.write_state();
        let id = state.next_id.ok_or(TableError::IdsExhausted)?;
        state.next_id = id.checked_add(1);

        let record = CatRecord::new(id, fields);
        self.append(&record)?;

        Ok(record)
    }

    /// Returns every record in file order.
    pub fn list(&self) -> TableResult<Vec<CatRecord>> {
        let _state = self.read_state();
        read_table(&self.table_path)
    }

    /// Returns the first record with `id`, or `None`.
    pub fn get_by_id(&self, id: u64) -> TableResult<Option<CatRecord>> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Replaces every attribute of the record with `id`.
    ///
    /// This is a full replace, not a merge. Returns `None` when no record
    /// has that id; the file is then left untouched.
    pub fn replace_by_id(&self, id: u64, fields: CatFields) -> TableResult<Option<CatRecord>> {
        fields.validate()?;

        let _state = self.write_state();
        let mut records = read_table(&self.table_path)?;

        let updated = match records.iter_mut().find(|r| r.id == id) {
            Some(slot) => {
                slot.fields = fields;
                slot.clone()
            }
            None => return Ok(None),
        };

        self.rewrite(&records)?;
        Ok(Some(updated))
    }

    /// Removes every record with `id` and returns how many were removed.
    ///
    /// The counter is not touched, so a deleted id is never handed out again.
    pub fn delete_by_id(&self, id: u64) -> TableResult<usize> {
        let _state = self.write_state();
        let mut records = read_table(&self.table_path)?;

        let before = records.len();
        records.retain(|r| r.id != id);
        let removed = before - records.len();

        if removed > 0 {
            self.rewrite(&records)?;
        }

        Ok(removed)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, TableState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends one row.
    ///
    /// If the file holds no header row yet, the whole table is written
    /// through [`Self::rewrite`] so the header always comes first.
    fn append(&self, record: &CatRecord) -> TableResult<()> {
        ensure_parent_dir(&self.table_path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.table_path)
            .map_err(|e| {
                TableError::write_failed(
                    format!("Failed to open table file: {}", self.table_path.display()),
                    e,
                )
            })?;

        let mut existing = String::new();
        file.read_to_string(&mut existing).map_err(|e| {
            TableError::read_failed("Failed to read table file before append", e)
        })?;

        if !codec::has_header(&existing)? {
            drop(file);
            return self.rewrite(std::slice::from_ref(record));
        }

        let mut chunk = String::new();
        if !existing.ends_with('\n') {
            chunk.push('\n');
        }
        chunk.push_str(&codec::encode_row(record));

        file.write_all(chunk.as_bytes()).map_err(|e| {
            TableError::write_failed(format!("Failed to append row for id {}", record.id), e)
        })?;

        // fsync - the create is not acknowledged before the row is durable
        file.sync_all().map_err(|e| {
            TableError::write_failed(format!("fsync failed after appending id {}", record.id), e)
        })
    }

    /// Atomically replaces the table with `records`.
    ///
    /// 1. Write temp file
    /// 2. fsync temp file
    /// 3. Rename temp over the table
    fn rewrite(&self, records: &[CatRecord]) -> TableResult<()> {
        let content = codec::encode_table(records);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| {
                TableError::write_failed(
                    format!("Failed to create temp table: {}", self.temp_path.display()),
                    e,
                )
            })?;

        file.write_all(content.as_bytes())
            .map_err(|e| TableError::write_failed("Failed to write temp table", e))?;
        file.sync_all()
            .map_err(|e| TableError::write_failed("fsync failed on temp table", e))?;
        drop(file);

        fs::rename(&self.temp_path, &self.table_path).map_err(|e| {
            let _ = fs::remove_file(&self.temp_path);
            TableError::write_failed(
                format!("Failed to replace table file: {}", self.table_path.display()),
                e,
            )
        })?;

        // Best effort: make the rename itself durable
        if let Ok(dir) = File::open(parent_dir(&self.table_path)) {
            let _ = dir.sync_all();
        }

        Ok(())
    }
}

/// Reads and decodes the whole table. A missing file is an empty table.
fn read_table(table_path: &Path) -> TableResult<Vec<CatRecord>> {
    let text = match fs::read_to_string(table_path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(TableError::read_failed(
                format!("Failed to read table file: {}", table_path.display()),
                e,
            ))
        }
    };

    codec::decode_table(&text)
}

fn temp_path_for(table_path: &Path) -> PathBuf {
    let mut name = table_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("table"));
    name.push(".tmp");
    table_path.with_file_name(name)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn ensure_parent_dir(table_path: &Path) -> TableResult<()> {
    let parent = parent_dir(table_path);
    if parent.exists() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|e| {
        TableError::write_failed(
            format!("Failed to create table directory: {}", parent.display()),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tom() -> CatFields {
        CatFields::new("Tom", "tom.png", "orange cat", "male", "none")
    }

    fn table_with_id(id: u64) -> String {
        format!("ID,Name,Image,Description,Gender,Observations\n{},a,b,c,d,e\n", id)
    }

    fn open_in(dir: &TempDir) -> RecordStore {
        RecordStore::open(dir.path().join("gatos.csv")).unwrap()
    }

    #[test]
    fn test_open_missing_file_starts_at_one() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_in(&temp_dir);

        assert_eq!(store.next_id(), Some(1));
        assert!(store.list().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_first_create_writes_header_and_row() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_in(&temp_dir);

        let created = store.create(tom()).unwrap();
        assert_eq!(created.id, 1);

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            contents,
            "ID,Name,Image,Description,Gender,Observations\n1,Tom,tom.png,orange cat,male,none\n"
        );
    }

    #[test]
    fn test_create_appends_without_rewriting() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_in(&temp_dir);

        store.create(tom()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();
        store.create(tom()).unwrap();
        let after = fs::read_to_string(store.path()).unwrap();

        assert!(after.starts_with(&before));
        assert!(after.ends_with("2,Tom,tom.png,orange cat,male,none\n"));
    }

    #[test]
    fn test_append_repairs_missing_trailing_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gatos.csv");
        fs::write(&path, "ID,Name,Image,Description,Gender,Observations\n1,a,b,c,d,e").unwrap();

        let store = RecordStore::open(&path).unwrap();
        store.create(tom()).unwrap();

        let ids: Vec<u64> = store.list().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_create_into_header_only_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gatos.csv");
        RecordStore::create_table(&path).unwrap();

        let store = RecordStore::open(&path).unwrap();
        store.create(tom()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("ID,Name").count(), 1);
    }

    #[test]
    fn test_create_table_refuses_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gatos.csv");
        RecordStore::create_table(&path).unwrap();

        let err = RecordStore::create_table(&path).unwrap_err();
        assert!(matches!(err, TableError::StorageWrite { .. }));
    }

    #[test]
    fn test_create_makes_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::open(temp_dir.path().join("nested/dir/gatos.csv")).unwrap();

        store.create(tom()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_rewrite_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_in(&temp_dir);

        store.create(tom()).unwrap();
        store.replace_by_id(1, tom()).unwrap();
        store.delete_by_id(1).unwrap();

        assert!(!temp_dir.path().join("gatos.csv.tmp").exists());
    }

    #[test]
    fn test_replace_missing_id_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_in(&temp_dir);
        store.create(tom()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(store.replace_by_id(42, tom()).unwrap().is_none());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_replace_validates_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_in(&temp_dir);
        store.create(tom()).unwrap();

        let mut fields = tom();
        fields.gender = " ".into();
        assert!(matches!(
            store.replace_by_id(1, fields),
            Err(TableError::Validation { field: "gender" })
        ));
    }

    #[test]
    fn test_malformed_table_fails_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gatos.csv");
        fs::write(
            &path,
            "ID,Name,Image,Description,Gender,Observations\nnope,a,b,c,d,e\n",
        )
        .unwrap();

        let err = RecordStore::open(&path).unwrap_err();
        assert!(matches!(err, TableError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_first_create_into_blank_table_writes_header() {
        for blank in ["\n", "\r\n\n", "\u{feff}"] {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("gatos.csv");
            fs::write(&path, blank).unwrap();

            let store = RecordStore::open(&path).unwrap();
            assert_eq!(store.create(tom()).unwrap().id, 1);
            store.create(tom()).unwrap();

            assert_eq!(
                fs::read_to_string(&path).unwrap(),
                "ID,Name,Image,Description,Gender,Observations\n\
                 1,Tom,tom.png,orange cat,male,none\n\
                 2,Tom,tom.png,orange cat,male,none\n",
                "blank table {:?}",
                blank
            );
            assert_eq!(RecordStore::open(&path).unwrap().list().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_max_id_on_disk_exhausts_counter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gatos.csv");
        fs::write(&path, table_with_id(u64::MAX)).unwrap();

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.next_id(), None);
        assert_eq!(store.list().unwrap().len(), 1);

        let before = fs::read_to_string(&path).unwrap();
        assert!(matches!(store.create(tom()), Err(TableError::IdsExhausted)));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_last_id_is_handed_out_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gatos.csv");
        fs::write(&path, table_with_id(u64::MAX - 1)).unwrap();

        let store = RecordStore::open(&path).unwrap();
        assert_eq!(store.create(tom()).unwrap().id, u64::MAX);
        assert!(matches!(store.create(tom()), Err(TableError::IdsExhausted)));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path_for(Path::new("/data/gatos.csv")),
            PathBuf::from("/data/gatos.csv.tmp")
        );
        assert_eq!(parent_dir(Path::new("gatos.csv")), Path::new("."));
    }
}
