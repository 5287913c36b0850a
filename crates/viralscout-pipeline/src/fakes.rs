//! In-memory port implementations for tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use viralscout_core::Video;
use viralscout_google::{CellUpdate, ValueInput};

use crate::ports::{
    BlobStore, ProviderError, StoreError, StoredObject, TabularStore, VideoProvider, VideoSearch,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Search provider returning a fixed result set, or failing.
pub struct FakeSearch {
    result: Result<Vec<Video>, u16>,
    calls: Mutex<Vec<(Vec<String>, u32)>>,
}

impl FakeSearch {
    #[must_use]
    pub fn returning(videos: Vec<Video>) -> Self {
        Self {
            result: Ok(videos),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every search fails with `status`.
    #[must_use]
    pub fn failing(status: u16) -> Self {
        Self {
            result: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(terms, max_per_term)` of each call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(Vec<String>, u32)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl VideoSearch for FakeSearch {
    async fn search_videos(
        &self,
        terms: &[String],
        max_per_term: u32,
    ) -> Result<Vec<Video>, ProviderError> {
        lock(&self.calls).push((terms.to_vec(), max_per_term));
        match &self.result {
            Ok(videos) => Ok(videos.clone()),
            Err(status) => Err(ProviderError::Status {
                status: *status,
                message: "search failed".to_owned(),
            }),
        }
    }
}

/// Provider backed by lookup tables. Unknown identifiers fail with a 404
/// status.
#[derive(Default)]
pub struct FakeProvider {
    followers: HashMap<String, u64>,
    videos: HashMap<String, Vec<Video>>,
    download_urls: HashMap<String, String>,
    media: HashMap<String, Vec<u8>>,
    follower_lookups: Mutex<Vec<String>>,
    video_lookups: Mutex<Vec<(String, u32)>>,
}

impl FakeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_followers(mut self, sec_uid: &str, count: u64) -> Self {
        self.followers.insert(sec_uid.to_owned(), count);
        self
    }

    #[must_use]
    pub fn with_videos(mut self, sec_uid: &str, videos: Vec<Video>) -> Self {
        self.videos.insert(sec_uid.to_owned(), videos);
        self
    }

    /// Register a resolvable video. `bytes = None` makes the download itself
    /// fail.
    #[must_use]
    pub fn with_media(mut self, video_id: &str, bytes: Option<Vec<u8>>) -> Self {
        let url = format!("https://cdn.test/{video_id}.mp4");
        if let Some(bytes) = bytes {
            self.media.insert(url.clone(), bytes);
        }
        self.download_urls.insert(video_id.to_owned(), url);
        self
    }

    #[must_use]
    pub fn follower_lookups(&self) -> Vec<String> {
        lock(&self.follower_lookups).clone()
    }

    #[must_use]
    pub fn video_lookups(&self) -> Vec<(String, u32)> {
        lock(&self.video_lookups).clone()
    }
}

fn not_found(what: &str) -> ProviderError {
    ProviderError::Status {
        status: 404,
        message: format!("{what} not found"),
    }
}

#[async_trait]
impl VideoProvider for FakeProvider {
    async fn follower_count(&self, sec_uid: &str) -> Result<u64, ProviderError> {
        lock(&self.follower_lookups).push(sec_uid.to_owned());
        self.followers
            .get(sec_uid)
            .copied()
            .ok_or_else(|| not_found(sec_uid))
    }

    /// Returns every registered video whatever `count` asks for, the way the
    /// live API can over-deliver.
    async fn recent_videos(&self, sec_uid: &str, count: u32) -> Result<Vec<Video>, ProviderError> {
        lock(&self.video_lookups).push((sec_uid.to_owned(), count));
        self.videos
            .get(sec_uid)
            .cloned()
            .ok_or_else(|| not_found(sec_uid))
    }

    async fn download_url(&self, video_id: &str) -> Result<String, ProviderError> {
        self.download_urls.get(video_id).cloned().ok_or_else(|| {
            ProviderError::MissingField("Download link not found in the API response.".to_owned())
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.media.get(url).cloned().ok_or_else(|| not_found(url))
    }
}

/// One spreadsheet held in memory.
pub struct MemorySheets {
    spreadsheet_id: String,
    sheets: Mutex<HashMap<String, (i64, Vec<Vec<String>>)>>,
    next_sheet_id: Mutex<i64>,
    fail_writes: bool,
    batch_updates: Mutex<usize>,
    value_writes: Mutex<Vec<(String, ValueInput)>>,
}

impl MemorySheets {
    #[must_use]
    pub fn new(spreadsheet_id: &str) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_owned(),
            sheets: Mutex::new(HashMap::new()),
            next_sheet_id: Mutex::new(1000),
            fail_writes: false,
            batch_updates: Mutex::new(0),
            value_writes: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_sheet(self, title: &str, rows: &[&[&str]]) -> Self {
        let grid = rows
            .iter()
            .map(|r| r.iter().map(|c| (*c).to_owned()).collect())
            .collect();
        let id = self.allocate_id();
        lock(&self.sheets).insert(title.to_owned(), (id, grid));
        self
    }

    /// Every write fails with a backend error; reads still succeed.
    #[must_use]
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Current contents of a worksheet, unpadded.
    #[must_use]
    pub fn sheet(&self, title: &str) -> Option<Vec<Vec<String>>> {
        lock(&self.sheets).get(title).map(|(_, g)| g.clone())
    }

    #[must_use]
    pub fn sheet_id(&self, title: &str) -> Option<i64> {
        lock(&self.sheets).get(title).map(|(id, _)| *id)
    }

    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = lock(&self.sheets).keys().cloned().collect();
        titles.sort();
        titles
    }

    #[must_use]
    pub fn batch_update_calls(&self) -> usize {
        *lock(&self.batch_updates)
    }

    /// `(a1_start, input)` of each `update_values` call, in order.
    #[must_use]
    pub fn value_writes(&self) -> Vec<(String, ValueInput)> {
        lock(&self.value_writes).clone()
    }

    fn allocate_id(&self) -> i64 {
        let mut next = lock(&self.next_sheet_id);
        *next += 1;
        *next
    }

    fn check_spreadsheet(&self, spreadsheet_id: &str) -> Result<(), StoreError> {
        if spreadsheet_id == self.spreadsheet_id {
            Ok(())
        } else {
            Err(StoreError::SpreadsheetNotFound(spreadsheet_id.to_owned()))
        }
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            Err(StoreError::Backend("write rejected".to_owned()))
        } else {
            Ok(())
        }
    }

    fn with_grid<T>(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        f: impl FnOnce(&mut Vec<Vec<String>>) -> T,
    ) -> Result<T, StoreError> {
        self.check_spreadsheet(spreadsheet_id)?;
        let mut sheets = lock(&self.sheets);
        let (_, grid) = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::WorksheetNotFound(sheet.to_owned()))?;
        Ok(f(grid))
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn set_cell(grid: &mut Vec<Vec<String>>, row: usize, col: usize, text: String) {
    if grid.len() < row {
        grid.resize(row, Vec::new());
    }
    let cells = &mut grid[row - 1];
    if cells.len() <= col {
        cells.resize(col + 1, String::new());
    }
    cells[col] = text;
}

/// `(row, col)` of an A1 cell reference: 1-based row, 0-based column.
fn parse_a1(a1: &str) -> Option<(usize, usize)> {
    let split = a1.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = a1.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let col = letters
        .bytes()
        .try_fold(0_usize, |acc, b| {
            b.is_ascii_uppercase()
                .then(|| acc * 26 + usize::from(b - b'A' + 1))
        })?;
    let row: usize = digits.parse().ok()?;
    (row > 0).then_some((row, col - 1))
}

#[async_trait]
impl TabularStore for MemorySheets {
    async fn get_all_values(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        self.with_grid(spreadsheet_id, sheet, |grid| {
            let width = grid.iter().map(Vec::len).max().unwrap_or(0);
            grid.iter()
                .map(|r| {
                    let mut r = r.clone();
                    r.resize(width, String::new());
                    r
                })
                .collect()
        })
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        _rows: usize,
        _cols: usize,
    ) -> Result<i64, StoreError> {
        self.check_spreadsheet(spreadsheet_id)?;
        self.check_writable()?;
        if lock(&self.sheets).contains_key(title) {
            return Err(StoreError::Backend(format!(
                "A sheet with the name \"{title}\" already exists."
            )));
        }
        let id = self.allocate_id();
        lock(&self.sheets).insert(title.to_owned(), (id, Vec::new()));
        Ok(id)
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        self.with_grid(spreadsheet_id, sheet, |grid| {
            grid.extend(rows.iter().map(|r| r.iter().map(cell_text).collect()));
        })
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        a1_start: &str,
        rows: &[Vec<Value>],
        input: ValueInput,
    ) -> Result<(), StoreError> {
        lock(&self.value_writes).push((a1_start.to_owned(), input));
        self.check_writable()?;
        let (row0, col0) = parse_a1(a1_start)
            .ok_or_else(|| StoreError::Backend(format!("bad range {a1_start}")))?;
        self.with_grid(spreadsheet_id, sheet, |grid| {
            for (r, values) in rows.iter().enumerate() {
                for (c, value) in values.iter().enumerate() {
                    set_cell(grid, row0 + r, col0 + c, cell_text(value));
                }
            }
        })
    }

    async fn batch_update_cells(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        cells: &[CellUpdate],
    ) -> Result<(), StoreError> {
        *lock(&self.batch_updates) += 1;
        self.check_writable()?;
        self.with_grid(spreadsheet_id, sheet, |grid| {
            for cell in cells {
                set_cell(grid, cell.row, cell.col, cell_text(&cell.value));
            }
        })
    }
}

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub folder_id: String,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Blob store that keeps uploads in memory.
#[derive(Default)]
pub struct MemoryDrive {
    folders: Mutex<Vec<(String, String)>>,
    files: Mutex<Vec<StoredFile>>,
    fail_folders: bool,
    failing_uploads: Vec<String>,
}

impl MemoryDrive {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder creation fails with a backend error.
    #[must_use]
    pub fn failing_folders(mut self) -> Self {
        self.fail_folders = true;
        self
    }

    /// Uploads named `filename` fail with a backend error; others succeed.
    #[must_use]
    pub fn failing_upload(mut self, filename: &str) -> Self {
        self.failing_uploads.push(filename.to_owned());
        self
    }

    /// `(name, parent_id)` of each created folder.
    #[must_use]
    pub fn folders(&self) -> Vec<(String, String)> {
        lock(&self.folders).clone()
    }

    #[must_use]
    pub fn files(&self) -> Vec<StoredFile> {
        lock(&self.files).clone()
    }
}

#[async_trait]
impl BlobStore for MemoryDrive {
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<StoredObject, StoreError> {
        if self.fail_folders {
            return Err(StoreError::Backend(format!("File not found: {parent_id}.")));
        }
        let mut folders = lock(&self.folders);
        folders.push((name.to_owned(), parent_id.to_owned()));
        let id = format!("folder-{}", folders.len());
        Ok(StoredObject {
            link: Some(format!("https://drive.test/folders/{id}")),
            id,
        })
    }

    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        folder_id: &str,
        mime_type: &str,
    ) -> Result<StoredObject, StoreError> {
        if self.failing_uploads.iter().any(|f| f == filename) {
            return Err(StoreError::Backend(
                "The user's Drive storage quota has been exceeded.".to_owned(),
            ));
        }
        let mut files = lock(&self.files);
        files.push(StoredFile {
            folder_id: folder_id.to_owned(),
            filename: filename.to_owned(),
            mime_type: mime_type.to_owned(),
            bytes,
        });
        let id = format!("file-{}", files.len());
        Ok(StoredObject {
            link: Some(format!("https://drive.test/file/{id}")),
            id,
        })
    }
}
