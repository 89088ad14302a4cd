use std::{fmt, sync::Arc, time::Duration};

use parking_lot::RwLock;

use super::{load_alumni_csv, seed::seed_alumni, CsvError};
use crate::entities::alumni::CsvAlumni;
use crate::settings::AppConfig;

const DOWNLOAD_TIMEOUT_SECS: u64 = 10;

/// Where the current snapshot was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvOrigin {
    File(String),
    Url(String),
    Seed,
}

impl fmt::Display for CsvOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvOrigin::File(path) => write!(f, "file:{}", path),
            CsvOrigin::Url(_) => write!(f, "remote"),
            CsvOrigin::Seed => write!(f, "seed"),
        }
    }
}

struct Snapshot {
    rows: Arc<Vec<CsvAlumni>>,
    origin: CsvOrigin,
}

/// Shared, swappable snapshot of the alumni export.
///
/// Readers clone the `Arc` and never hold the lock across an await.
pub struct AlumniCsvStore {
    snapshot: RwLock<Snapshot>,
    path: String,
    url: Option<String>,
    client: reqwest::Client,
}

impl AlumniCsvStore {
    /// Store over fixed rows. Reloading it re-reads nothing and keeps the rows.
    pub fn from_rows(rows: Vec<CsvAlumni>) -> Self {
        AlumniCsvStore {
            snapshot: RwLock::new(Snapshot {
                rows: Arc::new(rows),
                origin: CsvOrigin::Seed,
            }),
            path: String::new(),
            url: None,
            client: reqwest::Client::new(),
        }
    }

    pub async fn load(config: &AppConfig) -> Self {
        let store = AlumniCsvStore {
            snapshot: RwLock::new(Snapshot {
                rows: Arc::new(Vec::new()),
                origin: CsvOrigin::Seed,
            }),
            path: config.alumni_csv_path.clone(),
            url: config.alumni_csv_url.clone().filter(|u| !u.trim().is_empty()),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        };
        store.reload().await;
        store
    }

    pub fn snapshot(&self) -> Arc<Vec<CsvAlumni>> {
        Arc::clone(&self.snapshot.read().rows)
    }

    pub fn origin(&self) -> CsvOrigin {
        self.snapshot.read().origin.clone()
    }

    /// Row with the given `row_id`. Rows are kept in file order.
    pub fn get(&self, row_id: i64) -> Option<CsvAlumni> {
        let rows = self.snapshot();
        rows.binary_search_by_key(&row_id, |r| r.row_id)
            .ok()
            .map(|i| rows[i].clone())
    }

    pub fn require(&self, row_id: i64) -> Result<CsvAlumni, CsvError> {
        self.get(row_id).ok_or(CsvError::RowNotFound(row_id))
    }

    /// Re-reads the export: local file, then the remote URL, then the seed list.
    pub async fn reload(&self) -> (usize, CsvOrigin) {
        if self.path.is_empty() && self.url.is_none() && !self.snapshot.read().rows.is_empty() {
            let current = self.snapshot.read();
            return (current.rows.len(), current.origin.clone());
        }

        let (rows, origin) = match self.read_file().await {
            Ok(rows) => (rows, CsvOrigin::File(self.path.clone())),
            Err(file_err) => {
                tracing::info!("Local alumni CSV unavailable: {}", file_err);
                match self.download().await {
                    Ok(Some((rows, url))) => (rows, CsvOrigin::Url(url)),
                    Ok(None) => (seed_alumni(), CsvOrigin::Seed),
                    Err(e) => {
                        tracing::warn!("Remote alumni CSV unavailable: {}", e);
                        (seed_alumni(), CsvOrigin::Seed)
                    }
                }
            }
        };

        tracing::info!("Loaded {} alumni rows from {}", rows.len(), origin);
        let count = rows.len();
        *self.snapshot.write() = Snapshot {
            rows: Arc::new(rows),
            origin: origin.clone(),
        };
        (count, origin)
    }

    async fn read_file(&self) -> Result<Vec<CsvAlumni>, CsvError> {
        if self.path.is_empty() {
            return Err(CsvError::Io("no local path configured".into()));
        }
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CsvError::Io(format!("{}: {}", self.path, e)))?;
        load_alumni_csv(bytes.as_slice())
    }

    async fn download(&self) -> Result<Option<(Vec<CsvAlumni>, String)>, CsvError> {
        let Some(url) = &self.url else {
            return Ok(None);
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CsvError::Http(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| CsvError::Http(e.to_string()))?;

        Ok(Some((load_alumni_csv(body.as_ref())?, url.clone())))
    }
}
