//! Append-only CSV record of every complete snapshot.
//!
//! The whole file is read, extended by one row and rewritten on each append.
//! Only one tracker may write a given ledger at a time.

use crate::core::CompleteSnapshot;
use anyhow::{Context, Result, bail};
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One ledger line, already rendered to the text that lands in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub time: String,
    pub gold: String,
    pub usd: String,
    pub eur: String,
    pub btc: String,
    pub eth: String,
}

impl From<&CompleteSnapshot> for LedgerRow {
    fn from(snapshot: &CompleteSnapshot) -> Self {
        LedgerRow {
            time: snapshot.timestamp.clone(),
            gold: snapshot.gold.to_string(),
            usd: snapshot.usd.to_string(),
            eur: snapshot.eur.to_string(),
            btc: snapshot.btc.to_string(),
            eth: snapshot.eth.to_string(),
        }
    }
}

impl LedgerRow {
    fn to_record(&self) -> StringRecord {
        StringRecord::from(vec![
            self.time.as_str(),
            self.gold.as_str(),
            self.usd.as_str(),
            self.eur.as_str(),
            self.btc.as_str(),
            self.eth.as_str(),
        ])
    }
}

pub struct CsvLedger {
    path: PathBuf,
    header: StringRecord,
}

impl CsvLedger {
    pub fn new<P: AsRef<Path>>(path: P, local_currency: &str) -> Self {
        let header = StringRecord::from(vec![
            "Time".to_string(),
            "Gold_24k_gram".to_string(),
            format!("USD_to_{local_currency}"),
            format!("EUR_to_{local_currency}"),
            "BTC_to_USD".to_string(),
            "ETH_to_USD".to_string(),
        ]);
        CsvLedger {
            path: path.as_ref().to_path_buf(),
            header,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &StringRecord {
        &self.header
    }

    /// All recorded rows in insertion order. A missing file has no rows.
    pub fn rows(&self) -> Result<Vec<StringRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open ledger: {}", self.path.display()))?;

        let header = reader
            .headers()
            .with_context(|| format!("Failed to read ledger header: {}", self.path.display()))?;
        if header != &self.header {
            bail!(
                "Ledger {} has columns {:?}, expected {:?}",
                self.path.display(),
                header,
                self.header
            );
        }

        reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to parse ledger: {}", self.path.display()))
    }

    /// Appends `row` after every existing row and returns the new row count.
    pub fn append(&self, row: &LedgerRow) -> Result<usize> {
        let mut rows = self.rows()?;
        debug!(existing = rows.len(), "Loaded ledger");
        rows.push(row.to_record());

        self.replace_with(&rows)?;

        info!(rows = rows.len(), path = %self.path.display(), "Data saved to ledger");
        Ok(rows.len())
    }

    /// Writes header plus `rows` to a sibling temp file and renames it over the ledger.
    /// The temp file never outlives a failed write.
    fn replace_with(&self, rows: &[StringRecord]) -> Result<()> {
        let tmp_path = self.tmp_path();
        let result = self.write_tmp(&tmp_path, rows).and_then(|()| {
            fs::rename(&tmp_path, &self.path).with_context(|| {
                format!(
                    "Failed to move {} over {}",
                    tmp_path.display(),
                    self.path.display()
                )
            })
        });
        if result.is_err() && tmp_path.exists() {
            if let Err(e) = fs::remove_file(&tmp_path) {
                warn!(path = %tmp_path.display(), error = %e, "Failed to remove temp ledger");
            }
        }
        result
    }

    fn write_tmp(&self, tmp_path: &Path, rows: &[StringRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        writer.write_record(&self.header)?;
        for record in rows {
            writer.write_record(record)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", tmp_path.display()))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
