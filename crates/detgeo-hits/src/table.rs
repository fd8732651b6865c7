//! Tabular per-event output.
//!
//! One text file, one row per event. Per detector (one per hits collection)
//! the columns are `<det>_nHits`, `<det>_x`, `<det>_y`, `<det>_z` (mm),
//! `<det>_E` (MeV) and `<det>_volName`; vector columns hold comma-joined
//! values. The header is written lazily on the first event, once the set of
//! registered detectors is observable.

use crate::error::{HitsError, Result};
use crate::hit::HitsCollection;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes per-event hit summaries as a tab-separated table.
#[derive(Debug)]
pub struct EventTable {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    detectors: Vec<String>,
}

impl EventTable {
    /// Create a table that will write to `path`. Nothing is opened until the
    /// first event arrives.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            detectors: Vec::new(),
        }
    }

    /// Change the output path. Only valid before the first event.
    pub fn set_file_name(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        if self.writer.is_some() {
            return Err(HitsError::OutputAlreadyOpen {
                path: self.path.clone(),
            });
        }
        self.path = path.into();
        Ok(())
    }

    /// The configured output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&mut self, detectors: &[(String, &HitsCollection)]) -> Result<()> {
        let file = File::create(&self.path).map_err(|source| HitsError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.detectors = detectors.iter().map(|(name, _)| name.clone()).collect();

        let mut columns = vec!["event".to_string()];
        for det in &self.detectors {
            columns.push(format!("{det}_nHits"));
            columns.push(format!("{det}_x"));
            columns.push(format!("{det}_y"));
            columns.push(format!("{det}_z"));
            columns.push(format!("{det}_E"));
            columns.push(format!("{det}_volName"));
        }
        writeln!(writer, "{}", columns.join("\t")).map_err(|source| HitsError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.writer = Some(writer);
        Ok(())
    }

    /// Record one event row. `collections` pairs each detector name with its
    /// drained hits collection; the detector set must stay the same across
    /// events.
    pub fn record_event(
        &mut self,
        event_id: u64,
        collections: &[(String, &HitsCollection)],
    ) -> Result<()> {
        if self.writer.is_none() {
            self.open(collections)?;
        }

        let mut row = vec![event_id.to_string()];
        for (det, collection) in collections {
            if !self.detectors.iter().any(|d| d == det) {
                return Err(HitsError::UnknownDetector { name: det.clone() });
            }
            let hits = collection.hits();
            let join = |f: &dyn Fn(&crate::hit::Hit) -> String| {
                hits.iter().map(|h| f(h)).collect::<Vec<_>>().join(",")
            };
            row.push(hits.len().to_string());
            row.push(join(&|h| format!("{}", h.position.x)));
            row.push(join(&|h| format!("{}", h.position.y)));
            row.push(join(&|h| format!("{}", h.position.z)));
            row.push(join(&|h| format!("{}", h.energy)));
            row.push(join(&|h| h.volume_name.clone()));
        }

        let writer = self.writer.as_mut().ok_or_else(|| HitsError::Io {
            path: self.path.clone(),
            source: std::io::Error::other("output not open"),
        })?;
        writeln!(writer, "{}", row.join("\t")).map_err(|source| HitsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Flush and close the output.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|source| HitsError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
