//! Destination store for transferred zone contents.
//!
//! The engine streams records into a [`ZoneSink`] as they come off the
//! wire and commits once the terminating SOA has been seen. The
//! production sink writes a zone file in presentation form with rdata in
//! RFC 3597 generic syntax, staged in a temp file so a failed transfer
//! never clobbers the previous zone contents.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::dns::record::Record;
use crate::error::{Result, XfrError};

/// Receives parsed records plus the terminating SOA's serial.
pub trait ZoneSink: Send {
    fn add_record(&mut self, record: &Record) -> Result<()>;
    fn commit(&mut self, serial: u32) -> Result<()>;
}

/// Opens one sink per accepted transfer.
pub trait ZoneSinkFactory: Send + Sync {
    fn open(&self, zone_name: &str, db_file: &Path) -> Result<Box<dyn ZoneSink>>;
}

/// File-backed sink writing `<db_file>.tmp` and renaming on commit.
#[derive(Debug)]
pub struct FileZoneSink {
    zone_name: String,
    db_file: PathBuf,
    tmp_file: PathBuf,
    writer: BufWriter<File>,
    records: u64,
}

impl FileZoneSink {
    /// Create the staging file eagerly so an unwritable destination is
    /// detected before any records arrive.
    pub fn open(zone_name: &str, db_file: &Path) -> Result<Self> {
        let tmp_file = db_file.with_extension("tmp");
        let file = File::create(&tmp_file).map_err(|e| {
            XfrError::StoreWriteError(format!("cannot create {}: {}", tmp_file.display(), e))
        })?;
        debug!("staging zone {} into {}", zone_name, tmp_file.display());
        Ok(Self {
            zone_name: zone_name.to_string(),
            db_file: db_file.to_path_buf(),
            tmp_file,
            writer: BufWriter::new(file),
            records: 0,
        })
    }
}

impl ZoneSink for FileZoneSink {
    fn add_record(&mut self, record: &Record) -> Result<()> {
        writeln!(
            self.writer,
            "{}. {} {} {} \\# {} {}",
            record.name(),
            record.ttl,
            record.rclass,
            record.rtype,
            record.rdata.len(),
            hex::encode(&record.rdata)
        )
        .map_err(|e| XfrError::StoreWriteError(e.to_string()))?;
        self.records += 1;
        Ok(())
    }

    fn commit(&mut self, serial: u32) -> Result<()> {
        writeln!(self.writer, "; zone {} serial {}", self.zone_name, serial)
            .map_err(|e| XfrError::StoreWriteError(e.to_string()))?;
        self.writer
            .flush()
            .map_err(|e| XfrError::StoreWriteError(e.to_string()))?;
        std::fs::rename(&self.tmp_file, &self.db_file).map_err(|e| {
            XfrError::StoreWriteError(format!(
                "cannot rename {} to {}: {}",
                self.tmp_file.display(),
                self.db_file.display(),
                e
            ))
        })?;
        info!(
            "committed zone {} serial {} ({} records) to {}",
            self.zone_name,
            serial,
            self.records,
            self.db_file.display()
        );
        Ok(())
    }
}

/// Default factory producing [`FileZoneSink`]s.
pub struct FileZoneSinkFactory;

impl ZoneSinkFactory for FileZoneSinkFactory {
    fn open(&self, zone_name: &str, db_file: &Path) -> Result<Box<dyn ZoneSink>> {
        Ok(Box::new(FileZoneSink::open(zone_name, db_file)?))
    }
}
