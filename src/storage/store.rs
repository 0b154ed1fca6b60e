//! Store
//!
//! Append-only byte file of length-prefixed frames with positional reads.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{LogError, Result};

use super::LEN_WIDTH;

/// Append-only record file
///
/// ## Concurrency:
/// - Every operation takes `&self` and runs under one exclusive lock, so an
///   append issued by one thread is visible to a read issued afterwards by
///   any other thread on the same `Store`.
pub struct Store {
    /// Path of the backing file
    path: PathBuf,

    /// Buffered writer plus logical size, guarded together
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    /// Appends land here first; flushed before every read
    writer: BufWriter<File>,

    /// Logical size in bytes (flushed + buffered)
    size: u64,
}

impl Store {
    /// Open or create a store file
    ///
    /// The logical size is taken from the current file length, so a store
    /// reopened after a restart continues right after the last frame.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let size = file.metadata()?.len();

        tracing::debug!("Opened store {} (size={})", path.display(), size);

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(StoreInner {
                writer: BufWriter::new(file),
                size,
            }),
        })
    }

    /// Append one frame: [len(8, BE)][payload]
    ///
    /// Returns `(written, position)` where `position` is the offset the frame
    /// starts at and `written = 8 + payload.len()`. The bytes may still sit
    /// in the write buffer when this returns.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock();

        let pos = inner.size;

        inner
            .writer
            .write_all(&(payload.len() as u64).to_be_bytes())?;
        inner.writer.write_all(payload)?;

        let written = LEN_WIDTH + payload.len() as u64;
        inner.size += written;

        Ok((written, pos))
    }

    /// Read the payload of the frame starting at `pos`
    ///
    /// Fails with `LogError::Eof` if no complete frame starts at `pos`.
    pub fn read(&self, pos: u64) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;

        if pos.saturating_add(LEN_WIDTH) > inner.size {
            return Err(LogError::Eof);
        }

        let file = inner.writer.get_mut();

        let mut len_bytes = [0u8; LEN_WIDTH as usize];
        read_exact_at(file, &mut len_bytes, pos)?;
        let len = u64::from_be_bytes(len_bytes);

        if (pos + LEN_WIDTH).saturating_add(len) > inner.size {
            return Err(LogError::Eof);
        }

        let file = inner.writer.get_mut();
        let mut payload = vec![0u8; len as usize];
        read_exact_at(file, &mut payload, pos + LEN_WIDTH)?;

        Ok(payload)
    }

    /// Positional read of raw bytes into `buf`, starting at `offset`
    ///
    /// Returns the number of bytes read, which is less than `buf.len()` only
    /// when the logical end is reached. Reading at or past the end fails with
    /// `LogError::Eof`.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let mut inner = self.inner.lock();
        inner.writer.flush()?;

        if buf.is_empty() {
            return Ok(0);
        }

        let file = inner.writer.get_mut();
        file.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            return Err(LogError::Eof);
        }

        Ok(filled)
    }

    /// Sequential reader over the raw store bytes, from position 0
    pub fn reader(&self) -> StoreReader<'_> {
        StoreReader { store: self, pos: 0 }
    }

    /// Logical size in bytes, including buffered appends
    pub fn size(&self) -> u64 {
        self.inner.lock().size
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered appends, sync and close the file
    pub fn close(self) -> Result<()> {
        let inner = self.inner.into_inner();
        let size = inner.size;

        let file = inner.writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        tracing::debug!("Closed store {} (size={})", self.path.display(), size);

        Ok(())
    }
}

/// `std::io::Read` over a store's raw frames
///
/// Each call goes through [`Store::read_at`], so appends made while the
/// reader is alive become visible to it.
pub struct StoreReader<'a> {
    store: &'a Store,
    pos: u64,
}

impl Read for StoreReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.store.read_at(buf, self.pos) {
            Ok(n) => {
                self.pos += n as u64;
                Ok(n)
            }
            Err(LogError::Eof) => Ok(0),
            Err(LogError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }
}

/// Fill `buf` from `offset`, treating a short file as end of data
fn read_exact_at(file: &mut File, buf: &mut [u8], offset: u64) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => LogError::Eof,
        _ => LogError::Io(e),
    })
}
