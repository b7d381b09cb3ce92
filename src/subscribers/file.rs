//! # Subscriber that renders committed batches into uniquely-named files.
//!
//! [`UniqueFileWriter`] owns a lazily-opened output file. The file is not
//! created at construction: the caller decides when a new one starts by
//! calling [`UniqueFileWriter::rotate`], typically right before each commit,
//! so every committed batch lands in its own file.
//!
//! File names are `out-<unique>-<n>.txt`, where `<unique>` is a random
//! 16-character token generated once per writer and `<n>` counts rotations
//! from zero. The token makes concurrent runs in the same directory not
//! clobber each other.
//!
//! Handing this subscriber an event before the first [`rotate`] is
//! programmer error and panics; committed data is never silently dropped.
//!
//! [`rotate`]: UniqueFileWriter::rotate

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::Rng;

use crate::events::Event;
use crate::subscribers::Subscribe;

const UNIQUE_LEN: usize = 16;
const UNIQUE_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

struct Inner {
    file: Option<File>,
    rotations: usize,
}

/// Renders delivered events into an explicitly-rotated, uniquely-named file.
pub struct UniqueFileWriter {
    dir: PathBuf,
    unique: String,
    inner: Mutex<Inner>,
}

impl UniqueFileWriter {
    /// Creates a writer that will place its files under `dir`.
    ///
    /// No file is opened yet; call [`rotate`](Self::rotate) before the first
    /// commit that should reach this subscriber.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let mut rng = rand::rng();
        let unique = (0..UNIQUE_LEN)
            .map(|_| UNIQUE_CHARS[rng.random_range(0..UNIQUE_CHARS.len())] as char)
            .collect();

        Self {
            dir: dir.into(),
            unique,
            inner: Mutex::new(Inner {
                file: None,
                rotations: 0,
            }),
        }
    }

    /// The random token embedded in every file name of this writer.
    pub fn unique(&self) -> &str {
        &self.unique
    }

    /// The directory the files are placed under.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of completed rotations (files opened so far).
    pub fn rotations(&self) -> usize {
        self.lock().rotations
    }

    /// Closes the current file (if any) and opens the next one.
    ///
    /// Returns the path of the newly created file.
    pub fn rotate(&self) -> io::Result<PathBuf> {
        let mut inner = self.lock();
        let path = self
            .dir
            .join(format!("out-{}-{}.txt", self.unique, inner.rotations));
        // Dropping the previous handle closes it.
        inner.file = Some(File::create(&path)?);
        inner.rotations += 1;
        Ok(path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for UniqueFileWriter {
    /// Writer placing its files in the current directory.
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl Subscribe for UniqueFileWriter {
    async fn handle(&self, event: &Event) {
        let mut inner = self.lock();
        let Some(file) = inner.file.as_mut() else {
            panic!(
                "{}: no output file is open; rotate() must run before events are committed",
                self.name()
            );
        };
        if let Err(err) = event.render_to(file) {
            panic!("{}: rendering event seq={} failed: {err}", self.name(), event.seq);
        }
    }

    fn name(&self) -> &'static str {
        "unique_file_writer"
    }
}
