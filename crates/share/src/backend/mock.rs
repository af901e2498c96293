//! In-memory share for testing.

use crate::backend::{ByteStream, SessionHandle, ShareClient, ShareSession};
use crate::error::{ErrorKind, Result};
use crate::models::ShareEntry;
use crate::path::{normalize as normalize_path, validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_CHUNK_SIZE: usize = 16;

/// A failure to inject into a listing or a file read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The operation fails with an I/O error.
    Io,
    /// The session drops while performing the operation.
    Disconnect,
    /// The operation hangs for the given duration before continuing normally
    /// (pair with a paused Tokio clock).
    Stall(Duration),
    /// Reads only: the first chunk arrives, then the transfer fails.
    Truncate,
}
impl Fault {
    fn into_error(self, path: &Path) -> ErrorKind {
        match self {
            Self::Disconnect => ErrorKind::Disconnected,
            _ => ErrorKind::Io(std::io::Error::other(format!("injected fault at {}", path.display()))),
        }
    }
}

/// Counters of the operations a [`MockShare`] has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockStats {
    pub connects: usize,
    pub closes: usize,
    pub lists: usize,
    pub opens: usize,
}

#[derive(Clone, Default)]
struct MockTree {
    /// Folder listings, in insertion order. The root is the empty path.
    folders: HashMap<PathBuf, Vec<ShareEntry>>,
    files: HashMap<PathBuf, Vec<u8>>,
    list_faults: HashMap<PathBuf, Fault>,
    read_faults: HashMap<PathBuf, Fault>,
    chunk_size: usize,
}
impl MockTree {
    fn add_entry(&mut self, folder: PathBuf, entry: ShareEntry) {
        let entries = self.folders.entry(folder).or_default();
        if !entries.iter().any(|existing| existing.name == entry.name) {
            entries.push(entry);
        }
    }

    /// Register every ancestor of `path` as a folder of its parent.
    fn add_ancestors(&mut self, path: &Path) {
        let mut parent = PathBuf::new();
        for component in path.parent().into_iter().flat_map(Path::components) {
            let name = component.as_os_str().to_string_lossy().into_owned();
            let folder = parent.join(&name);
            self.add_entry(parent, ShareEntry::directory(name));
            self.folders.entry(folder.clone()).or_default();
            parent = folder;
        }
    }

    fn leaf_name(path: &Path) -> String {
        path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

#[derive(Default)]
struct Counters {
    connects: AtomicUsize,
    closes: AtomicUsize,
    lists: AtomicUsize,
    opens: AtomicUsize,
    listed: Mutex<Vec<PathBuf>>,
}

/// In-memory share for testing.
///
/// Listings are reported in the order files and folders were added, which
/// makes it possible to test ordering guarantees that a real share would only
/// give for a fixed server. Every operation is counted, and faults can be
/// injected per path.
pub struct MockShare {
    name: String,
    tree: Arc<MockTree>,
    counters: Arc<Counters>,
    fail_connect: bool,
}

impl MockShare {
    /// Create a mock share pre-populated with files. Parent folders are
    /// created implicitly.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut tree = MockTree { chunk_size: DEFAULT_CHUNK_SIZE, ..MockTree::default() };
        tree.folders.insert(PathBuf::new(), Vec::new());
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                // The panic here is DELIBERATE. MockShare is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockShare::with_files: invalid path {}", path.display());
            };
            tree.add_ancestors(&validated);
            let parent = validated.parent().map(Path::to_path_buf).unwrap_or_default();
            tree.add_entry(parent, ShareEntry::file(MockTree::leaf_name(&validated)));
            tree.files.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            tree: Arc::new(tree),
            counters: Arc::default(),
            fail_connect: false,
        }
    }

    /// Add (possibly empty) folders.
    pub fn with_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        let tree = Arc::make_mut(&mut self.tree);
        for dir in dirs {
            let dir = dir.into();
            let Ok(validated) = validate_path(&dir) else {
                panic!("MockShare::with_dirs: invalid path {}", dir.display());
            };
            tree.add_ancestors(&validated);
            let parent = validated.parent().map(Path::to_path_buf).unwrap_or_default();
            tree.add_entry(parent, ShareEntry::directory(MockTree::leaf_name(&validated)));
            tree.folders.entry(validated).or_default();
        }
        self
    }

    /// Change the name of the mock share.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Change the size of the chunks file contents are streamed in.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        Arc::make_mut(&mut self.tree).chunk_size = chunk_size.max(1);
        self
    }

    /// Refuse every connection attempt.
    pub fn fail_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Inject a fault into listings of `path`.
    pub fn fail_list(mut self, path: impl Into<PathBuf>, fault: Fault) -> Self {
        Arc::make_mut(&mut self.tree).list_faults.insert(path.into(), fault);
        self
    }

    /// Inject a fault into reads of `path`.
    pub fn fail_read(mut self, path: impl Into<PathBuf>, fault: Fault) -> Self {
        Arc::make_mut(&mut self.tree).read_faults.insert(path.into(), fault);
        self
    }

    pub fn stats(&self) -> MockStats {
        MockStats {
            connects: self.counters.connects.load(Ordering::SeqCst),
            closes: self.counters.closes.load(Ordering::SeqCst),
            lists: self.counters.lists.load(Ordering::SeqCst),
            opens: self.counters.opens.load(Ordering::SeqCst),
        }
    }

    /// Every folder listed so far, in the order the listings were requested.
    pub fn listed(&self) -> Vec<PathBuf> {
        self.counters.listed.lock().map(|listed| listed.clone()).unwrap_or_default()
    }
}
impl Default for MockShare {
    fn default() -> Self {
        let files: [(&str, &[u8]); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl ShareClient for MockShare {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> Result<SessionHandle> {
        if self.fail_connect {
            exn::bail!(ErrorKind::Connect("mock share refused the connection".to_string()));
        }
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            tree: self.tree.clone(),
            counters: self.counters.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MockSession {
    tree: Arc<MockTree>,
    counters: Arc<Counters>,
    closed: AtomicBool,
}

#[async_trait]
impl ShareSession for MockSession {
    async fn list(&self, path: &Path) -> Result<Vec<ShareEntry>> {
        if self.closed.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Disconnected);
        }
        let path = normalize_path(path)?;
        self.counters.lists.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut listed) = self.counters.listed.lock() {
            listed.push(path.clone());
        }
        match self.tree.list_faults.get(&path) {
            Some(Fault::Stall(duration)) => tokio::time::sleep(*duration).await,
            Some(fault) => exn::bail!(fault.clone().into_error(&path)),
            None => {},
        }
        if let Some(entries) = self.tree.folders.get(&path) {
            return Ok(entries.clone());
        }
        if self.tree.files.contains_key(&path) {
            exn::bail!(ErrorKind::NotADirectory(path));
        }
        exn::bail!(ErrorKind::NotFound(path))
    }

    async fn open<'a>(&'a self, path: &'a Path) -> Result<ByteStream<'a>> {
        if self.closed.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Disconnected);
        }
        let path = validate_path(path)?;
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        let fault = self.tree.read_faults.get(&path).cloned();
        if let Some(fault @ (Fault::Io | Fault::Disconnect)) = &fault {
            exn::bail!(fault.clone().into_error(&path));
        }
        let Some(data) = self.tree.files.get(&path).cloned() else {
            if self.tree.folders.contains_key(&path) {
                exn::bail!(ErrorKind::InvalidPath(path));
            }
            exn::bail!(ErrorKind::NotFound(path));
        };
        let chunk_size = self.tree.chunk_size;
        Ok(Box::pin(stream! {
            if let Some(Fault::Stall(duration)) = fault {
                tokio::time::sleep(duration).await;
            }
            for (index, chunk) in data.chunks(chunk_size).enumerate() {
                if index > 0 && fault == Some(Fault::Truncate) {
                    yield Err(exn::Exn::from(Fault::Truncate.into_error(&path)));
                    return;
                }
                yield Ok(chunk.to_vec());
            }
        }))
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
