// ABOUTME: Filesystem capability trait and its tokio-backed host implementation.
// ABOUTME: Covers metadata lookups, permission repair, copy/rename/remove and log tailing.

use async_trait::async_trait;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Upper bound on bytes read from the end of a file by `read_tail`.
const TAIL_WINDOW: u64 = 64 * 1024;

/// What kind of entry a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Only reported by `symlink_metadata`.
    Symlink,
    Other,
}

/// The subset of metadata components care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub kind: EntryKind,
    pub len: u64,
    /// Any of the user/group/other execute bits is set.
    pub executable: bool,
}

impl EntryInfo {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Filesystem operations.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Metadata for `path`, following symlinks. `None` if nothing is there.
    async fn metadata(&self, path: &Path) -> io::Result<Option<EntryInfo>>;

    /// Metadata for `path` itself. A dangling symlink is an entry, not `None`.
    async fn symlink_metadata(&self, path: &Path) -> io::Result<Option<EntryInfo>>;

    /// Add execute permission for user, group and other.
    async fn set_executable(&self, path: &Path) -> io::Result<()>;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy a file, returning the number of bytes written.
    async fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Names of the entries directly inside `path`, sorted.
    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// The last `lines` lines of a text file.
    async fn read_tail(&self, path: &Path, lines: usize) -> io::Result<Vec<String>>;
}

/// `FileSystem` backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFileSystem;

#[async_trait]
impl FileSystem for HostFileSystem {
    async fn metadata(&self, path: &Path) -> io::Result<Option<EntryInfo>> {
        entry_info(tokio::fs::metadata(path).await)
    }

    async fn symlink_metadata(&self, path: &Path) -> io::Result<Option<EntryInfo>> {
        entry_info(tokio::fs::symlink_metadata(path).await)
    }

    async fn set_executable(&self, path: &Path) -> io::Result<()> {
        let mut perms = tokio::fs::metadata(path).await?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        tokio::fs::set_permissions(path, perms).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_dir_all(path).await
    }

    async fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        tokio::fs::copy(from, to).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::rename(from, to).await
    }

    async fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn read_tail(&self, path: &Path, lines: usize) -> io::Result<Vec<String>> {
        if lines == 0 {
            return Ok(Vec::new());
        }

        let mut file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        let start = len.saturating_sub(TAIL_WINDOW);
        file.seek(io::SeekFrom::Start(start)).await?;

        let mut buf = Vec::with_capacity((len - start) as usize);
        file.read_to_end(&mut buf).await?;

        let text = String::from_utf8_lossy(&buf);
        let mut all: Vec<&str> = text.lines().collect();
        // A window that starts mid-file most likely starts mid-line.
        if start > 0 && !all.is_empty() {
            all.remove(0);
        }

        let skip = all.len().saturating_sub(lines);
        Ok(all[skip..].iter().map(|l| l.to_string()).collect())
    }
}

fn entry_info(meta: io::Result<std::fs::Metadata>) -> io::Result<Option<EntryInfo>> {
    let meta = match meta {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let file_type = meta.file_type();
    let kind = if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_dir() {
        EntryKind::Dir
    } else {
        EntryKind::Other
    };

    Ok(Some(EntryInfo {
        kind,
        len: meta.len(),
        executable: meta.permissions().mode() & 0o111 != 0,
    }))
}
