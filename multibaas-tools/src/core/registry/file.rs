// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use alloy::primitives::Address;
use tempfile::NamedTempFile;

use super::{
    locks::{LabelLocks, ScopeGuard},
    AddressBinding, ChangeSet, Ledger, LinkRecord, LockScope, Registry, RegistryError, RegistryTxn,
    VersionRecord,
};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Registry persisted as a JSON ledger on disk.
///
/// Processes sharing the ledger are serialized through a sibling `<ledger>.lock` file, which is
/// created exclusively when a transaction begins and removed when it ends.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    lock_timeout: Duration,
    locks: LabelLocks,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            locks: LabelLocks::default(),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Reads the committed ledger; a missing file is an empty ledger.
    pub fn load(&self) -> Result<Ledger, RegistryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Ledger::default()),
            Err(source) => return Err(self.io_error(source)),
        };
        if contents.trim().is_empty() {
            return Ok(Ledger::default());
        }
        serde_json::from_str(&contents).map_err(|source| RegistryError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn store(&self, ledger: &Ledger) -> Result<(), RegistryError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let contents = serde_json::to_string_pretty(ledger).map_err(|source| {
            RegistryError::Corrupt {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        temp.write_all(contents.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| self.io_error(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    async fn lock_file(&self) -> Result<LockFile, RegistryError> {
        let path = self.lock_path();
        let started = Instant::now();
        loop {
            match LockFile::create(&path) {
                Ok(lock) => return Ok(lock),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    let holder = LockFile::holder(&path);
                    if let Some(pid) = holder.filter(|pid| !process_alive(*pid)) {
                        warn!(
                            @yellow,
                            "taking over stale ledger lock {} left by exited process {pid}",
                            path.display()
                        );
                        match fs::remove_file(&path) {
                            Ok(()) => continue,
                            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                            Err(source) => return Err(lock_io_error(&path, source)),
                        }
                    }
                    if started.elapsed() >= self.lock_timeout {
                        return Err(RegistryError::Locked {
                            path: path.display().to_string(),
                            pid: holder,
                        });
                    }
                    debug!(@grey, "waiting for ledger lock {}", path.display());
                    tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
                }
                Err(source) => return Err(lock_io_error(&path, source)),
            }
        }
    }

    fn io_error(&self, source: io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl Registry for FileRegistry {
    type Txn<'a> = FileTxn<'a>;

    async fn begin(&self, scope: &LockScope) -> Result<FileTxn<'_>, RegistryError> {
        let guard = self.locks.acquire(scope).await;
        let lock = self.lock_file().await?;
        let ledger = self.load()?;
        Ok(FileTxn {
            registry: self,
            ledger,
            _lock: lock,
            _guard: guard,
        })
    }
}

/// Exclusive lock file, removed on drop.
#[derive(Debug)]
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn create(path: &Path) -> io::Result<Self> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        let lock = Self {
            path: path.to_owned(),
        };
        writeln!(file, "{}", std::process::id())?;
        Ok(lock)
    }

    /// Pid recorded by the current holder, if the file is readable.
    fn holder(path: &Path) -> Option<u32> {
        fs::read_to_string(path).ok()?.trim().parse().ok()
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_io_error(path: &Path, source: io::Error) -> RegistryError {
    RegistryError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return true;
    }
    // SAFETY: signal 0 only checks that the process exists.
    let ret = unsafe { libc::kill(pid, 0) };
    ret == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

#[derive(Debug)]
pub struct FileTxn<'a> {
    registry: &'a FileRegistry,
    ledger: Ledger,
    _lock: LockFile,
    _guard: ScopeGuard,
}

impl RegistryTxn for FileTxn<'_> {
    async fn version(
        &mut self,
        contract_label: &str,
        version: &str,
    ) -> Result<Option<VersionRecord>, RegistryError> {
        Ok(self.ledger.version(contract_label, version).cloned())
    }

    async fn versions(
        &mut self,
        contract_label: &str,
    ) -> Result<Vec<VersionRecord>, RegistryError> {
        Ok(self.ledger.versions(contract_label).cloned().collect())
    }

    async fn binding(
        &mut self,
        address_label: &str,
    ) -> Result<Option<AddressBinding>, RegistryError> {
        Ok(self.ledger.binding(address_label).cloned())
    }

    async fn address_owner(
        &mut self,
        address: Address,
    ) -> Result<Option<AddressBinding>, RegistryError> {
        Ok(self.ledger.address_owner(address).cloned())
    }

    async fn link(
        &mut self,
        address_label: &str,
        contract_label: &str,
        version: &str,
    ) -> Result<Option<LinkRecord>, RegistryError> {
        Ok(self
            .ledger
            .link(address_label, contract_label, version)
            .cloned())
    }

    async fn commit(mut self, changes: ChangeSet) -> Result<(), RegistryError> {
        if changes.is_empty() {
            return Ok(());
        }
        for change in changes.changes() {
            self.ledger.apply(change);
        }
        self.registry.store(&self.ledger)
    }
}
