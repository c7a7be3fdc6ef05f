use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use cohort_model::SignalName;

use crate::{SignalError, SignalStoreConfig};

/// Handle to the signal directory.
///
/// Cheap to clone; holds no open files. Any number of processes may use the same directory.
#[derive(Clone, Debug)]
pub struct SignalStore {
    root: PathBuf,
    poll_interval: Duration,
}

impl SignalStore {
    pub fn new(cfg: SignalStoreConfig) -> Self {
        Self {
            root: cfg.root,
            poll_interval: cfg.poll_interval,
        }
    }

    /// Store rooted at `root` with the default poll interval.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(SignalStoreConfig::default().with_root(root))
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Location of the marker for `name`.
    pub fn marker_path(&self, name: &SignalName) -> PathBuf {
        self.root.join(name.as_str())
    }

    fn ensure_dir(&self) -> Result<(), SignalError> {
        fs::create_dir_all(&self.root).map_err(|source| SignalError::CreateDir {
            path: self.root.clone(),
            source,
        })
    }

    /// Record that `name` happened.
    ///
    /// Raising an already raised signal is a no-op. The marker and its directory entry are
    /// flushed to disk before returning, so a raised signal survives a crash or power loss.
    #[instrument(level = "debug", skip(self), fields(signal = %name))]
    pub fn raise(&self, name: &SignalName) -> Result<(), SignalError> {
        self.ensure_dir()?;

        let path = self.marker_path(name);
        let created = OpenOptions::new().write(true).create_new(true).open(&path);
        match created {
            Ok(file) => {
                let raise_err = |source| SignalError::Raise {
                    name: name.to_string(),
                    path: path.clone(),
                    source,
                };
                file.sync_all().map_err(raise_err)?;
                sync_dir(&self.root).map_err(raise_err)?;
                debug!(target: "cohort.signal", "signal raised");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                trace!(target: "cohort.signal", "signal already raised");
                Ok(())
            }
            Err(source) => Err(SignalError::Raise {
                name: name.to_string(),
                path,
                source,
            }),
        }
    }

    /// Non-blocking check whether `name` has been raised.
    pub fn is_raised(&self, name: &SignalName) -> Result<bool, SignalError> {
        let path = self.marker_path(name);
        path.try_exists()
            .map_err(|source| SignalError::Check { path, source })
    }

    /// Resolve once `name` is raised, immediately if it already is.
    ///
    /// Existence is checked right away and then every poll interval. Every call waits
    /// independently, so one raise releases all waiters. There is no timeout; see
    /// [`SignalStore::wait_timeout`].
    #[instrument(level = "debug", skip(self), fields(signal = %name))]
    pub async fn wait(&self, name: &SignalName) -> Result<(), SignalError> {
        self.ensure_dir()?;

        let mut ticker = self.ticker();
        loop {
            ticker.tick().await;
            if self.is_raised(name)? {
                debug!(target: "cohort.signal", "signal observed");
                return Ok(());
            }
        }
    }

    /// Like [`SignalStore::wait`], but gives up after `timeout`.
    ///
    /// Returns `Ok(false)` when the deadline passed first: the signal has simply not been seen yet.
    pub async fn wait_timeout(
        &self,
        name: &SignalName,
        timeout: Duration,
    ) -> Result<bool, SignalError> {
        match time::timeout(timeout, self.wait(name)).await {
            Ok(res) => res.map(|()| true),
            Err(_) => {
                debug!(target: "cohort.signal", signal = %name, ?timeout, "wait timed out");
                Ok(false)
            }
        }
    }

    /// Like [`SignalStore::wait`], but returns `Ok(false)` once `cancel` fires.
    pub async fn wait_cancellable(
        &self,
        name: &SignalName,
        cancel: &CancellationToken,
    ) -> Result<bool, SignalError> {
        tokio::select! {
            biased;
            res = self.wait(name) => res.map(|()| true),
            _ = cancel.cancelled() => Ok(false),
        }
    }

    /// Resolve with the first of `names` found raised.
    ///
    /// When several are raised at once the earliest in `names` wins.
    /// An empty list never resolves.
    pub async fn wait_any(&self, names: &[SignalName]) -> Result<SignalName, SignalError> {
        self.ensure_dir()?;

        let mut ticker = self.ticker();
        loop {
            ticker.tick().await;
            for name in names {
                if self.is_raised(name)? {
                    debug!(target: "cohort.signal", signal = %name, "signal observed");
                    return Ok(name.clone());
                }
            }
        }
    }

    /// Names of all raised signals, sorted.
    pub fn list(&self) -> Result<Vec<SignalName>, SignalError> {
        let mut names: Vec<SignalName> = self
            .markers()?
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Remove every raised signal and return how many markers were removed.
    ///
    /// Meant for the start of a fresh top-level invocation only: a raise that happens
    /// concurrently with the clear may or may not survive it.
    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    pub fn clear_all(&self) -> Result<usize, SignalError> {
        let mut removed = 0;
        for (name, path) in self.markers()? {
            match fs::remove_file(&path) {
                Ok(()) => {
                    trace!(target: "cohort.signal", signal = %name, "signal cleared");
                    removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(SignalError::Clear { path, source }),
            }
        }
        debug!(target: "cohort.signal", removed, "signal directory cleared");
        Ok(removed)
    }

    /// Marker files currently in the directory. A missing directory holds no markers.
    fn markers(&self) -> Result<Vec<(SignalName, PathBuf)>, SignalError> {
        let clear_err = |source: io::Error| SignalError::Clear {
            path: self.root.clone(),
            source,
        };

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(clear_err(e)),
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(clear_err)?;
            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(clear_err(e)),
            };
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|s| SignalName::new(s).ok())
            else {
                trace!(target: "cohort.signal", file = ?entry.file_name(), "skipping foreign file");
                continue;
            };
            out.push((name, entry.path()));
        }
        Ok(out)
    }

    fn ticker(&self) -> time::Interval {
        let mut ticker = time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }
}

/// Persist directory entries created in `dir`.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use cohort_model::{CLUSTER_DONE, ERROR, ONBOARD_DONE, REBOOT};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SignalStore {
        SignalStore::new(
            SignalStoreConfig::default()
                .with_root(dir.path().join("signals"))
                .with_poll_interval(Duration::from_millis(10)),
        )
    }

    #[test]
    fn raise_creates_directory_and_marker() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.root().exists());

        store.raise(&ONBOARD_DONE).unwrap();

        let marker = store.marker_path(&ONBOARD_DONE);
        assert!(marker.is_file());
        assert_eq!(fs::metadata(marker).unwrap().len(), 0);
    }

    #[test]
    fn raise_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.raise(&CLUSTER_DONE).unwrap();
        store.raise(&CLUSTER_DONE).unwrap();

        assert!(store.is_raised(&CLUSTER_DONE).unwrap());
        assert_eq!(store.list().unwrap(), vec![CLUSTER_DONE]);
    }

    #[test]
    fn is_raised_is_false_without_directory() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.is_raised(&REBOOT).unwrap());
    }

    #[test]
    fn clear_all_resets_every_signal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let custom = SignalName::new("SCRIPT_DONE").unwrap();

        for name in [&ONBOARD_DONE, &ERROR, &custom] {
            store.raise(name).unwrap();
        }
        assert_eq!(store.clear_all().unwrap(), 3);

        for name in [&ONBOARD_DONE, &ERROR, &custom] {
            assert!(!store.is_raised(name).unwrap());
        }
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn clear_all_without_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).clear_all().unwrap(), 0);
    }

    #[test]
    fn clear_all_leaves_foreign_entries() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.raise(&ERROR).unwrap();
        fs::create_dir(store.root().join("nested")).unwrap();
        fs::write(store.root().join(".tmp-editor"), b"x").unwrap();

        assert_eq!(store.clear_all().unwrap(), 1);
        assert!(store.root().join("nested").is_dir());
        assert!(store.root().join(".tmp-editor").is_file());
    }

    #[test]
    fn list_is_sorted() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.raise(&REBOOT).unwrap();
        store.raise(&ERROR).unwrap();
        store.raise(&CLUSTER_DONE).unwrap();

        assert_eq!(store.list().unwrap(), vec![CLUSTER_DONE, ERROR, REBOOT]);
    }

    #[test]
    fn raise_surfaces_directory_errors() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();
        let store = SignalStore::open(blocker.join("signals"));

        let err = store.raise(&ONBOARD_DONE).unwrap_err();
        assert!(matches!(err, SignalError::CreateDir { .. }), "got {err:?}");
        assert!(!store.is_raised(&ONBOARD_DONE).unwrap_or(false));
    }

    #[cfg(unix)]
    #[test]
    fn raise_into_read_only_directory_fails() {
        use std::os::unix::fs::PermissionsExt;

        // Permission bits do not bind root; see raise_where_creation_is_denied_fails.
        if unsafe { libc::geteuid() } == 0 {
            eprintln!("skipped: running as root, mode 0555 does not deny writes");
            return;
        }

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir(store.root()).unwrap();
        fs::set_permissions(store.root(), fs::Permissions::from_mode(0o555)).unwrap();

        let err = store.raise(&ONBOARD_DONE).unwrap_err();
        assert!(matches!(err, SignalError::Raise { .. }), "got {err:?}");

        fs::set_permissions(store.root(), fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// procfs refuses file creation to every user, root included.
    #[cfg(target_os = "linux")]
    #[test]
    fn raise_where_creation_is_denied_fails() {
        let root = Path::new("/proc/self");
        if !root.is_dir() {
            eprintln!("skipped: /proc is not mounted");
            return;
        }
        let store = SignalStore::open(root);

        let err = store.raise(&ERROR).unwrap_err();
        match &err {
            SignalError::Raise { name, source, .. } => {
                assert_eq!(name, "ERROR");
                assert!(
                    matches!(
                        source.kind(),
                        io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
                    ) || source.raw_os_error() == Some(libc::EPERM),
                    "got {source:?}"
                );
            }
            other => panic!("expected a raise error, got {other:?}"),
        }
        assert!(!store.is_raised(&ERROR).unwrap());
    }

    #[tokio::test]
    async fn wait_resolves_immediately_when_already_raised() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.raise(&ONBOARD_DONE).unwrap();

        let seen = store
            .wait_timeout(&ONBOARD_DONE, Duration::from_millis(5))
            .await
            .unwrap();
        assert!(seen);
    }

    #[tokio::test]
    async fn wait_sees_raise_right_after_registration() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait(&CLUSTER_DONE).await })
        };
        store.raise(&CLUSTER_DONE).unwrap();

        time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter must not hang")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn one_raise_releases_every_waiter() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let waiters: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.wait(&ONBOARD_DONE).await })
            })
            .collect();

        time::sleep(Duration::from_millis(30)).await;
        assert!(waiters.iter().all(|w| !w.is_finished()));

        store.raise(&ONBOARD_DONE).unwrap();
        for waiter in waiters {
            time::timeout(Duration::from_secs(5), waiter)
                .await
                .expect("waiter must not hang")
                .unwrap()
                .unwrap();
        }
    }

    #[tokio::test]
    async fn wait_creates_directory() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let seen = store
            .wait_timeout(&REBOOT, Duration::from_millis(20))
            .await
            .unwrap();
        assert!(!seen);
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn wait_timeout_reports_not_seen() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let seen = store
            .wait_timeout(&ERROR, Duration::from_millis(30))
            .await
            .unwrap();
        assert!(!seen);
        assert!(!store.is_raised(&ERROR).unwrap());
    }

    #[tokio::test]
    async fn wait_cancellable_stops_on_cancel() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let cancel = CancellationToken::new();

        let waiter = {
            let store = store.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { store.wait_cancellable(&REBOOT, &cancel).await })
        };
        cancel.cancel();

        let seen = waiter.await.unwrap().unwrap();
        assert!(!seen);
    }

    #[tokio::test]
    async fn wait_any_returns_first_raised() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_any(&[ONBOARD_DONE, ERROR]).await })
        };
        time::sleep(Duration::from_millis(20)).await;
        store.raise(&ERROR).unwrap();

        let name = time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter must not hang")
            .unwrap()
            .unwrap();
        assert_eq!(name, ERROR);
    }

    #[tokio::test]
    async fn wait_surfaces_directory_errors() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"").unwrap();
        let store = SignalStore::open(blocker.join("signals"));

        let err = store.wait(&ONBOARD_DONE).await.unwrap_err();
        assert!(matches!(err, SignalError::CreateDir { .. }));
    }
}
