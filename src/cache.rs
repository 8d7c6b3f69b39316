//! Thumbnail cache rebuild.
//!
//! Explorer keeps rendered thumbnails in `thumbcache_*.db` under its local
//! app data and only re-renders on a miss, so a newly enabled handler may
//! never be asked for anything until those files go away. The rebuild stops
//! Explorer, purges the cache files, and starts it again.

use crate::Error;

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheReport {
    /// Cache database files actually deleted.
    pub removed: usize,
}

#[cfg(windows)]
pub fn rebuild_thumbnail_cache() -> Result<CacheReport, Error> {
    use std::process::Command;

    log::info!("stopping explorer.exe");
    let stop = Command::new("taskkill")
        .args(["/f", "/im", "explorer.exe"])
        .status()
        .map_err(|err| Error::Launch {
            tool: "taskkill",
            message: err.to_string(),
        })?;
    if !stop.success() {
        // Explorer may simply not be running; the purge still makes sense.
        log::warn!("taskkill exited with {:?}, continuing", stop.code());
    }

    let removed = purge_cache_files();

    log::info!("restarting explorer.exe");
    Command::new("explorer.exe")
        .spawn()
        .map_err(|err| Error::Launch {
            tool: "explorer",
            message: err.to_string(),
        })?;

    Ok(CacheReport { removed })
}

#[cfg(not(windows))]
pub fn rebuild_thumbnail_cache() -> Result<CacheReport, Error> {
    Err(Error::Unsupported)
}

/// Deletes `thumbcache_*.db` under Explorer's cache directory. Locked or
/// missing files are skipped; the count only covers actual deletions.
#[cfg(windows)]
fn purge_cache_files() -> usize {
    use std::fs;
    use std::path::PathBuf;

    let local = match std::env::var_os("LOCALAPPDATA") {
        Some(dir) => dir,
        None => {
            log::warn!("LOCALAPPDATA is not set, skipping cache purge");
            return 0;
        }
    };
    let dir = PathBuf::from(local)
        .join("Microsoft")
        .join("Windows")
        .join("Explorer");
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::warn!("cannot read {}: {}", dir.display(), err);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("thumbcache_") || !name.ends_with(".db") {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                log::debug!("removed {}", entry.path().display());
                removed += 1;
            }
            Err(err) => log::warn!("could not remove {}: {}", entry.path().display(), err),
        }
    }
    removed
}
