use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logger;

/// Version stamp written into every backup set. Bump when the on-disk
/// layout changes shape.
pub const FORMAT_VERSION: u32 = 1;

const FORMAT_STAMP: &str = "format";

/// A backup set is a directory the export and import sides agree on
/// byte-for-byte: a `format` stamp plus one subpath per component.
#[derive(Debug)]
pub struct BackupSet {
    root: PathBuf,
}

impl BackupSet {
    /// Allocate a fresh timestamped set under `backup_root`. The format
    /// stamp lands before any component data so a partially written set is
    /// still distinguishable from a missing one.
    pub fn create(backup_root: &Path) -> Result<Self> {
        fs::create_dir_all(backup_root)
            .with_context(|| format!("Failed to create {}", backup_root.display()))?;
        let root = backup_root.join(Utc::now().format("%Y%m%d-%H%M%S").to_string());
        fs::create_dir(&root)
            .with_context(|| format!("Failed to create backup directory {}", root.display()))?;
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&root, Permissions::from_mode(0o770))?;
        }
        fs::write(root.join(FORMAT_STAMP), format!("{FORMAT_VERSION}\n"))
            .context("Failed to write format stamp")?;
        Ok(Self { root })
    }

    /// Open an existing set for import. A stamp newer than we understand is
    /// an error; a missing stamp is tolerated as a pre-versioning backup.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(anyhow!("{} is not a backup directory", path.display()));
        }
        let stamp = path.join(FORMAT_STAMP);
        if stamp.exists() {
            let raw = fs::read_to_string(&stamp).context("Failed to read format stamp")?;
            let version: u32 = raw
                .trim()
                .parse()
                .map_err(|_| anyhow!("Unreadable format stamp {:?}", raw.trim()))?;
            if version > FORMAT_VERSION {
                return Err(anyhow!(
                    "Backup format {} is newer than supported format {}",
                    version,
                    FORMAT_VERSION
                ));
            }
        } else {
            logger::warn("Backup has no format stamp, assuming a pre-versioning backup");
        }
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.root.join("apps")
    }

    pub fn database_dump(&self) -> PathBuf {
        self.root.join("database.sql")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.php")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// Mirrors the encryption sublayout of the data dir: system-wide
    /// material at `keys/<enc>/`, each user's at `keys/<user>/<enc>/`.
    pub fn keys_dir(&self) -> PathBuf {
        self.root.join("keys")
    }

    pub fn certs_dir(&self) -> PathBuf {
        self.root.join("certs")
    }
}
