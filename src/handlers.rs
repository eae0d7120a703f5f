//! The six component handlers, one symmetric export/import pair each.
//! All of them operate on a `(BackupSet, live deployment)` pair; failure
//! classification follows the policy table: keys warn, everything else is
//! fatal.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::layout::BackupSet;
use crate::orchestrator::{Migrator, Outcome};

/// Placeholder written into the exported config in place of the live
/// database credential. Import swaps it for the target host's own.
pub const DB_PASSWORD_SENTINEL: &str = "__DBPASSWORD__";

static DB_PASSWORD_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'dbpassword'\s*=>\s*'[^']*'").unwrap());

/// Exported configs never carry a live credential.
pub fn mask_db_password(config: &str) -> String {
    let replacement = format!("'dbpassword' => '{DB_PASSWORD_SENTINEL}'");
    DB_PASSWORD_FIELD
        .replace_all(config, replacement.as_str())
        .to_string()
}

impl Migrator<'_> {
    pub(crate) fn export_apps(&self, set: &BackupSet) -> Result<Outcome> {
        self.sync.sync(&self.settings.apps_dir, &set.apps_dir())?;
        Ok(Outcome::Done)
    }

    pub(crate) fn import_apps(&self, set: &BackupSet) -> Result<Outcome> {
        clear_dir(&self.settings.apps_dir)?;
        self.sync.sync(&set.apps_dir(), &self.settings.apps_dir)?;
        Ok(Outcome::Done)
    }

    pub(crate) fn export_database(&self, set: &BackupSet) -> Result<Outcome> {
        self.db.dump(&set.database_dump())?;
        Ok(Outcome::Done)
    }

    pub(crate) fn import_database(&self, set: &BackupSet) -> Result<Outcome> {
        self.db.restore(&set.database_dump())?;
        Ok(Outcome::Done)
    }

    pub(crate) fn export_config(&self, set: &BackupSet) -> Result<Outcome> {
        let config = fs::read_to_string(&self.settings.config_file)
            .with_context(|| format!("Failed to read {}", self.settings.config_file.display()))?;
        fs::write(set.config_file(), mask_db_password(&config))
            .with_context(|| format!("Failed to write {}", set.config_file().display()))?;
        Ok(Outcome::Done)
    }

    pub(crate) fn import_config(&self, set: &BackupSet) -> Result<Outcome> {
        let config = fs::read_to_string(set.config_file())
            .with_context(|| format!("Failed to read {}", set.config_file().display()))?;
        let config = if config.contains(DB_PASSWORD_SENTINEL) {
            let password = self.db.derive_password()?;
            config.replace(DB_PASSWORD_SENTINEL, &password)
        } else {
            config
        };
        let target = &self.settings.config_file;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, config).with_context(|| format!("Failed to write {}", target.display()))?;
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            // the live config holds the real credential again
            fs::set_permissions(target, Permissions::from_mode(0o640))?;
        }
        Ok(Outcome::Done)
    }

    pub(crate) fn export_keys(&self, set: &BackupSet) -> Result<Outcome> {
        let enabled = match self.app.encryption_enabled() {
            Ok(enabled) => enabled,
            Err(err) => {
                return Ok(Outcome::Warned(format!(
                    "Could not query encryption status: {err:#}"
                )));
            }
        };
        if !enabled {
            return Ok(Outcome::Skipped("Encryption is not enabled".to_string()));
        }
        match self.copy_keys_to_backup(set) {
            Ok(()) => Ok(Outcome::Done),
            Err(err) => Ok(Outcome::Warned(format!(
                "Failed to export encryption keys: {err:#}"
            ))),
        }
    }

    fn copy_keys_to_backup(&self, set: &BackupSet) -> Result<()> {
        let enc = &self.settings.encryption_dir;
        let data_dir = &self.settings.data_dir;
        let keys_dir = set.keys_dir();

        let system = data_dir.join(enc);
        if system.is_dir() {
            self.sync.sync(&system, &keys_dir.join(enc))?;
        }
        for user in self.app.list_users()? {
            let user_keys = data_dir.join(&user).join(enc);
            if user_keys.is_dir() {
                self.sync.sync(&user_keys, &keys_dir.join(&user).join(enc))?;
            }
        }
        Ok(())
    }

    pub(crate) fn import_keys(&self, set: &BackupSet) -> Result<Outcome> {
        if !set.keys_dir().is_dir() {
            return Ok(Outcome::Skipped(
                "Backup contains no encryption keys".to_string(),
            ));
        }
        match self.restore_keys_from_backup(set) {
            Ok(()) => Ok(Outcome::Done),
            Err(err) => Ok(Outcome::Warned(format!(
                "Failed to import encryption keys: {err:#}"
            ))),
        }
    }

    fn restore_keys_from_backup(&self, set: &BackupSet) -> Result<()> {
        let enc = &self.settings.encryption_dir;
        let data_dir = &self.settings.data_dir;

        remove_tree_if_present(&data_dir.join(enc))?;
        for user in self.app.list_users()? {
            remove_tree_if_present(&data_dir.join(&user).join(enc))?;
        }
        // keys/ mirrors the encryption sublayout, one merge puts it back
        self.sync.sync(&set.keys_dir(), data_dir)
    }

    pub(crate) fn export_certs(&self, set: &BackupSet) -> Result<Outcome> {
        if !self.settings.certs_dir.is_dir() {
            return Ok(Outcome::Skipped(
                "No certificates directory present".to_string(),
            ));
        }
        self.sync.sync(&self.settings.certs_dir, &set.certs_dir())?;
        Ok(Outcome::Done)
    }

    pub(crate) fn import_certs(&self, set: &BackupSet) -> Result<Outcome> {
        if !set.certs_dir().is_dir() {
            return Ok(Outcome::Skipped(
                "Backup contains no certificates".to_string(),
            ));
        }
        clear_dir(&self.settings.certs_dir)?;
        self.sync.sync(&set.certs_dir(), &self.settings.certs_dir)?;
        Ok(Outcome::Done)
    }

    pub(crate) fn export_data(&self, set: &BackupSet) -> Result<Outcome> {
        self.sync.sync(&self.settings.data_dir, &set.data_dir())?;
        Ok(Outcome::Done)
    }

    pub(crate) fn import_data(&self, set: &BackupSet) -> Result<Outcome> {
        clear_dir(&self.settings.data_dir)?;
        self.sync.sync(&set.data_dir(), &self.settings.data_dir)?;
        Ok(Outcome::Done)
    }
}

/// Empty a live directory before syncing replacement content into it. The
/// directory itself survives so its ownership and mode are preserved.
fn clear_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn remove_tree_if_present(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CONFIG: &str = r#"<?php
$CONFIG = array (
  'instanceid' => 'oc8xyz',
  'dbtype' => 'mysql',
  'dbpassword' => 'live-secret',
  'datadirectory' => '/var/lib/hub/data',
);
"#;

    #[test]
    fn test_mask_replaces_credential_with_sentinel() {
        let masked = mask_db_password(CONFIG);
        assert!(!masked.contains("live-secret"));
        assert!(masked.contains("'dbpassword' => '__DBPASSWORD__'"));
        // everything else untouched
        assert!(masked.contains("'instanceid' => 'oc8xyz'"));
    }

    #[test]
    fn test_mask_handles_loose_spacing() {
        let masked = mask_db_password("'dbpassword'   =>  'p w'");
        assert_eq!(masked, "'dbpassword' => '__DBPASSWORD__'");
    }

    #[test]
    fn test_mask_without_credential_field_is_identity() {
        let config = "'dbtype' => 'sqlite3'";
        assert_eq!(mask_db_password(config), config);
    }

    #[test]
    fn test_clear_dir_keeps_the_directory_itself() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("live");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.txt"), "a").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/b.txt"), "b").unwrap();

        clear_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_clear_dir_creates_missing_directory() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("absent");
        clear_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
