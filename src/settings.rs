use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_FILE: &str = "/etc/stevedore/settings.json";

/// Where the live deployment keeps its state and which external commands
/// operate on it. Absent file or unreadable fields fall back to defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    pub apps_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub certs_dir: PathBuf,
    pub backup_root: PathBuf,
    /// Name of the key-material subdirectory inside the data dir, both
    /// system-wide (`<data>/<name>`) and per user (`<data>/<user>/<name>`).
    pub encryption_dir: String,
    pub database: DatabaseSettings,
    pub commands: CommandSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseSettings {
    pub name: String,
    pub user: String,
    pub socket: Option<PathBuf>,
    /// The deployment's own database credential file; import derives the
    /// target host's credential from here, never from the backup.
    pub password_file: PathBuf,
    pub ready_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CommandSettings {
    pub rsync: String,
    pub mysqldump: String,
    pub mysql: String,
    pub mysqladmin: String,
    /// The application's own admin CLI (maintenance mode, status, users).
    pub app_cli: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            apps_dir: PathBuf::from("/var/lib/hub/apps"),
            data_dir: PathBuf::from("/var/lib/hub/data"),
            config_file: PathBuf::from("/var/lib/hub/config/config.php"),
            certs_dir: PathBuf::from("/var/lib/hub/certs"),
            backup_root: PathBuf::from("/var/lib/hub/backups"),
            encryption_dir: "encryption".to_string(),
            database: DatabaseSettings::default(),
            commands: CommandSettings::default(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            name: "hub".to_string(),
            user: "hub".to_string(),
            socket: None,
            password_file: PathBuf::from("/var/lib/hub/private/db-password"),
            ready_timeout_secs: 60,
        }
    }
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            rsync: "rsync".to_string(),
            mysqldump: "mysqldump".to_string(),
            mysql: "mysql".to_string(),
            mysqladmin: "mysqladmin".to_string(),
            app_cli: "hubctl".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_SETTINGS_FILE));
        if !path.exists() {
            return Ok(Settings::default());
        }
        let data = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&data).unwrap_or_default();
        Ok(settings)
    }
}
