//! Production collaborators. Everything here shells out: `rsync` for tree
//! sync, the mysql tooling for dump/restore, and the application's own CLI
//! for maintenance mode and status queries.

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use zeroize::Zeroizing;

use crate::collab::{AppService, DatabaseAdmin, TreeSync};
use crate::logger;
use crate::sanitize::sanitize_for_display;
use crate::settings::Settings;

/// The status tool prints this on stderr while the application is
/// suspended. Noise during a migration run, not a diagnostic.
const MAINTENANCE_NOTICE: &str = "maintenance mode is enabled";

/// Every component mutates root-owned trees or system services.
pub fn require_root() -> Result<()> {
    let output = Command::new("id")
        .arg("-u")
        .output()
        .context("Failed to determine current user")?;
    let uid: u32 = String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .context("Unexpected output from id -u")?;
    if uid != 0 {
        return Err(anyhow!("This utility needs to run as root"));
    }
    Ok(())
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    sanitize_for_display(stderr.trim())
}

fn run_checked(command: &mut Command, what: &str) -> Result<Output> {
    logger::debug(&format!("running {command:?}"));
    let output = command
        .output()
        .with_context(|| format!("Failed to run {what}"))?;
    if !output.status.success() {
        return Err(anyhow!("{what} failed: {}", stderr_of(&output)));
    }
    Ok(output)
}

pub struct RsyncTreeSync {
    rsync: String,
}

impl RsyncTreeSync {
    pub fn new(settings: &Settings) -> Self {
        Self {
            rsync: settings.commands.rsync.clone(),
        }
    }
}

impl TreeSync for RsyncTreeSync {
    fn sync(&self, src: &Path, dst: &Path) -> Result<()> {
        fs::create_dir_all(dst).with_context(|| format!("Failed to create {}", dst.display()))?;
        // trailing slash: sync the contents of src into dst
        run_checked(
            Command::new(&self.rsync)
                .arg("-a")
                .arg(format!("{}/", src.display()))
                .arg(dst),
            "rsync",
        )?;
        Ok(())
    }
}

pub struct MysqlAdmin<'a> {
    settings: &'a Settings,
}

impl<'a> MysqlAdmin<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    fn base(&self, program: &str) -> Command {
        let mut command = Command::new(program);
        if let Some(socket) = &self.settings.database.socket {
            command.arg(format!("--socket={}", socket.display()));
        }
        command
    }
}

impl DatabaseAdmin for MysqlAdmin<'_> {
    fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let ping = self
                .base(&self.settings.commands.mysqladmin)
                .arg("ping")
                .stderr(Stdio::null())
                .output();
            if let Ok(output) = ping {
                if output.status.success() {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(anyhow!(
                    "Database did not become reachable within {} seconds",
                    timeout.as_secs()
                ));
            }
            thread::sleep(Duration::from_millis(500));
        }
    }

    fn dump(&self, to_file: &Path) -> Result<()> {
        let file = fs::File::create(to_file)
            .with_context(|| format!("Failed to create {}", to_file.display()))?;
        let mut command = self.base(&self.settings.commands.mysqldump);
        command
            .arg("--lock-tables")
            .arg(&self.settings.database.name)
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped());
        logger::debug(&format!("running {command:?}"));
        let child = command.spawn().context("Failed to run mysqldump")?;
        let output = child.wait_with_output().context("Failed to run mysqldump")?;
        if !output.status.success() {
            return Err(anyhow!("mysqldump failed: {}", stderr_of(&output)));
        }
        Ok(())
    }

    fn restore(&self, from_file: &Path) -> Result<()> {
        let db = &self.settings.database;
        let statements = format!(
            "DROP DATABASE IF EXISTS {0}; CREATE DATABASE {0}; \
             GRANT ALL PRIVILEGES ON {0}.* TO '{1}'@'localhost';",
            db.name, db.user
        );
        run_checked(
            self.base(&self.settings.commands.mysql)
                .arg("-e")
                .arg(&statements),
            "database recreation",
        )?;

        let file = fs::File::open(from_file)
            .with_context(|| format!("Failed to open {}", from_file.display()))?;
        let mut command = self.base(&self.settings.commands.mysql);
        command
            .arg(&db.name)
            .stdin(Stdio::from(file))
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        logger::debug(&format!("running {command:?}"));
        let child = command.spawn().context("Failed to run mysql")?;
        let output = child.wait_with_output().context("Failed to run mysql")?;
        if !output.status.success() {
            return Err(anyhow!("Loading the dump failed: {}", stderr_of(&output)));
        }
        Ok(())
    }

    fn derive_password(&self) -> Result<Zeroizing<String>> {
        let path = &self.settings.database.password_file;
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read database credential from {}", path.display()))?;
        let password = raw.trim();
        if password.is_empty() {
            return Err(anyhow!("Database credential file {} is empty", path.display()));
        }
        Ok(Zeroizing::new(password.to_string()))
    }
}

pub struct CliAppService<'a> {
    settings: &'a Settings,
}

impl<'a> CliAppService<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let cli = &self.settings.commands.app_cli;
        let mut command = Command::new(cli);
        command.args(args);
        logger::debug(&format!("running {command:?}"));
        let output = command
            .output()
            .with_context(|| format!("Failed to run {cli}"))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            let line = line.trim();
            if line.is_empty() || line.contains(MAINTENANCE_NOTICE) {
                continue;
            }
            logger::warn(line);
        }
        if !output.status.success() {
            return Err(anyhow!(
                "{} {} failed: {}",
                cli,
                args.first().unwrap_or(&""),
                sanitize_for_display(stderr.trim())
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl AppService for CliAppService<'_> {
    fn set_maintenance(&self, on: bool) -> Result<()> {
        let flag = if on { "--on" } else { "--off" };
        self.run(&["maintenance:mode", flag])?;
        Ok(())
    }

    fn encryption_enabled(&self) -> Result<bool> {
        let stdout = self.run(&["encryption:status"])?;
        Ok(stdout.lines().any(|line| {
            line.trim()
                .strip_prefix("enabled:")
                .map(|value| value.trim() == "true")
                .unwrap_or(false)
        }))
    }

    fn list_users(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["user:list"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
