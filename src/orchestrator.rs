use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::collab::{AppService, DatabaseAdmin, TreeSync};
use crate::layout::BackupSet;
use crate::lock::MaintenanceGuard;
use crate::logger;
use crate::selection::{Component, ComponentSelection, PROCESS_ORDER};
use crate::settings::Settings;

/// How a component handler finished. Fatal failures are `Err` from the
/// handler and abort the run; everything here lets it continue.
pub(crate) enum Outcome {
    Done,
    /// Optional feature inactive or its subpath absent. Informational.
    Skipped(String),
    /// The component failed but must not abort the migration.
    Warned(String),
}

#[derive(Clone, Copy)]
pub(crate) enum Direction {
    Export,
    Import,
}

impl Direction {
    fn gerund(self) -> &'static str {
        match self {
            Direction::Export => "Exporting",
            Direction::Import => "Importing",
        }
    }

    fn infinitive(self) -> &'static str {
        match self {
            Direction::Export => "export",
            Direction::Import => "import",
        }
    }
}

/// Drives one migration run: wait for the database, create or open the
/// backup set, hold the maintenance lock across the fixed component order,
/// stop at the first fatal failure.
pub struct Migrator<'a> {
    pub(crate) settings: &'a Settings,
    pub(crate) sync: &'a dyn TreeSync,
    pub(crate) db: &'a dyn DatabaseAdmin,
    pub(crate) app: &'a dyn AppService,
}

impl<'a> Migrator<'a> {
    pub fn new(
        settings: &'a Settings,
        sync: &'a dyn TreeSync,
        db: &'a dyn DatabaseAdmin,
        app: &'a dyn AppService,
    ) -> Self {
        Self {
            settings,
            sync,
            db,
            app,
        }
    }

    /// Returns the freshly written backup directory.
    pub fn export(&self, selection: &ComponentSelection) -> Result<PathBuf> {
        self.wait_for_database()?;
        let set = BackupSet::create(&self.settings.backup_root)?;
        {
            let _guard = MaintenanceGuard::acquire(self.app)?;
            self.run_components(&set, selection, Direction::Export)?;
        }
        Ok(set.root().to_path_buf())
    }

    pub fn import(&self, selection: &ComponentSelection, backup_dir: &Path) -> Result<()> {
        self.wait_for_database()?;
        let set = BackupSet::open(backup_dir)?;
        let _guard = MaintenanceGuard::acquire(self.app)?;
        self.run_components(&set, selection, Direction::Import)
    }

    fn wait_for_database(&self) -> Result<()> {
        let timeout = Duration::from_secs(self.settings.database.ready_timeout_secs);
        self.db
            .wait_ready(timeout)
            .context("Database is not reachable")
    }

    fn run_components(
        &self,
        set: &BackupSet,
        selection: &ComponentSelection,
        direction: Direction,
    ) -> Result<()> {
        for component in PROCESS_ORDER {
            if !selection.contains(component) {
                continue;
            }
            println!("{} {}...", direction.gerund(), component.label());
            let outcome = self
                .run_component(set, component, direction)
                .with_context(|| {
                    format!("Failed to {} {}", direction.infinitive(), component.label())
                })?;
            match outcome {
                Outcome::Done => {}
                Outcome::Skipped(reason) => println!("{reason} -- skipping"),
                Outcome::Warned(detail) => logger::warn(&detail),
            }
        }
        Ok(())
    }

    fn run_component(
        &self,
        set: &BackupSet,
        component: Component,
        direction: Direction,
    ) -> Result<Outcome> {
        match (direction, component) {
            (Direction::Export, Component::Apps) => self.export_apps(set),
            (Direction::Export, Component::Database) => self.export_database(set),
            (Direction::Export, Component::Config) => self.export_config(set),
            (Direction::Export, Component::Keys) => self.export_keys(set),
            (Direction::Export, Component::Certs) => self.export_certs(set),
            (Direction::Export, Component::Data) => self.export_data(set),
            (Direction::Import, Component::Apps) => self.import_apps(set),
            (Direction::Import, Component::Database) => self.import_database(set),
            (Direction::Import, Component::Config) => self.import_config(set),
            (Direction::Import, Component::Keys) => self.import_keys(set),
            (Direction::Import, Component::Certs) => self.import_certs(set),
            (Direction::Import, Component::Data) => self.import_data(set),
        }
    }
}
