use crate::cli::ComponentFlags;

/// One independently migratable unit of deployment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Apps,
    Database,
    Config,
    Keys,
    Certs,
    Data,
}

/// Components run in this order in both directions. Config follows database
/// so credential derivation sees the freshly recreated account; data goes
/// last because nothing after it depends on it and it dominates run time.
pub const PROCESS_ORDER: [Component; 6] = [
    Component::Apps,
    Component::Database,
    Component::Config,
    Component::Keys,
    Component::Certs,
    Component::Data,
];

impl Component {
    pub fn label(self) -> &'static str {
        match self {
            Component::Apps => "apps",
            Component::Database => "database",
            Component::Config => "config",
            Component::Keys => "encryption keys",
            Component::Certs => "certificates",
            Component::Data => "data",
        }
    }
}

/// The set of components to process, resolved once per run and immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct ComponentSelection {
    apps: bool,
    database: bool,
    config: bool,
    keys: bool,
    certs: bool,
    data: bool,
}

impl ComponentSelection {
    /// Zero component flags means everything. The default is keyed on the
    /// flags alone, never on how many positional arguments were present.
    pub fn from_flags(flags: &ComponentFlags) -> Self {
        let any = flags.apps
            || flags.database
            || flags.config
            || flags.data
            || flags.keys
            || flags.certs;
        if !any {
            return Self::all();
        }
        Self {
            apps: flags.apps,
            database: flags.database,
            config: flags.config,
            keys: flags.keys,
            certs: flags.certs,
            data: flags.data,
        }
    }

    pub fn all() -> Self {
        Self {
            apps: true,
            database: true,
            config: true,
            keys: true,
            certs: true,
            data: true,
        }
    }

    pub fn contains(&self, component: Component) -> bool {
        match component {
            Component::Apps => self.apps,
            Component::Database => self.database,
            Component::Config => self.config,
            Component::Keys => self.keys,
            Component::Certs => self.certs,
            Component::Data => self.data,
        }
    }
}
