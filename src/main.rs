use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;

use stevedore::cli::{Cli, Commands};
use stevedore::logger;
use stevedore::orchestrator::Migrator;
use stevedore::selection::ComponentSelection;
use stevedore::settings::Settings;
use stevedore::system::{self, CliAppService, MysqlAdmin, RsyncTreeSync};

fn main() {
    // help exits 0; any usage error exits 1 before side effects
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logger::set_debug(cli.debug);
    system::require_root()?;
    let settings = Settings::load(cli.settings.as_deref())?;

    let sync = RsyncTreeSync::new(&settings);
    let db = MysqlAdmin::new(&settings);
    let app = CliAppService::new(&settings);
    let migrator = Migrator::new(&settings, &sync, &db, &app);

    match cli.command {
        Commands::Export(args) => {
            let selection = ComponentSelection::from_flags(&args.components);
            let backup = migrator.export(&selection)?;
            println!("Export complete: {}", backup.display());
        }
        Commands::Import(args) => {
            let selection = ComponentSelection::from_flags(&args.components);
            migrator.import(&selection, &args.backup_dir)?;
        }
    }
    Ok(())
}
