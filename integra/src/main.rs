mod cli;
mod commands;

use clap::Parser;
use integra::settings::Settings;
use integra::{init_telemetry, AuthContext};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::new()?;
    init_telemetry::init_telemetry_and_tracing(settings.debug)?;

    match &cli.command {
        Commands::Config => {
            println!("{:#?}", &settings);
            return Ok(());
        }
        Commands::Permissions(cmd) => return commands::permissions::print_permissions(cmd),
        _ => {}
    }

    let ctx = AuthContext::new(settings)?;
    match &cli.command {
        Commands::Login(cmd) => commands::session::login(&ctx, cmd).await,
        Commands::Logout => commands::session::logout(&ctx).await,
        Commands::Whoami => commands::session::whoami(&ctx).await,
        Commands::Access(cmd) => commands::session::access(&ctx, cmd).await,
        Commands::Watch(cmd) => commands::session::watch(&ctx, cmd).await,
        Commands::Config | Commands::Permissions(_) => Ok(()),
    }
}
