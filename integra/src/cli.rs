use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "integra")]
#[command(about = "Session and access control for the integration registry")]
#[clap(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show current configuration and exit
    Config,
    /// Sign in and store the credential
    Login(LoginCommand),
    /// Forget the stored credential
    Logout,
    /// Re-validate the stored credential and show the signed in user
    Whoami,
    /// Show whether the current session may open a page
    Access(AccessCommand),
    /// Print the role permission matrix
    Permissions(PermissionsCommand),
    /// Keep the session checked and log route decisions until Ctrl-C
    Watch(WatchCommand),
}

#[derive(Debug, Parser)]
pub struct LoginCommand {
    #[arg(long)]
    pub email: String,
    /// Password, preferably passed via the environment
    #[arg(long, env = "INTEGRA_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Parser)]
pub struct AccessCommand {
    /// Page path, e.g. /integrations/INT-4/edit
    pub path: String,
}

#[derive(Debug, Parser)]
pub struct PermissionsCommand {
    /// Only show this role (admin, operator, viewer)
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Debug, Parser)]
pub struct WatchCommand {
    /// Page the simulated router starts on
    #[arg(long, default_value = "/dashboard")]
    pub path: String,
}
