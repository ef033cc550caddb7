pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "nutrical")]
#[command(about = "Nutrical CLI - manage dietary goals from the command line")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Store a session token for later requests")]
    Login {
        #[arg(help = "Bearer token issued by the Nutrical API")]
        token: String,
    },

    #[command(about = "Forget the stored session token")]
    Logout,

    #[command(about = "Daily water and macronutrient goals")]
    Settings {
        #[command(subcommand)]
        cmd: commands::settings::SettingsCommands,
    },

    #[command(about = "Compute default goals locally from biometrics")]
    Goals(commands::goals::GoalsArgs),

    #[command(about = "Check server health from the /health endpoint")]
    Health,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Login { token } => commands::auth::login(&token, output_format),
        Commands::Logout => commands::auth::logout(output_format),
        Commands::Settings { cmd } => commands::settings::handle(cmd, output_format).await,
        Commands::Goals(args) => commands::goals::handle(args, output_format),
        Commands::Health => commands::health::handle(output_format).await,
    }
}
