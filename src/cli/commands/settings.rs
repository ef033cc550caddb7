use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use crate::cli::config::api_client;
use crate::cli::utils::{output_error, output_goals};
use crate::cli::OutputFormat;
use crate::database::models::DietarySettingsPatch;

#[derive(Subcommand)]
pub enum SettingsCommands {
    #[command(about = "Show current goals, creating defaults on first use")]
    Show,

    #[command(about = "Update one or more goals")]
    Set(SetArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[arg(long, help = "Daily water goal in ml")]
    pub water_goal: Option<i32>,
    #[arg(long, help = "Daily calorie goal in kcal")]
    pub calorie_goal: Option<Decimal>,
    #[arg(long, help = "Daily fat goal in kcal")]
    pub fat_goal: Option<Decimal>,
    #[arg(long, help = "Daily protein goal in kcal")]
    pub protein_goal: Option<Decimal>,
    #[arg(long, help = "Daily carbs goal in kcal")]
    pub carbs_goal: Option<Decimal>,
}

impl SetArgs {
    pub fn into_patch(self) -> DietarySettingsPatch {
        DietarySettingsPatch {
            water_goal: self.water_goal,
            calorie_goal: self.calorie_goal,
            fat_goal: self.fat_goal,
            protein_goal: self.protein_goal,
            carbs_goal: self.carbs_goal,
        }
    }
}

pub async fn handle(cmd: SettingsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = api_client()?;

    let result = match cmd {
        SettingsCommands::Show => match client.dietary_settings().await {
            Ok(settings) => output_goals(&output_format, "Dietary settings", &settings),
            Err(e) => Err(e.into()),
        },
        SettingsCommands::Set(args) => {
            let patch = args.into_patch();
            if patch.is_empty() {
                tracing::info!("No goals given, the server will return the current settings");
            }
            match client.update_dietary_settings(&patch).await {
                Ok(rows) => match rows.first() {
                    Some(settings) => output_goals(&output_format, "Updated dietary settings", settings),
                    None => Err(anyhow::anyhow!("server returned no settings")),
                },
                Err(e) => Err(e.into()),
            }
        }
    };

    // Text mode errors are printed once by the binary
    if let (Err(e), OutputFormat::Json) = (&result, &output_format) {
        output_error(&output_format, &e.to_string(), None)?;
    }
    result
}
