use chrono::{NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::utils::output_goals;
use crate::cli::OutputFormat;
use crate::database::models::{Sex, User};
use crate::goals::compute_default_goals;

#[derive(Debug, Args)]
pub struct GoalsArgs {
    #[arg(long, help = "Sex: M or F")]
    pub sex: Sex,
    #[arg(long, help = "Weight in kg")]
    pub weight: Option<Decimal>,
    #[arg(long, help = "Height in cm")]
    pub height: Option<Decimal>,
    #[arg(long, help = "Date of birth (YYYY-MM-DD)")]
    pub born: Option<NaiveDate>,
}

impl GoalsArgs {
    fn to_user(&self) -> User {
        User {
            id: Uuid::nil(),
            sex: self.sex,
            weight: self.weight,
            height: self.height,
            date_of_birth: self.born,
        }
    }
}

pub fn handle(args: GoalsArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let goals = compute_default_goals(&args.to_user(), Utc::now().date_naive());
    output_goals(&output_format, &title(&args), &goals)
}

fn title(args: &GoalsArgs) -> String {
    if args.weight.is_some() && args.height.is_some() && args.born.is_some() {
        format!("Default goals (sex {})", args.sex)
    } else {
        format!("Default goals (sex {}, fallback for incomplete profile)", args.sex)
    }
}
