use serde::Serialize;
use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print a labelled goal table, or the raw value as JSON.
pub fn output_goals<T: Serialize>(
    output_format: &OutputFormat,
    title: &str,
    goals: &T,
) -> anyhow::Result<()> {
    let value = serde_json::to_value(goals)?;
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{}", title);
            for (label, key, unit) in GOAL_ROWS {
                if let Some(v) = value.get(key) {
                    let v = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                    println!("  {:<10} {:>10} {}", label, v, unit);
                }
            }
        }
    }
    Ok(())
}

const GOAL_ROWS: [(&str, &str, &str); 5] = [
    ("Water", "waterGoal", "ml"),
    ("Calories", "calorieGoal", "kcal"),
    ("Fat", "fatGoal", "kcal"),
    ("Protein", "proteinGoal", "kcal"),
    ("Carbs", "carbsGoal", "kcal"),
];
