use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::str::FromStr;
use uuid::Uuid;

/// Biological sex as stored on the user profile ("M" / "F").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" | "male" => Ok(Sex::Male),
            "F" | "f" | "female" => Ok(Sex::Female),
            other => Err(format!("unknown sex '{}', expected M or F", other)),
        }
    }
}

/// The slice of the user profile the goal calculator needs.
///
/// Owned by the authentication side of the system; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub sex: Sex,
    /// Kilograms
    pub weight: Option<Decimal>,
    /// Centimetres
    pub height: Option<Decimal>,
    pub date_of_birth: Option<NaiveDate>,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let sex: String = row.try_get("sex")?;
        let sex = Sex::from_str(&sex).map_err(|e| sqlx::Error::ColumnDecode {
            index: "sex".to_string(),
            source: e.into(),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            sex,
            weight: row.try_get("weight")?,
            height: row.try_get("height")?,
            date_of_birth: row.try_get("date_of_birth")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sex_codes() {
        assert_eq!("M".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert!("X".parse::<Sex>().is_err());
    }

    #[test]
    fn sex_serializes_as_code() {
        assert_eq!(serde_json::to_value(Sex::Female).unwrap(), "F");
        assert_eq!(Sex::Male.as_str(), "M");
    }

    #[test]
    fn sex_display_parses_back() {
        for sex in [Sex::Male, Sex::Female] {
            assert_eq!(Sex::from_str(&sex.to_string()), Ok(sex));
        }
        assert_eq!(format!("{}", Sex::Female), "F");
    }
}
