//! Default nutrition goals derived from a user's biometrics.
//!
//! Calories follow the Mifflin-St Jeor BMR estimate. Users without a full
//! profile (weight, height and date of birth) get fixed fallbacks by sex.
//! Macros are always split 20% fat, 20% protein, 60% carbs.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::models::{Sex, User};

pub const DEFAULT_WATER_GOAL_ML: i32 = 2000;
pub const FALLBACK_CALORIES_MALE: i64 = 2000;
pub const FALLBACK_CALORIES_FEMALE: i64 = 1600;

/// Goals used to seed a user's dietary settings row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultGoals {
    pub water_goal: i32,
    pub calorie_goal: Decimal,
    pub fat_goal: Decimal,
    pub protein_goal: Decimal,
    pub carbs_goal: Decimal,
}

impl DefaultGoals {
    fn from_calories(calories: Decimal) -> Self {
        let fat = Decimal::new(2, 1);
        let protein = Decimal::new(2, 1);
        let carbs = Decimal::new(6, 1);

        Self {
            water_goal: DEFAULT_WATER_GOAL_ML,
            calorie_goal: calories.normalize(),
            fat_goal: (calories * fat).normalize(),
            protein_goal: (calories * protein).normalize(),
            carbs_goal: (calories * carbs).normalize(),
        }
    }
}

/// Compute default goals for `user` as of `today`.
pub fn compute_default_goals(user: &User, today: NaiveDate) -> DefaultGoals {
    match (user.weight, user.height, user.date_of_birth) {
        (Some(weight), Some(height), Some(born)) => {
            let age = age_in_years(born, today);
            DefaultGoals::from_calories(mifflin_st_jeor(user.sex, weight, height, age))
        }
        _ => {
            let calories = match user.sex {
                Sex::Male => FALLBACK_CALORIES_MALE,
                Sex::Female => FALLBACK_CALORIES_FEMALE,
            };
            DefaultGoals::from_calories(Decimal::from(calories))
        }
    }
}

/// Whole years between calendar years. Month and day are ignored, so a user
/// born in December counts a year older from January 1st.
pub fn age_in_years(born: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - born.year()
}

/// Basal metabolic rate in kcal/day.
pub fn mifflin_st_jeor(sex: Sex, weight_kg: Decimal, height_cm: Decimal, age: i32) -> Decimal {
    let base = Decimal::from(10) * weight_kg + Decimal::new(625, 2) * height_cm - Decimal::from(5) * Decimal::from(age);
    match sex {
        Sex::Male => base + Decimal::from(5),
        Sex::Female => base - Decimal::from(161),
    }
}
