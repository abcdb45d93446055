//! Domain data models for the meal-planning client
//!
//! This module contains the payloads produced by the nutrition API and the
//! records kept in the daily cache for the meal-plan and ingredient-search
//! features.

pub mod ingredient;
pub mod meal_plan;

pub use ingredient::{Ingredient, IngredientNutrition, NutrientAmount, SavedSearch};
pub use meal_plan::{Diet, Meal, MealPlan, MealPlanRecord, MealPlanRequest, TimeFrame};

use serde::{Deserialize, Serialize};

/// Macronutrient totals in kcal and grams
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    /// Energy in kcal
    #[serde(default)]
    pub calories: f64,
    /// Carbohydrates in grams
    #[serde(default)]
    pub carbohydrates: f64,
    /// Fat in grams
    #[serde(default)]
    pub fat: f64,
    /// Protein in grams
    #[serde(default)]
    pub protein: f64,
}

impl std::ops::Add for Nutrients {
    type Output = Nutrients;

    fn add(self, other: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + other.calories,
            carbohydrates: self.carbohydrates + other.carbohydrates,
            fat: self.fat + other.fat,
            protein: self.protein + other.protein,
        }
    }
}
