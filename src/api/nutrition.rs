//! Spoonacular-style nutrition API client
//!
//! This module fetches generated meal plans and ingredient nutrition facts and
//! normalises them into the payload types kept in the daily cache.

use futures::future::join_all;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::{status_error, ApiError};
use crate::data::{
    Ingredient, IngredientNutrition, Meal, MealPlan, MealPlanRequest, NutrientAmount, Nutrients,
    SavedSearch,
};

/// Default base URL of the nutrition API
pub const DEFAULT_NUTRITION_URL: &str = "https://api.spoonacular.com";

/// Base URL for recipe images
const RECIPE_IMAGE_BASE_URL: &str = "https://spoonacular.com/recipeImages";

/// Base URL for ingredient thumbnails
const INGREDIENT_IMAGE_BASE_URL: &str = "https://spoonacular.com/cdn/ingredients_100x100";

/// Quantity ingredient nutrition is reported for
const NUTRITION_AMOUNT_GRAMS: u32 = 100;

/// Order of days in a weekly plan response
const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Meal-plan response: day plans carry `meals`/`nutrients`, week plans a `week` map
#[derive(Debug, Deserialize)]
struct RawMealPlan {
    #[serde(default)]
    meals: Vec<RawMeal>,
    #[serde(default)]
    nutrients: Option<Nutrients>,
    #[serde(default)]
    week: Option<HashMap<String, RawDay>>,
}

#[derive(Debug, Deserialize)]
struct RawDay {
    #[serde(default)]
    meals: Vec<RawMeal>,
    #[serde(default)]
    nutrients: Nutrients,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeal {
    id: u64,
    title: String,
    #[serde(default)]
    image_type: Option<String>,
    #[serde(default)]
    ready_in_minutes: Option<u32>,
    #[serde(default)]
    servings: Option<u32>,
    #[serde(default)]
    source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(default)]
    results: Vec<RawIngredient>,
}

#[derive(Debug, Deserialize)]
struct RawIngredient {
    id: u64,
    #[serde(alias = "title")]
    name: String,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIngredientInfo {
    id: u64,
    #[serde(alias = "title")]
    name: String,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    nutrition: Option<RawNutrition>,
}

#[derive(Debug, Deserialize)]
struct RawNutrition {
    #[serde(default)]
    nutrients: Vec<NutrientAmount>,
}

/// Client for the nutrition API
#[derive(Debug, Clone)]
pub struct NutritionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NutritionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    /// Create a NutritionClient with a custom HTTP client
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Generates a meal plan for the given request
    ///
    /// # Returns
    /// * `Ok(MealPlan)` - meals with combined nutrients; a weekly plan is
    ///   flattened Monday to Sunday with nutrients summed
    /// * `Err(ApiError)` - if the request or parsing fails
    pub async fn generate_meal_plan(&self, request: &MealPlanRequest) -> Result<MealPlan, ApiError> {
        let url = format!("{}/mealplanner/generate", self.base_url);

        let mut query = vec![
            ("timeFrame", request.time_frame.as_str().to_string()),
            ("targetCalories", request.target_calories.to_string()),
        ];
        if let Some(diet) = request.diet {
            query.push(("diet", diet.as_str().to_string()));
        }
        if let Some(exclude) = &request.exclude {
            query.push(("exclude", exclude.clone()));
        }

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(&query)
            .send()
            .await?;
        let text = Self::success_text(response, "Meal plan generation failed").await?;
        let raw: RawMealPlan = serde_json::from_str(&text)?;

        Ok(parse_meal_plan(raw))
    }

    /// Searches ingredients by name and fetches nutrition for each result
    ///
    /// Nutrition lookups run concurrently. Any failed lookup fails the whole
    /// search so a partial result is never cached.
    pub async fn search_ingredients(&self, query: &str, limit: u32) -> Result<SavedSearch, ApiError> {
        let url = format!("{}/food/ingredients/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(&[("query", query.trim().to_string()), ("number", limit.to_string())])
            .send()
            .await?;
        let text = Self::success_text(response, "Ingredient search failed").await?;
        let raw: RawSearchResponse = serde_json::from_str(&text)?;

        let ingredients: Vec<Ingredient> = raw
            .results
            .into_iter()
            .map(|r| Ingredient {
                id: r.id,
                name: r.name,
                image: r.image.map(|i| ingredient_image_url(&i)),
            })
            .collect();
        debug!(query = query.trim(), results = ingredients.len(), "ingredient search answered");

        let lookups = ingredients
            .iter()
            .map(|ingredient| self.fetch_ingredient_nutrition(ingredient.id));
        let nutrition_data = join_all(lookups)
            .await
            .into_iter()
            .map(|result| result.map(|n| (n.id, n)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(SavedSearch {
            query: query.trim().to_string(),
            ingredients,
            nutrition_data,
        })
    }

    /// Fetches nutrition facts for 100 g of one ingredient
    pub async fn fetch_ingredient_nutrition(&self, id: u64) -> Result<IngredientNutrition, ApiError> {
        let url = format!("{}/food/ingredients/{}/information", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(&[
                ("amount", NUTRITION_AMOUNT_GRAMS.to_string()),
                ("unit", "grams".to_string()),
            ])
            .send()
            .await?;
        let text = Self::success_text(response, "Nutrition lookup failed").await?;
        let raw: RawIngredientInfo = serde_json::from_str(&text)?;

        Ok(IngredientNutrition {
            id: raw.id,
            name: raw.name,
            amount: raw.amount.unwrap_or(NUTRITION_AMOUNT_GRAMS as f64),
            unit: raw.unit.unwrap_or_else(|| "grams".to_string()),
            nutrients: raw.nutrition.map(|n| n.nutrients).unwrap_or_default(),
        })
    }

    async fn success_text(response: Response, fallback: &str) -> Result<String, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        if status == StatusCode::OK {
            Ok(text)
        } else {
            Err(status_error(status, &text, fallback))
        }
    }
}

fn recipe_image_url(meal: &RawMeal) -> String {
    format!(
        "{}/{}-312x231.{}",
        RECIPE_IMAGE_BASE_URL,
        meal.id,
        meal.image_type.as_deref().unwrap_or("jpg")
    )
}

fn ingredient_image_url(image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        image.to_string()
    } else {
        format!("{}/{}", INGREDIENT_IMAGE_BASE_URL, image)
    }
}

fn convert_meals(meals: Vec<RawMeal>) -> impl Iterator<Item = Meal> {
    meals.into_iter().map(|raw| Meal {
        image: recipe_image_url(&raw),
        id: raw.id,
        title: raw.title,
        ready_in_minutes: raw.ready_in_minutes,
        servings: raw.servings,
        source_url: raw.source_url,
    })
}

/// Normalises day and week responses into one MealPlan
fn parse_meal_plan(raw: RawMealPlan) -> MealPlan {
    let Some(mut week) = raw.week else {
        return MealPlan {
            meals: convert_meals(raw.meals).collect(),
            nutrients: raw.nutrients.unwrap_or_default(),
        };
    };

    let mut plan = MealPlan::default();
    for day in WEEKDAYS {
        if let Some(entry) = week.remove(day) {
            plan.meals.extend(convert_meals(entry.meals));
            plan.nutrients = plan.nutrients + entry.nutrients;
        }
    }
    plan
}
