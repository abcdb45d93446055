//! Ingredient search results and per-ingredient nutrition

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Nutrients;

/// An ingredient returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient identifier on the nutrition API
    pub id: u64,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// One nutrient line from an ingredient's nutrition facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientAmount {
    #[serde(alias = "title")]
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

/// Nutrition facts for a fixed amount of one ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientNutrition {
    pub id: u64,
    pub name: String,
    /// Quantity the nutrients refer to
    pub amount: f64,
    pub unit: String,
    pub nutrients: Vec<NutrientAmount>,
}

impl IngredientNutrition {
    /// Amount of the named nutrient, or 0 when it is not listed
    pub fn nutrient(&self, name: &str) -> f64 {
        self.nutrients
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
            .map(|n| n.amount)
            .unwrap_or(0.0)
    }

    /// Macronutrient summary used by the search screen
    pub fn summary(&self) -> Nutrients {
        Nutrients {
            calories: self.nutrient("Calories"),
            carbohydrates: self.nutrient("Carbohydrates"),
            fat: self.nutrient("Fat"),
            protein: self.nutrient("Protein"),
        }
    }
}

/// Cached form of the ingredient-search feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSearch {
    /// Query as entered by the user; empty in records written without one
    #[serde(default)]
    pub query: String,
    pub ingredients: Vec<Ingredient>,
    /// Nutrition facts keyed by ingredient id
    #[serde(rename = "nutritionData")]
    pub nutrition_data: BTreeMap<u64, IngredientNutrition>,
}

impl SavedSearch {
    /// Whether this result answers `query` (trimmed, case-insensitive)
    ///
    /// A record without a stored query matches nothing.
    pub fn matches_query(&self, query: &str) -> bool {
        let stored = self.query.trim();
        !stored.is_empty() && stored.to_lowercase() == query.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_nutrition() -> IngredientNutrition {
        IngredientNutrition {
            id: 9003,
            name: "apple".to_string(),
            amount: 100.0,
            unit: "grams".to_string(),
            nutrients: vec![
                NutrientAmount {
                    name: "Calories".to_string(),
                    amount: 52.0,
                    unit: "kcal".to_string(),
                },
                NutrientAmount {
                    name: "Carbohydrates".to_string(),
                    amount: 13.8,
                    unit: "g".to_string(),
                },
                NutrientAmount {
                    name: "Protein".to_string(),
                    amount: 0.26,
                    unit: "g".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_summary_reads_named_nutrients() {
        let summary = sample_nutrition().summary();

        assert!((summary.calories - 52.0).abs() < 0.001);
        assert!((summary.carbohydrates - 13.8).abs() < 0.001);
        assert!((summary.protein - 0.26).abs() < 0.001);
        assert_eq!(summary.fat, 0.0, "Missing nutrient should be 0");
    }

    #[test]
    fn test_nutrient_lookup_is_case_insensitive() {
        assert!((sample_nutrition().nutrient("calories") - 52.0).abs() < 0.001);
    }

    #[test]
    fn test_nutrient_amount_accepts_title_field() {
        let amount: NutrientAmount =
            serde_json::from_str(r#"{"title": "Fat", "amount": 3.5, "unit": "g"}"#)
                .expect("Should parse");
        assert_eq!(amount.name, "Fat");
    }

    #[test]
    fn test_matches_query_ignores_case_and_whitespace() {
        let search = SavedSearch {
            query: "Apple".to_string(),
            ingredients: vec![],
            nutrition_data: BTreeMap::new(),
        };

        assert!(search.matches_query("  apple "));
        assert!(!search.matches_query("banana"));
    }

    #[test]
    fn test_saved_search_serializes_nutrition_data_by_id() {
        let mut nutrition_data = BTreeMap::new();
        nutrition_data.insert(9003, sample_nutrition());
        let search = SavedSearch {
            query: "apple".to_string(),
            ingredients: vec![Ingredient {
                id: 9003,
                name: "apple".to_string(),
                image: Some("apple.jpg".to_string()),
            }],
            nutrition_data,
        };

        let json = serde_json::to_value(&search).expect("Should serialize");

        assert!(json["nutritionData"].get("9003").is_some());
        let back: SavedSearch = serde_json::from_value(json).expect("Should deserialize");
        assert_eq!(back, search);
    }

    #[test]
    fn test_saved_search_without_query_is_readable_but_not_reusable() {
        let search: SavedSearch = serde_json::from_str(
            r#"{"ingredients": [{"id": 9003, "name": "apple", "image": "apple.jpg"}],
                "nutritionData": {}}"#,
        )
        .expect("Should parse without a query");

        assert_eq!(search.query, "");
        assert_eq!(search.ingredients.len(), 1);
        assert!(!search.matches_query(""));
        assert!(!search.matches_query("apple"));
    }
}
