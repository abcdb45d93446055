//! Ingredient search screen

use super::amount;
use crate::data::SavedSearch;

/// Renders each found ingredient with its macronutrients per reported amount
pub fn render(search: &SavedSearch) -> String {
    let mut out = if search.query.trim().is_empty() {
        "Saved ingredient search\n".to_string()
    } else {
        format!("Results for \"{}\"\n", search.query)
    };

    if search.ingredients.is_empty() {
        out.push_str("\nNo ingredients match your search.\n");
        return out;
    }

    for ingredient in &search.ingredients {
        out.push_str(&format!("\n{}\n", ingredient.name));
        match search.nutrition_data.get(&ingredient.id) {
            Some(nutrition) => {
                let summary = nutrition.summary();
                out.push_str(&format!(
                    "  per {} {}: {} kcal, {} g protein, {} g fat, {} g carbohydrates\n",
                    amount(nutrition.amount),
                    nutrition.unit,
                    amount(summary.calories),
                    amount(summary.protein),
                    amount(summary.fat),
                    amount(summary.carbohydrates)
                ));
            }
            None => out.push_str("  nutrition unavailable\n"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Ingredient, IngredientNutrition, NutrientAmount};
    use std::collections::BTreeMap;

    #[test]
    fn test_render_ingredient_with_nutrition() {
        let mut nutrition_data = BTreeMap::new();
        nutrition_data.insert(
            9003,
            IngredientNutrition {
                id: 9003,
                name: "apple".to_string(),
                amount: 100.0,
                unit: "grams".to_string(),
                nutrients: vec![NutrientAmount {
                    name: "Calories".to_string(),
                    amount: 52.0,
                    unit: "kcal".to_string(),
                }],
            },
        );
        let search = SavedSearch {
            query: "apple".to_string(),
            ingredients: vec![
                Ingredient {
                    id: 9003,
                    name: "apple".to_string(),
                    image: None,
                },
                Ingredient {
                    id: 1,
                    name: "apple pie spice".to_string(),
                    image: None,
                },
            ],
            nutrition_data,
        };

        let output = render(&search);

        assert!(output.starts_with("Results for \"apple\""));
        assert!(output.contains("per 100 grams: 52 kcal, 0 g protein"));
        assert!(output.contains("apple pie spice\n  nutrition unavailable"));
    }

    #[test]
    fn test_render_no_results() {
        let search = SavedSearch {
            query: "zzz".to_string(),
            ingredients: vec![],
            nutrition_data: BTreeMap::new(),
        };

        assert!(render(&search).contains("No ingredients match"));
    }

    #[test]
    fn test_render_search_without_query() {
        let search = SavedSearch {
            query: String::new(),
            ingredients: vec![],
            nutrition_data: BTreeMap::new(),
        };

        assert!(render(&search).starts_with("Saved ingredient search\n"));
    }
}
