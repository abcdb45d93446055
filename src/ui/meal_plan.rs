//! Meal-plan screen

use super::amount;
use crate::data::{MealPlanRecord, TimeFrame};

/// Renders a meal plan with its request parameters and nutrient totals
pub fn render(record: &MealPlanRecord) -> String {
    let plan = &record.meal_plan;
    let mut out = String::new();

    match &record.request {
        Some(request) => {
            let span = match request.time_frame {
                TimeFrame::Day => "Daily",
                TimeFrame::Week => "Weekly",
            };
            out.push_str(&format!(
                "{} meal plan, {} kcal target",
                span, request.target_calories
            ));
            if let Some(diet) = request.diet {
                out.push_str(&format!(", {}", diet.as_str()));
            }
            if let Some(exclude) = &request.exclude {
                out.push_str(&format!(", excluding {}", exclude));
            }
        }
        None => out.push_str("Saved meal plan"),
    }
    out.push('\n');

    if plan.meals.is_empty() {
        out.push_str("\nNo meals returned for these parameters.\n");
        return out;
    }

    out.push('\n');
    for (i, meal) in plan.meals.iter().enumerate() {
        out.push_str(&format!("{:>2}. {}", i + 1, meal.title));
        let mut details = Vec::new();
        if let Some(minutes) = meal.ready_in_minutes {
            details.push(format!("{} min", minutes));
        }
        if let Some(servings) = meal.servings {
            details.push(format!("{} servings", servings));
        }
        if !details.is_empty() {
            out.push_str(&format!(" ({})", details.join(", ")));
        }
        out.push('\n');
        if let Some(url) = &meal.source_url {
            out.push_str(&format!("    {}\n", url));
        }
    }

    let n = &plan.nutrients;
    out.push_str(&format!(
        "\nTotal nutrients\n  Calories:      {} kcal\n  Carbohydrates: {} g\n  Fat:           {} g\n  Protein:       {} g\n",
        amount(n.calories),
        amount(n.carbohydrates),
        amount(n.fat),
        amount(n.protein)
    ));
    out
}
