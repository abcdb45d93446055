//! Generated meal plans and the parameters used to request them

use serde::{Deserialize, Serialize};

use super::Nutrients;

/// Daily calorie target used when the user has not entered one
pub const DEFAULT_TARGET_CALORIES: u32 = 2450;

/// A single recipe in a generated plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    /// Recipe identifier on the nutrition API
    pub id: u64,
    /// Recipe title
    pub title: String,
    /// Recipe image URL
    pub image: String,
    /// Preparation time in minutes, if provided
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    /// Number of servings, if provided
    #[serde(default)]
    pub servings: Option<u32>,
    /// Link to the full recipe
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Meals plus their combined nutrient totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub meals: Vec<Meal>,
    pub nutrients: Nutrients,
}

/// Span of time a meal plan covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Day,
    Week,
}

impl TimeFrame {
    /// Query parameter value understood by the nutrition API
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Day => "day",
            TimeFrame::Week => "week",
        }
    }

    /// Parses user input into a TimeFrame.
    ///
    /// Accepts the English names and the Indonesian labels "harian" and
    /// "mingguan".
    pub fn from_str(s: &str) -> Option<TimeFrame> {
        match s.to_lowercase().trim() {
            "day" | "daily" | "harian" => Some(TimeFrame::Day),
            "week" | "weekly" | "mingguan" => Some(TimeFrame::Week),
            _ => None,
        }
    }
}

/// Diet restriction applied to plan generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diet {
    Vegetarian,
    Vegan,
    Paleo,
    Ketogenic,
}

impl Diet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diet::Vegetarian => "vegetarian",
            Diet::Vegan => "vegan",
            Diet::Paleo => "paleo",
            Diet::Ketogenic => "ketogenic",
        }
    }

    /// Parses user input into a Diet (case-insensitive, "keto" is an alias)
    pub fn from_str(s: &str) -> Option<Diet> {
        match s.to_lowercase().trim() {
            "vegetarian" => Some(Diet::Vegetarian),
            "vegan" => Some(Diet::Vegan),
            "paleo" => Some(Diet::Paleo),
            "ketogenic" | "keto" => Some(Diet::Ketogenic),
            _ => None,
        }
    }
}

/// Parameters for generating a meal plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
    pub time_frame: TimeFrame,
    pub target_calories: u32,
    #[serde(default)]
    pub diet: Option<Diet>,
    /// Comma-separated ingredients to leave out
    #[serde(default)]
    pub exclude: Option<String>,
}

impl Default for MealPlanRequest {
    fn default() -> Self {
        Self {
            time_frame: TimeFrame::Day,
            target_calories: DEFAULT_TARGET_CALORIES,
            diet: None,
            exclude: None,
        }
    }
}

impl MealPlanRequest {
    /// Returns the request with blank exclusions dropped and whitespace trimmed,
    /// so equivalent user input compares equal.
    pub fn normalized(mut self) -> Self {
        self.exclude = self
            .exclude
            .map(|e| {
                e.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .filter(|e| !e.is_empty());
        self
    }
}

/// Cached form of the meal-plan feature: the plan and the request that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanRecord {
    #[serde(rename = "mealPlan")]
    pub meal_plan: MealPlan,
    /// Absent in records written without request parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<MealPlanRequest>,
}

impl MealPlanRecord {
    /// Whether this plan was generated for `request`
    ///
    /// A record without a stored request never answers a parameterized request.
    pub fn answers(&self, request: &MealPlanRequest) -> bool {
        self.request.as_ref() == Some(request)
    }
}
