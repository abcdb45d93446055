//! Command-line interface parsing for mealday
//!
//! This module defines the commands that stand in for the app's screens:
//! session management, the meal-plan screen, the ingredient search screen and
//! a view that restores today's cached results.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;

use crate::data::meal_plan::DEFAULT_TARGET_CALORIES;
use crate::data::{Diet, MealPlanRequest, TimeFrame};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified diet is not recognized
    #[error("Invalid diet: '{0}'. Valid diets: vegetarian, vegan, paleo, ketogenic")]
    InvalidDiet(String),

    /// The specified time frame is not recognized
    #[error("Invalid time frame: '{0}'. Valid time frames: day, week")]
    InvalidTimeFrame(String),

    /// The calorie target is zero
    #[error("Calorie target must be greater than zero")]
    ZeroCalories,
}

/// mealday - daily meal plans and ingredient nutrition
#[derive(Parser, Debug)]
#[command(name = "mealday")]
#[command(about = "Meal planning and ingredient nutrition lookup")]
#[command(version)]
pub struct Cli {
    /// Directory holding the session token and cached results
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show whether a valid session exists
    Status,
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Read from standard input when omitted (echoed on a terminal)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and log in with it
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        phone: String,
        /// Read from standard input when omitted (echoed on a terminal)
        #[arg(long)]
        password: Option<String>,
    },
    /// End the session and clear cached results
    Logout,
    /// Generate a meal plan (reuses today's plan for the same parameters)
    Plan(PlanArgs),
    /// Look up ingredient nutrition (reuses today's result for the same query)
    Search {
        /// Ingredient name to search for
        query: String,
        /// Always fetch a fresh result
        #[arg(long)]
        refresh: bool,
    },
    /// Show today's cached meal plan and search without any network call
    Today,
}

/// Parameters of the meal-plan screen
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Plan length: day or week
    #[arg(long, value_name = "FRAME", default_value = "day", value_parser = parse_time_frame_arg)]
    pub time_frame: TimeFrame,

    /// Daily calorie target
    #[arg(long, default_value_t = DEFAULT_TARGET_CALORIES)]
    pub calories: u32,

    /// Diet restriction: vegetarian, vegan, paleo, ketogenic
    #[arg(long, value_parser = parse_diet_arg)]
    pub diet: Option<Diet>,

    /// Comma-separated ingredients to exclude
    #[arg(long)]
    pub exclude: Option<String>,

    /// Always fetch a fresh plan
    #[arg(long)]
    pub refresh: bool,
}

impl PlanArgs {
    /// Converts the arguments into a normalized request
    ///
    /// # Returns
    /// * `Ok(MealPlanRequest)` for a positive calorie target
    /// * `Err(CliError::ZeroCalories)` otherwise
    pub fn to_request(&self) -> Result<MealPlanRequest, CliError> {
        if self.calories == 0 {
            return Err(CliError::ZeroCalories);
        }
        Ok(MealPlanRequest {
            time_frame: self.time_frame,
            target_calories: self.calories,
            diet: self.diet,
            exclude: self.exclude.clone(),
        }
        .normalized())
    }
}

/// Parses a diet string argument into a Diet enum.
pub fn parse_diet_arg(s: &str) -> Result<Diet, CliError> {
    Diet::from_str(s).ok_or_else(|| CliError::InvalidDiet(s.to_string()))
}

/// Parses a time frame string argument into a TimeFrame enum.
pub fn parse_time_frame_arg(s: &str) -> Result<TimeFrame, CliError> {
    TimeFrame::from_str(s).ok_or_else(|| CliError::InvalidTimeFrame(s.to_string()))
}
