//! Text rendering for mealday
//!
//! Each screen is rendered to a plain `String` so the binary only has to print
//! it. Rendering never touches the network or the cache.

pub mod meal_plan;
pub mod search;

pub use meal_plan::render as render_meal_plan;
pub use search::render as render_search;

use crate::app::{AppError, ErrorKind};
use crate::cache::{CacheError, Origin};
use crate::session::AuthState;

/// Neutral view shown while the session is being validated
pub fn render_loading() -> &'static str {
    "Checking session..."
}

/// One-line summary of the session
pub fn render_status(state: AuthState) -> String {
    match state {
        AuthState::Authenticated => "Logged in.".to_string(),
        AuthState::Unauthenticated => {
            "Logged out. Run `mealday login` or `mealday register` to continue.".to_string()
        }
        AuthState::Unknown => render_loading().to_string(),
    }
}

/// Footer describing where a result came from
pub fn render_origin(origin: Origin, write_error: Option<&CacheError>) -> String {
    let mut footer = match origin {
        Origin::Cache => "(saved earlier today)".to_string(),
        Origin::Remote => "(fresh)".to_string(),
    };
    if let Some(e) = write_error {
        footer.push_str(&format!("\nWarning: result could not be saved for later: {}", e));
    }
    footer
}

/// User-facing error message, with a retry hint when retrying can help
pub fn render_error(error: &AppError) -> String {
    let hint = match error.kind() {
        ErrorKind::NotAuthenticated => " Run `mealday login` first.",
        ErrorKind::RemoteFetch => " Please try again.",
        ErrorKind::Persistence => " Your session could not be saved; please try again.",
        ErrorKind::InvalidInput => "",
    };
    format!("Error: {}.{}", error.to_string().trim_end_matches('.'), hint)
}

/// Formats a nutrient amount without trailing zeros
pub(crate) fn amount(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}
