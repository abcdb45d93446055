//! mealday - daily meal plans and ingredient nutrition
//!
//! Command-line front end standing in for the app's screens. Every command
//! first validates the persisted session, then runs one user action.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use mealday::api::Registration;
use mealday::app::{App, AppError};
use mealday::cli::{Cli, Command};
use mealday::config::Config;
use mealday::session::AuthState;
use mealday::ui;

/// Sets up logging to stderr, `mealday=warn` unless RUST_LOG says otherwise
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mealday=warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Reads a password from stdin when it was not given as a flag
///
/// Input is read as a plain line, so an interactive terminal echoes it.
/// Pipe the password in to keep it off screen.
fn password_or_prompt(password: Option<String>) -> Result<String, AppError> {
    if let Some(password) = password {
        return Ok(password);
    }
    let read_error = |e: io::Error| AppError::InvalidInput(format!("Could not read password: {}", e));

    let mut stderr = io::stderr();
    write!(stderr, "Password (shown as typed): ").map_err(read_error)?;
    stderr.flush().map_err(read_error)?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).map_err(read_error)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn run(app: &App, command: Command) -> Result<(), AppError> {
    eprintln!("{}", ui::render_loading());
    let state = app.start().await;

    match command {
        Command::Status => {
            println!("{}", ui::render_status(state));
        }
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            app.login(&email, &password).await?;
            println!("{}", ui::render_status(app.session().state()));
        }
        Command::Register {
            email,
            username,
            phone,
            password,
        } => {
            let registration = Registration {
                email,
                username,
                password: password_or_prompt(password)?,
                phone_number: phone,
            };
            app.register(&registration).await?;
            println!("Registration successful. A verification code has been sent to your email.");
            println!("{}", ui::render_status(app.session().state()));
        }
        Command::Logout => {
            app.logout().await?;
            println!("{}", ui::render_status(app.session().state()));
        }
        Command::Plan(args) => {
            let request = args
                .to_request()
                .map_err(|e| AppError::InvalidInput(e.to_string()))?;
            let fetched = app.generate_meal_plan(request, args.refresh).await?;
            println!("{}", ui::render_meal_plan(&fetched.value));
            println!("{}", ui::render_origin(fetched.origin, fetched.write_error.as_ref()));
        }
        Command::Search { query, refresh } => {
            let fetched = app.search(&query, refresh).await?;
            println!("{}", ui::render_search(&fetched.value));
            println!("{}", ui::render_origin(fetched.origin, fetched.write_error.as_ref()));
        }
        Command::Today => {
            if state != AuthState::Authenticated {
                return Err(AppError::NotAuthenticated);
            }
            match app.restore_meal_plan().await? {
                Some(record) => println!("{}", ui::render_meal_plan(&record)),
                None => println!("No meal plan generated today."),
            }
            match app.restore_search().await? {
                Some(search) => println!("{}", ui::render_search(&search)),
                None => println!("No ingredient search today."),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = async {
        let mut config = Config::load()?;
        if let Some(dir) = cli.data_dir {
            config = config.with_data_dir(dir);
        }
        let app = App::new(&config)?;
        run(&app, cli.command).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", ui::render_error(&e));
            ExitCode::FAILURE
        }
    }
}
