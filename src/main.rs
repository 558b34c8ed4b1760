use std::process::ExitCode;

use quiz_client::{
    app_state::AppState, config::Config, errors::AppResult, models::dto::request::Credentials,
};

const USAGE: &str = "usage: quiz-client <whoami | login <email> <password> | logout | goto <path> | preview <quiz_id> | review <score_id>>";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_env();
    log::debug!("Using API at {}", config.api_base_url);

    let state = match AppState::init(config).await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to initialize client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&state, &args).await;

    let notification = state.notifications.current();
    if notification.visible {
        println!("[{:?}] {}", notification.severity, notification.message);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error ({}): {}", e.error_code(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(state: &AppState, args: &[String]) -> AppResult<()> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["whoami"] => print_session(state),
        ["login", email, password] => {
            let user = state
                .session_service
                .login(&Credentials::new(email, password))
                .await?;
            let outcome = state.navigate(user.role.landing_path()).await?;
            println!("Signed in as {} -> {}", user.display_name(), outcome.location.path);
        }
        ["logout"] => {
            state.logout().await;
            print_session(state);
        }
        ["goto", path] => {
            let outcome = state.navigate(path).await?;
            if outcome.redirected {
                println!("{} -> {}", outcome.requested, outcome.location.path);
            } else {
                println!("{}", outcome.location.path);
            }
        }
        ["preview", quiz_id] => {
            let quiz = state.quiz_attempts.fetch_details(parse_id(quiz_id)?).await?;
            println!("{}", serde_json::to_string_pretty(&quiz)?);
        }
        ["review", score_id] => {
            let review = state
                .quiz_attempts
                .fetch_attempt_review(parse_id(score_id)?)
                .await?;
            println!("{}", serde_json::to_string_pretty(&review)?);
        }
        _ => println!("{}", USAGE),
    }
    Ok(())
}

fn print_session(state: &AppState) {
    let snapshot = state.session.snapshot();
    match snapshot.user {
        Some(user) => println!("{} <{}> ({:?})", user.display_name(), user.email, user.role),
        None if snapshot.has_token => println!("Token stored but not verified"),
        None => println!("Not signed in"),
    }
}

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| quiz_client::errors::AppError::ValidationError(format!("Invalid id: {}", raw)))
}
