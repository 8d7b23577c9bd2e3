use quill_core::app::LoginOutcome;
use quill_core::auth::{AuthError, SessionPersistence};

use crate::commands::common::build_app;
use crate::error::CliError;
use crate::session::KeyringSessionStore;

pub async fn run_login(username: &str, password: &str) -> Result<(), CliError> {
    let mut app = build_app()?;

    match app.login(username, password).await? {
        LoginOutcome::SignedIn(credential) => {
            println!("Signed in as {} ({})", credential.name, credential.username);
            Ok(())
        }
        LoginOutcome::Rejected => Err(CliError::Auth(AuthError::InvalidCredentials)),
    }
}

pub fn run_logout() -> Result<(), CliError> {
    let mut app = build_app()?;
    app.logout()?;
    println!("Signed out");
    Ok(())
}

pub fn run_status() -> Result<(), CliError> {
    let stored = KeyringSessionStore.load()?;

    match stored {
        Some(credential) => {
            println!("Signed in as {} ({})", credential.name, credential.username);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}
