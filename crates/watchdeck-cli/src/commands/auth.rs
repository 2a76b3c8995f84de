use color_eyre::Result;
use dialoguer::Input;
use watchdeck_config::PathManager;

use crate::commands::{build_backend, load_config};
use crate::output::Output;

pub async fn run_login(email: Option<String>, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let backend = build_backend(&config, &paths)?;

    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    let session = backend.auth.sign_in(&email, &password).await?;
    output.success(format!(
        "Signed in as {}",
        session.email.as_deref().unwrap_or(session.user_id.as_str())
    ));
    Ok(())
}

pub async fn run_logout(output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config = load_config(&paths)?;
    let backend = build_backend(&config, &paths)?;

    backend.auth.sign_out().await?;
    output.success("Signed out");
    Ok(())
}
