use scribe_core::auth::AuthUser;
use scribe_core::backend::{AccountBackend, NotesBackend};

use crate::cli::AuthCommands;
use crate::error::CliError;

pub async fn run_auth<B>(
    command: AuthCommands,
    profile_name: &str,
    backend: &B,
) -> Result<(), CliError>
where
    B: AccountBackend + NotesBackend,
{
    match command {
        AuthCommands::Login { email, password } => {
            let user = backend.sign_in(&email, &password).await?;
            tracing::info!("Signed in profile '{}'", profile_name);
            println!(
                "Signed in profile '{profile_name}' as {}",
                email_label(&user)
            );
        }
        AuthCommands::Signup { email, password } => {
            match backend.sign_up(&email, &password).await? {
                Some(user) => println!(
                    "Signed up and signed in profile '{profile_name}' as {}",
                    email_label(&user)
                ),
                None => println!(
                    "Check {} to confirm your account, then run `scribe auth login`.",
                    email.trim()
                ),
            }
        }
        AuthCommands::Status => match backend.current_user().await? {
            Some(user) => println!(
                "Profile '{profile_name}' is signed in as {}",
                email_label(&user)
            ),
            None => println!("Profile '{profile_name}' is not signed in."),
        },
        AuthCommands::Logout => {
            backend.sign_out().await?;
            println!("Signed out profile '{profile_name}'");
        }
    }
    Ok(())
}

fn email_label(user: &AuthUser) -> &str {
    user.email.as_deref().unwrap_or("(no email)")
}
