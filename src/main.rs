use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use linkedin_auth::{
    AuthError, AuthSettings, Authenticated, Authenticator, AuthorizationRequest, CLIENT_ID_VAR,
    CLIENT_SECRET_VAR, Credentials,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "linkedin-auth",
    version,
    about = "Authorize a LinkedIn app, cache the access token and print the member URN."
)]
struct Cli {
    /// Where the token record is kept
    #[arg(long, env = "LINKEDIN_TOKEN_FILE", default_value = "linkedin_tokens.json")]
    token_file: PathBuf,

    /// Seconds to wait for the browser redirect
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Print the authorization URL without opening a browser
    #[arg(long)]
    no_browser: bool,

    /// Skip the cached token and always run the browser flow
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LINKEDIN_AUTH_LOG")
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        if err.is_configuration() {
            print_missing_credentials();
        } else {
            eprintln!("Error: {err}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AuthError> {
    let credentials = Credentials::from_env()?;

    let settings = AuthSettings::default()
        .with_token_file(cli.token_file)
        .with_callback_timeout(Duration::from_secs(cli.timeout));
    print_banner(&settings.redirect_uri);

    let authenticator = Authenticator::new(credentials, settings)?;
    let open_browser = !cli.no_browser;
    let on_authorize = |request: &AuthorizationRequest| -> Result<(), AuthError> {
        eprintln!(
            "If the browser does not open, visit this URL:\n{}\n",
            request.authorization_url
        );
        if open_browser {
            if let Err(err) = webbrowser::open(&request.authorization_url) {
                eprintln!("Failed to open browser automatically: {err}");
            }
        }
        Ok(())
    };

    let authenticated = if cli.force {
        authenticator.authorize(on_authorize).await?
    } else {
        authenticator.authenticate(on_authorize).await?
    };

    print_summary(&authenticated, &authenticator);
    Ok(())
}

fn print_banner(redirect_uri: &str) {
    eprintln!("LinkedIn Auth Flow");
    eprintln!("Redirect URI: {redirect_uri}");
    eprintln!("This exact URL must be listed under 'Redirect URLs' in the Auth tab");
    eprintln!("of your app at https://developer.linkedin.com/.\n");
}

fn print_missing_credentials() {
    eprintln!("Error: LinkedIn credentials not found.\n");
    eprintln!("Create a .env file containing:");
    eprintln!("  {CLIENT_ID_VAR}=your_client_id");
    eprintln!("  {CLIENT_SECRET_VAR}=your_client_secret\n");
    eprintln!("or export both variables in your shell.");
}

fn print_summary(authenticated: &Authenticated, authenticator: &Authenticator) {
    if authenticated.reused {
        println!("Existing token is still valid.");
    } else {
        println!(
            "Authentication complete. Tokens saved to {}",
            authenticator.cache().path().display()
        );
    }
    println!("User: {}", authenticated.user_name);
    println!("Person URN: {}", authenticated.person_urn);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_to_two_minutes() {
        let cli = Cli::try_parse_from(["linkedin-auth"]).unwrap();
        assert_eq!(cli.timeout, 120);
        assert!(!cli.force);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["linkedin-auth", "--timeout", "0"]).is_err());
        let cli = Cli::try_parse_from(["linkedin-auth", "--timeout", "1"]).unwrap();
        assert_eq!(cli.timeout, 1);
    }
}
