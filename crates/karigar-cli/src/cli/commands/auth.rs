//! Auth command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use karigar_core::api::ApiClient;
use karigar_core::api::auth::{Credentials, RegisterRequest};

use super::describe;

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    /// Password (read from stdin if omitted)
    #[arg(long)]
    pub password: Option<String>,

    /// Account type
    #[arg(long, default_value = "customer", value_parser = ["customer", "provider"])]
    pub user_type: String,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub phone_number: Option<String>,

    #[arg(long)]
    pub address: Option<String>,
}

pub async fn login(client: &ApiClient, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    let credentials = Credentials {
        username: username.to_string(),
        password,
    };
    let response = client.login(&credentials).await.map_err(describe)?;

    let session = response.into_session();
    client.store().save(&session).context("save session")?;

    println!(
        "Logged in as {} ({})",
        session.user.username, session.user.user_type
    );
    Ok(())
}

pub async fn register(client: &ApiClient, args: RegisterArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => read_password()?,
    };

    let request = RegisterRequest {
        username: args.username,
        email: args.email,
        password_confirm: password.clone(),
        password,
        user_type: args.user_type,
        first_name: args.first_name,
        last_name: args.last_name,
        phone_number: args.phone_number,
        address: args.address,
    };
    let response = client.register(&request).await.map_err(describe)?;

    let session = response.into_session();
    client.store().save(&session).context("save session")?;

    println!("Account created for {}", session.user.username);
    Ok(())
}

pub async fn logout(client: &ApiClient) -> Result<()> {
    let Some(session) = client.store().load() else {
        println!("Not logged in");
        return Ok(());
    };

    // Server-side invalidation is best-effort: the local session is cleared
    // even when the server is unreachable.
    if let Err(err) = client.logout(&session.refresh_token).await {
        tracing::warn!(error = %err, "server logout failed");
    }

    client.store().clear().context("clear session")?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami(client: &ApiClient) -> Result<()> {
    let user = client.profile().await.map_err(describe)?;

    println!("{} ({})", user.username, user.user_type);
    let full_name = user.full_name();
    if full_name != user.username {
        println!("Name:     {full_name}");
    }
    if let Some(email) = &user.email {
        println!("Email:    {email}");
    }
    if let Some(phone) = &user.phone_number {
        println!("Phone:    {phone}");
    }
    if let Some(address) = &user.address {
        println!("Address:  {address}");
    }
    println!(
        "Verified: {}",
        if user.is_verified { "yes" } else { "no" }
    );
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush().ok();

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;

    let password = line.trim().to_string();
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    Ok(password)
}
