use tracing_subscriber::EnvFilter;

use textfully::TextfullyClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("textfully=debug")),
        )
        .init();

    if dotenvy::dotenv().is_err() {
        tracing::warn!(".env file not found");
    }

    let phone = std::env::var("TEXTFULLY_PHONE").unwrap_or_else(|_| "+16175555555".to_owned());
    let message =
        std::env::var("TEXTFULLY_MESSAGE").unwrap_or_else(|_| "Hello, world!".to_owned());

    // Reads TEXTFULLY_API_KEY and, if set, TEXTFULLY_BASE_URL.
    let client = TextfullyClient::from_env()?;

    let response = client.send(phone, message).await?;
    println!(
        "message sent! id: {}, status: {}, created_at: {}",
        response.id, response.status, response.created_at
    );

    Ok(())
}
