//! Live API tests. Run with `--features api` and credentials in `.env`.

use std::sync::Arc;
use tessera_interface::{RenderBackend, TextBackend};
use tessera_models::{OpenAiTextClient, PlacidClient};
use tessera_rate_limit::ModelSettings;

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_openai_completion() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let client = OpenAiTextClient::from_settings(&ModelSettings::default())?;
    let completion = client
        .call("Reply with the single word OK.", "Ready?")
        .await?;

    assert!(!completion.text().is_empty());
    assert!(completion.usage().total() > 0);
    Ok(())
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_placid_poll_unknown_image_fails() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let client: Arc<dyn RenderBackend> = Arc::new(PlacidClient::from_settings(&ModelSettings::default())?);
    assert!(client.poll("0").await.is_err());
    Ok(())
}

#[test]
fn test_missing_credentials_are_reported() {
    // SAFETY: this test is the only one in the binary touching this variable.
    unsafe { std::env::remove_var("REMOVEBG_API_KEY") };
    let err = tessera_models::RemoveBgClient::from_settings(&ModelSettings::default()).unwrap_err();
    assert!(err.to_string().contains("REMOVEBG_API_KEY"));
}
