//! Geocoder-only commands. These need no session.

use platemap_core::{AppConfig, Position};
use platemap_geocode::GeocodeClient;

pub(crate) fn geocode_client(config: &AppConfig) -> anyhow::Result<GeocodeClient> {
    let client = GeocodeClient::new(
        &config.geocoder_base_url,
        config.request_timeout_secs,
        &config.geocoder_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build geocoder client: {e}"))?
    .with_retry(config.geocoder_max_retries, config.geocoder_backoff_base_ms)
    .with_limit(config.suggestion_limit);
    Ok(client)
}

/// Prints ranked suggestions for `text`, one per line, prefixed by the index
/// `pick --index` accepts.
pub(crate) async fn run_search(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let query = text.trim();
    if query.is_empty() {
        println!("(empty query, no suggestions)");
        return Ok(());
    }

    let client = geocode_client(config)?;
    let suggestions = client.search(query).await?;
    if suggestions.is_empty() {
        println!("no matches for \"{query}\"");
    }
    for (i, s) in suggestions.iter().enumerate() {
        println!("[{i}] {}  ({})", s.label, s.position);
    }
    Ok(())
}

pub(crate) async fn run_reverse(config: &AppConfig, lat: f64, lng: f64) -> anyhow::Result<()> {
    let position = Position::new(lat, lng)?;
    let client = geocode_client(config)?;
    let address = client.reverse(position).await?;
    println!("{address}");
    Ok(())
}
