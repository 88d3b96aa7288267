use tracing::warn;

/// One-shot webhook ping at the end of a run. Delivery problems are logged
/// and never fail the run itself.
pub async fn notify(client: &reqwest::Client, webhook_url: Option<&str>, text: &str) {
    let Some(url) = webhook_url else {
        warn!("WEBHOOK_URL not set, skipping notification");
        return;
    };

    let body = serde_json::json!({ "text": text });
    match client.post(url).json(&body).send().await {
        Ok(resp) if !resp.status().is_success() => {
            warn!("Webhook returned {}", resp.status());
        }
        Ok(_) => {}
        Err(e) => warn!("Webhook delivery failed: {e}"),
    }
}
