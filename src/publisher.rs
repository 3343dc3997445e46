//! Catalog change notifications over NATS. Optional; without `NATS_URL`
//! events are dropped.

use crate::domain::events::CatalogEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn disabled() -> Self { Self::default() }

    pub async fn connect(url: &str) -> Result<Self, async_nats::ConnectError> {
        let client = async_nats::connect(url).await?;
        tracing::info!(%url, "connected to NATS");
        Ok(Self { nats: Some(client) })
    }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    /// Fire and forget; failures are logged only.
    pub async fn publish(&self, event: &CatalogEvent) {
        let Some(nats) = &self.nats else { return };
        let payload = match serde_json::to_vec(event) {
            Ok(p) => p,
            Err(e) => { tracing::warn!(error = %e, "could not encode catalog event"); return; }
        };
        if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
            tracing::warn!(error = %e, subject = event.subject(), "catalog event not published");
        }
    }
}
