use tracing::{info, warn};

use crate::backend::{Delay, Latency};
use crate::error::{BackendError, BackendResult};

/// Reachability of the backend. The mock is always reachable unless an
/// outage is simulated.
pub struct ConnectionStatus {
    latency: Latency,
    connected: bool,
    error: Option<String>,
    outage: Option<String>,
}

impl ConnectionStatus {
    pub fn new(latency: Latency) -> Self {
        Self {
            latency,
            connected: true,
            error: None,
            outage: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn connection_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Make the next check fail with `reason`.
    pub fn simulate_outage(&mut self, reason: impl Into<String>) {
        self.outage = Some(reason.into());
    }

    pub async fn check_connection(&mut self) -> BackendResult<()> {
        self.latency.pause(Delay::ConnectionCheck).await;
        match self.outage.take() {
            None => {
                self.connected = true;
                self.error = None;
                Ok(())
            }
            Some(reason) => {
                warn!("Connection check failed: {}", reason);
                self.connected = false;
                self.error = Some(reason.clone());
                Err(BackendError::Other(anyhow::anyhow!(reason)))
            }
        }
    }

    pub async fn initialize_database(&mut self) -> BackendResult<()> {
        self.check_connection().await?;
        info!("Demo mode active: using local data");
        Ok(())
    }
}
