//! Artificial delays that stand in for network round trips.

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Operations that pause before touching the store, so loading states show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    ConnectionCheck,
    Fetch,
    Load,
    LoadListings,
    Create,
    Update,
    Delete,
    SignIn,
    SignOut,
    Upload,
    RemoveFile,
}

impl Delay {
    pub const fn base(self) -> Duration {
        let millis = match self {
            Delay::ConnectionCheck => 100,
            Delay::Fetch | Delay::Load | Delay::RemoveFile => 300,
            Delay::LoadListings | Delay::Update | Delay::Delete | Delay::SignOut => 500,
            Delay::Create | Delay::SignIn | Delay::Upload => 1000,
        };
        Duration::from_millis(millis)
    }
}

/// Largest accepted multiplier on the base delays.
pub const MAX_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Latency {
    enabled: bool,
    scale: f64,
}

impl Latency {
    /// `scale` is clamped to `0..=MAX_SCALE`; NaN counts as zero.
    pub fn new(enabled: bool, scale: f64) -> Self {
        let scale = if scale.is_nan() {
            0.0
        } else {
            scale.clamp(0.0, MAX_SCALE)
        };
        Self { enabled, scale }
    }

    /// Returns immediately from every pause.
    pub fn none() -> Self {
        Self::new(false, 0.0)
    }

    pub fn duration(&self, delay: Delay) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        delay.base().mul_f64(self.scale)
    }

    pub async fn pause(&self, delay: Delay) {
        let duration = self.duration(delay);
        if duration.is_zero() {
            return;
        }
        debug!("Simulating {:?} latency ({} ms)", delay, duration.as_millis());
        sleep(duration).await;
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::new(true, 1.0)
    }
}
