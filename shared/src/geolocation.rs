//! Browser geolocation reports
//!
//! The page asks the browser for a one-shot position fix and posts whatever
//! comes back to the server. The payload sits in a single-slot mailbox until
//! the next map render drains it.

use serde::Deserialize;
use tracing::debug;

use crate::models::Coordinates;

/// A decoded report from the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationReport {
    Fix(Coordinates),
    Failed(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReport {
    Failed { error: String },
    Fix { lat: f64, lon: f64 },
}

impl LocationReport {
    /// Decode a raw payload. `None` for anything that is not a well formed
    /// fix or error report; such payloads are dropped by the caller.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<RawReport>(raw) {
            Ok(RawReport::Failed { error }) => Some(Self::Failed(error)),
            Ok(RawReport::Fix { lat, lon }) => match Coordinates::new(lat, lon) {
                Ok(c) => Some(Self::Fix(c)),
                Err(e) => {
                    debug!("Dropping geolocation fix: {}", e);
                    None
                }
            },
            Err(e) => {
                debug!("Dropping unparseable geolocation payload: {}", e);
                None
            }
        }
    }
}

/// Holds at most one unread payload. A newer post replaces an unread one.
#[derive(Debug, Clone, Default)]
pub struct LocationMailbox {
    slot: Option<String>,
}

impl LocationMailbox {
    pub fn post(&mut self, raw: impl Into<String>) {
        self.slot = Some(raw.into());
    }

    pub fn take(&mut self) -> Option<String> {
        self.slot.take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
