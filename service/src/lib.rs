//! Service contains the back-office logic: the session store, the auth gate
//! and the wrappers around the platform REST API.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod gate;
pub mod infra;
pub mod query;

use std::time::Duration;

use smart_default::SmartDefault;
use tokio::sync::broadcast;
use tracing as log;

#[cfg(doc)]
use crate::infra::{Api, Storage};
use crate::domain::session::AuthEvent;

pub use self::{command::Command, gate::AuthGate, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Timeout of gallery uploads, overriding the [`Api`] default.
    #[default(Duration::from_secs(10 * 60))]
    pub upload_timeout: Duration,
}

/// Back-office service.
#[derive(Clone, Debug)]
pub struct Service<St, Ap> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Storage`] of the session record.
    storage: St,

    /// [`Api`] client of this [`Service`].
    api: Ap,

    /// Sender of [`AuthEvent`]s to the subscribers within this process.
    events: broadcast::Sender<AuthEvent>,
}

impl<St, Ap> Service<St, Ap> {
    /// Capacity of the [`AuthEvent`]s channel.
    const EVENTS_CAPACITY: usize = 16;

    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, storage: St, api: Ap) -> Self {
        let (events, _) = broadcast::channel(Self::EVENTS_CAPACITY);
        Self {
            config,
            storage,
            api,
            events,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Storage`] of this [`Service`].
    #[must_use]
    pub fn storage(&self) -> &St {
        &self.storage
    }

    /// Returns [`Api`] client of this [`Service`].
    #[must_use]
    pub fn api(&self) -> &Ap {
        &self.api
    }

    /// Subscribes to [`AuthEvent`]s emitted by this [`Service`].
    ///
    /// Events are received in the order the session record was changed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Notifies the subscribers about the provided [`AuthEvent`].
    fn notify(&self, event: AuthEvent) {
        // No subscribers is fine.
        if self.events.send(event).is_err() {
            log::trace!("no subscribers for {event:?}");
        }
    }
}
