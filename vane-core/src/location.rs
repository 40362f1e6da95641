//! Device location: permission handling and single-shot position fixes.
//!
//! The OS-specific part lives behind [`LocationBackend`]. A backend reports
//! what the platform tells it by calling back into [`LocationSource`], which
//! turns those callbacks into [`LocationEvent`]s on a channel.

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::mpsc;

use crate::{
    error::LocationError,
    model::{AuthorizationState, Coordinates},
};

#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    AuthorizationChanged(AuthorizationState),
    PositionUpdated(Coordinates),
    Failed(LocationError),
}

/// Platform glue. Implementations report outcomes through the
/// `LocationSource` they are handed, possibly later and from another thread.
pub trait LocationBackend: Send + Sync + Debug {
    fn authorization_status(&self) -> AuthorizationState;

    /// Show the permission prompt. The answer arrives via
    /// [`LocationSource::authorization_changed`].
    fn request_authorization(&self, source: &LocationSource);

    /// Begin delivering fixes via [`LocationSource::position_received`].
    fn start_updates(&self, source: &LocationSource);

    fn stop_updates(&self);
}

#[derive(Debug)]
struct Inner {
    backend: Arc<dyn LocationBackend>,
    events: mpsc::UnboundedSender<LocationEvent>,
    /// Set while waiting for the one fix this authorization will act on.
    armed: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct LocationSource {
    inner: Arc<Inner>,
}

impl LocationSource {
    pub fn new(
        backend: Arc<dyn LocationBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<LocationEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let inner = Inner { backend, events, armed: AtomicBool::new(false) };
        (Self { inner: Arc::new(inner) }, rx)
    }

    /// Prompt for permission if the platform has not decided yet, otherwise
    /// replay the current status. Calling this again after a failure is how
    /// location is retried.
    pub fn request_authorization(&self) {
        match self.inner.backend.authorization_status() {
            AuthorizationState::Undetermined => self.inner.backend.request_authorization(self),
            status => self.authorization_changed(status),
        }
    }

    pub fn authorization_changed(&self, state: AuthorizationState) {
        tracing::debug!(?state, "Location authorization changed");
        self.emit(LocationEvent::AuthorizationChanged(state));

        match state {
            AuthorizationState::Undetermined => self.inner.backend.request_authorization(self),
            AuthorizationState::Denied => {
                self.disarm();
                self.emit(LocationEvent::Failed(LocationError::PermissionDenied));
            }
            AuthorizationState::Authorized => {
                self.inner.armed.store(true, Ordering::SeqCst);
                self.inner.backend.start_updates(self);
            }
        }
    }

    /// Forward the first fix after updates were started and stop updates.
    /// Later fixes are dropped until updates are started again.
    pub fn position_received(&self, coordinates: Coordinates) {
        if !self.inner.armed.swap(false, Ordering::SeqCst) {
            tracing::trace!(?coordinates, "Ignoring position fix while not armed");
            return;
        }
        self.inner.backend.stop_updates();
        self.emit(LocationEvent::PositionUpdated(coordinates));
    }

    /// Terminal for the current request; nothing is retried automatically.
    pub fn failed(&self, error: LocationError) {
        tracing::warn!(%error, "Location request failed");
        self.disarm();
        self.emit(LocationEvent::Failed(error));
    }

    fn disarm(&self) {
        if self.inner.armed.swap(false, Ordering::SeqCst) {
            self.inner.backend.stop_updates();
        }
    }

    fn emit(&self, event: LocationEvent) {
        if self.inner.events.send(event).is_err() {
            tracing::debug!("Location event dropped; no subscriber");
        }
    }
}

/// Backend for hosts without a location service: a fixed position from
/// configuration, or a permanent denial when none is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    position: Option<Coordinates>,
}

impl StaticBackend {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

impl LocationBackend for StaticBackend {
    fn authorization_status(&self) -> AuthorizationState {
        if self.position.is_some() {
            AuthorizationState::Authorized
        } else {
            AuthorizationState::Denied
        }
    }

    fn request_authorization(&self, source: &LocationSource) {
        source.authorization_changed(self.authorization_status());
    }

    fn start_updates(&self, source: &LocationSource) {
        match self.position {
            Some(position) => source.position_received(position),
            None => source.failed(LocationError::Unavailable("no position configured".into())),
        }
    }

    fn stop_updates(&self) {}
}
