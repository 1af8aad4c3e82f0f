//! Events delivered to the controller by its host.

use std::fmt;

use tokio::sync::oneshot;

use crate::error::NetworkError;
use crate::http::{Request, Response};

/// Sending half of a navigation preload, held by the host
pub type PreloadSender = oneshot::Sender<Result<Response, NetworkError>>;

/// The three signals a controller listens for
#[derive(Debug)]
pub enum LifecycleEvent {
    Install,
    Activate,
    Fetch(FetchEvent),
}

impl LifecycleEvent {
    /// Discriminant used for dispatch and logging
    pub fn kind(&self) -> EventKind {
        match self {
            LifecycleEvent::Install => EventKind::Install,
            LifecycleEvent::Activate => EventKind::Activate,
            LifecycleEvent::Fetch(_) => EventKind::Fetch,
        }
    }
}

/// Kind of a [`LifecycleEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Install => write!(f, "install"),
            EventKind::Activate => write!(f, "activate"),
            EventKind::Fetch => write!(f, "fetch"),
        }
    }
}

/// Fetch event that can be handled by the controller
#[derive(Debug)]
pub struct FetchEvent {
    /// The request being intercepted
    pub request: Request,
    /// Navigation preload already in flight, if any
    preload: Option<oneshot::Receiver<Result<Response, NetworkError>>>,
}

impl FetchEvent {
    /// Create a new fetch event
    pub fn new(request: Request) -> Self {
        Self {
            request,
            preload: None,
        }
    }

    /// Attach a navigation preload. The host completes the returned sender
    /// when the preloaded response (or its failure) is known; dropping it
    /// means no preload was made.
    pub fn with_preload(mut self) -> (Self, PreloadSender) {
        let (tx, rx) = oneshot::channel();
        self.preload = Some(rx);
        (self, tx)
    }

    /// Wait for the preloaded response, if any
    pub(crate) async fn preload_response(&mut self) -> Result<Option<Response>, NetworkError> {
        let Some(rx) = self.preload.take() else {
            return Ok(None);
        };
        match rx.await {
            Ok(Ok(response)) => Ok(Some(response)),
            Ok(Err(err)) => Err(err),
            Err(_) => Ok(None),
        }
    }
}

/// Result of offering a fetch event to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The controller declined; the host fetches the request unmodified
    PassThrough,
    /// The controller answered with this response
    Respond(Response),
}

impl FetchOutcome {
    /// Whether the request was declined
    pub fn is_pass_through(&self) -> bool {
        matches!(self, FetchOutcome::PassThrough)
    }

    /// The response, when the controller answered
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchOutcome::Respond(response) => Some(response),
            FetchOutcome::PassThrough => None,
        }
    }

    /// Consume into the response, when the controller answered
    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchOutcome::Respond(response) => Some(response),
            FetchOutcome::PassThrough => None,
        }
    }
}
