//! Request orchestration: form state in, rendered text or status message out.
//!
//! A submission is split into three steps so a host can keep its event loop
//! free while the request is in flight:
//!
//! 1. [`Orchestrator::prepare`] reads the form and the panel and stamps the
//!    request with the next sequence number.
//! 2. [`Orchestrator::dispatch`] (or [`Orchestrator::dispatch_in_background`])
//!    hands it to the transport.
//! 3. [`Orchestrator::resolve`] applies the outcome, but only for the most
//!    recently prepared request; older completions are dropped.
//!
//! [`Orchestrator::submit`] chains the three synchronously and drives the
//! fallback offer through a [`FallbackPrompt`].

use crate::constants::TRANSPORT_FAILURE_MESSAGE;
use crate::constraint::GenerationForm;
use crate::errors::AppError;
use crate::generation::{GenerationRequest, GenerationResult, GenerationTransport, TransportError};
use crate::panel::ParameterPanel;
use crate::presentation::{ClipboardSink, Presentation};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// A prepared request and its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    request: GenerationRequest,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub outcome: Result<GenerationResult, TransportError>,
}

/// The server rejected a request but can serve it without enhanced mode.
/// Consumed by exactly one of `accept` or `decline`.
#[derive(Debug)]
pub struct FallbackOffer {
    message: String,
}

impl FallbackOffer {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn accept(self) -> FallbackDecision {
        FallbackDecision::Accept
    }

    pub fn decline(self) -> FallbackDecision {
        FallbackDecision::Decline
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    Accept,
    Decline,
}

/// Asks the user whether to retry without enhanced mode. Blocks until answered.
pub trait FallbackPrompt {
    fn offer(&mut self, offer: FallbackOffer) -> FallbackDecision;
}

impl<F> FallbackPrompt for F
where
    F: FnMut(FallbackOffer) -> FallbackDecision,
{
    fn offer(&mut self, offer: FallbackOffer) -> FallbackDecision {
        self(offer)
    }
}

#[derive(Debug)]
pub enum Resolution {
    Rendered,
    TransportFailed,
    Rejected(String),
    FallbackOffered(FallbackOffer),
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rendered,
    TransportFailed,
    Rejected(String),
    FallbackDeclined(String),
    InvalidRequest(String),
    Superseded,
}

pub struct Orchestrator {
    transport: Arc<dyn GenerationTransport>,
    latest_seq: u64,
}

impl Orchestrator {
    pub fn new(transport: impl GenerationTransport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<dyn GenerationTransport>) -> Self {
        Self {
            transport,
            latest_seq: 0,
        }
    }

    /// Sequence number of the most recently prepared request (0 before the first).
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Builds the next request. With `basic_only` the panel's enhanced state
    /// is ignored for this request alone.
    pub fn prepare(
        &mut self,
        form: &GenerationForm,
        panel: &ParameterPanel,
        basic_only: bool,
    ) -> Result<Ticket, AppError> {
        let request = if basic_only {
            GenerationRequest::basic(form.count(), form.mode())?
        } else {
            GenerationRequest::new(form.count(), form.mode(), &panel.snapshot())?
        };
        self.latest_seq += 1;
        info!(
            "Request #{}: {} x {} (enhanced: {})",
            self.latest_seq,
            request.count(),
            request.mode(),
            request.use_enhanced()
        );
        Ok(Ticket {
            seq: self.latest_seq,
            request,
        })
    }

    pub fn dispatch(&self, ticket: &Ticket) -> Result<GenerationResult, TransportError> {
        self.transport.fetch(&ticket.request)
    }

    /// Runs the transport on a worker thread and reports through `completions`.
    pub fn dispatch_in_background(
        &self,
        ticket: Ticket,
        completions: Sender<Completion>,
    ) -> JoinHandle<()> {
        let transport = Arc::clone(&self.transport);
        thread::spawn(move || {
            let outcome = transport.fetch(&ticket.request);
            if completions.send(Completion { ticket, outcome }).is_err() {
                debug!("Completion receiver dropped before the request finished");
            }
        })
    }

    pub fn resolve<C: ClipboardSink>(
        &mut self,
        completion: Completion,
        presentation: &mut Presentation<C>,
    ) -> Resolution {
        let Completion { ticket, outcome } = completion;
        if ticket.seq != self.latest_seq {
            debug!(
                "Discarding response to request #{} (latest is #{})",
                ticket.seq, self.latest_seq
            );
            return Resolution::Stale;
        }

        match outcome {
            Err(err) => {
                warn!("Request #{} failed: {}", ticket.seq, err);
                presentation.show_status(TRANSPORT_FAILURE_MESSAGE);
                Resolution::TransportFailed
            }
            Ok(GenerationResult::Success { text, metadata }) => {
                if let Some(at) = metadata.as_ref().and_then(|m| m.generated_at()) {
                    debug!("Request #{} generated at {}", ticket.seq, at);
                }
                presentation.render(&text);
                Resolution::Rendered
            }
            Ok(failure) => {
                let fallback_available = matches!(
                    failure,
                    GenerationResult::Failure {
                        fallback_available: true,
                        ..
                    }
                );
                let message = failure.status_text().unwrap_or_default();
                warn!("Request #{} rejected: {}", ticket.seq, message);
                presentation.show_status(message.clone());
                if fallback_available {
                    Resolution::FallbackOffered(FallbackOffer { message })
                } else {
                    Resolution::Rejected(message)
                }
            }
        }
    }

    pub fn submit<C, P>(
        &mut self,
        form: &GenerationForm,
        panel: &ParameterPanel,
        presentation: &mut Presentation<C>,
        prompt: &mut P,
    ) -> SubmitOutcome
    where
        C: ClipboardSink,
        P: FallbackPrompt + ?Sized,
    {
        let mut basic_only = false;
        loop {
            let ticket = match self.prepare(form, panel, basic_only) {
                Ok(ticket) => ticket,
                Err(err) => {
                    warn!("Refusing to submit: {}", err);
                    presentation.show_status(err.message());
                    return SubmitOutcome::InvalidRequest(err.message().to_string());
                }
            };
            let outcome = self.dispatch(&ticket);

            match self.resolve(Completion { ticket, outcome }, presentation) {
                Resolution::Rendered => return SubmitOutcome::Rendered,
                Resolution::TransportFailed => return SubmitOutcome::TransportFailed,
                Resolution::Rejected(message) => return SubmitOutcome::Rejected(message),
                Resolution::Stale => return SubmitOutcome::Superseded,
                Resolution::FallbackOffered(offer) => {
                    let message = offer.message().to_string();
                    match prompt.offer(offer) {
                        FallbackDecision::Accept => {
                            info!("Fallback accepted; retrying without enhanced mode");
                            basic_only = true;
                        }
                        FallbackDecision::Decline => {
                            info!("Fallback declined");
                            return SubmitOutcome::FallbackDeclined(message);
                        }
                    }
                }
            }
        }
    }
}
