//! Search form handler.
//!
//! The form is modelled as an explicit [`FormView`] value. Each transition is
//! a pure function of the title and the lookup outcome; [`FormHandler`]
//! sequences them around a single call to a [`SearchApi`].

pub mod api;

use tracing::warn;

use crate::modules::availability::models::AvailabilityStatus;
pub use api::{ClientFetchError, HttpSearchApi, LookupReply, SearchApi};

pub const SUBMIT_LABEL: &str = "Search";
pub const BUSY_LABEL: &str = "Searching...";

/// Visual class of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub tone: Tone,
}

impl StatusMessage {
    fn new(text: String, tone: Tone) -> Self {
        Self { text, tone }
    }
}

/// Everything the form renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    /// Spinner visible
    pub busy: bool,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub message: Option<StatusMessage>,
    /// Catalog URL offered to the user; only shown on success
    pub link: Option<String>,
}

impl FormView {
    /// Initial state: nothing shown, submit enabled.
    pub fn idle() -> Self {
        Self {
            busy: false,
            submit_enabled: true,
            submit_label: SUBMIT_LABEL,
            message: None,
            link: None,
        }
    }

    /// Request in flight: prior result cleared, submit disabled.
    pub fn busy() -> Self {
        Self {
            busy: true,
            submit_enabled: false,
            submit_label: BUSY_LABEL,
            message: None,
            link: None,
        }
    }

    /// Terminal state after a lookup, successful or not.
    pub fn settled(title: &str, outcome: &Result<LookupReply, ClientFetchError>) -> Self {
        let (message, link) = match outcome {
            Ok(reply) => (
                status_message(title, AvailabilityStatus::from_label(&reply.status)),
                Some(reply.search_url.clone()),
            ),
            Err(err) => (
                StatusMessage::new(format!("Error: {err}"), Tone::Error),
                None,
            ),
        };

        Self {
            message: Some(message),
            link,
            ..Self::idle()
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(&self.message, Some(message) if message.tone == Tone::Error)
    }
}

impl Default for FormView {
    fn default() -> Self {
        Self::idle()
    }
}

fn status_message(title: &str, status: Option<AvailabilityStatus>) -> StatusMessage {
    match status {
        Some(AvailabilityStatus::Available) => {
            StatusMessage::new(format!("\"{title}\" is likely AVAILABLE!"), Tone::Success)
        }
        Some(AvailabilityStatus::CheckedOut) => {
            StatusMessage::new(format!("\"{title}\" is likely CHECKED OUT."), Tone::Warning)
        }
        Some(AvailabilityStatus::NotFound) | None => StatusMessage::new(
            format!("\"{title}\" was not found or is unavailable."),
            Tone::Error,
        ),
    }
}

/// Trim raw input; `None` means nothing should be submitted.
pub fn prepare_title(input: &str) -> Option<&str> {
    let title = input.trim();
    (!title.is_empty()).then_some(title)
}

/// Drives one submit interaction against a [`SearchApi`].
pub struct FormHandler<A> {
    api: A,
}

impl<A: SearchApi> FormHandler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Handle a submit of `input`, calling `render` on every view change.
    ///
    /// Returns the settled view, or `None` when the trimmed input is empty
    /// and no request was made.
    pub async fn submit<R>(&self, input: &str, mut render: R) -> Option<FormView>
    where
        R: FnMut(&FormView),
    {
        let title = prepare_title(input)?;

        render(&FormView::busy());

        let outcome = self.api.search(title).await;
        if let Err(err) = &outcome {
            warn!(title, error = %err, "lookup failed");
        }

        let view = FormView::settled(title, &outcome);
        render(&view);
        Some(view)
    }
}
