use thiserror::Error;

/// Failure classes of the daily pipeline.
///
/// No variant is fatal to the process, each stage catches its own failure and
/// substitutes a visible placeholder, except [`AgentError::MissingCredentials`]
/// which short-circuits the run before any network call.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The provider returned no usable series for the instrument.
    #[error("no data available for {0}")]
    DataUnavailable(String),

    /// Non-2xx or malformed response from the text-generation call.
    #[error("narrative service error: {0}")]
    NarrativeServiceError(String),

    /// The chat API rejected the message.
    #[error("delivery error: {0}")]
    DeliveryError(String),

    /// Delivery credentials are absent, nothing can be notified.
    #[error("cannot notify: {0}")]
    MissingCredentials(String),
}
