use thiserror::Error;

/// Errors from the advisory text service.
///
/// Callers on the research path never see these: [`crate::Advisor`]
/// implementations map every failure to "no advisory text".
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("advisory service returned status {status}")]
    UnexpectedStatus { status: u16 },

    /// The body did not have the `choices[0].message.content` shape.
    #[error("malformed advisory response: {0}")]
    Malformed(String),

    #[error("invalid advisory base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
