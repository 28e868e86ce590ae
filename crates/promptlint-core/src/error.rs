use thiserror::Error;

/// Failures that abort a lint run. None of these are recovered locally.
#[derive(Debug, Error)]
pub enum LintError {
    /// Credential or endpoint missing; no network attempt was made.
    #[error("{0}")]
    Configuration(String),
    /// The completion service answered with a non-2xx status.
    #[error("API returned error {status}: {body}")]
    Status { status: u16, body: String },
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("error executing request to {endpoint}")]
    Send {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// A payload that had to be JSON was not. `raw` holds the offending text.
    #[error("{context}: {source}\nResponse: {raw}")]
    ResponseFormat {
        context: &'static str,
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LintError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn response_format(
        context: &'static str,
        raw: impl Into<String>,
        source: serde_json::Error,
    ) -> Self {
        Self::ResponseFormat {
            context,
            raw: raw.into(),
            source,
        }
    }
}
