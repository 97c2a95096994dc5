//! Error kinds surfaced by the Dropcam client.

pub type Result<T> = std::result::Result<T, Error>;


#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Non-2xx response or a failure inside the HTTP stack. Carries the
	/// reason phrase only.
	#[error("Transport error: {reason}")]
	Transport { reason: String },

	/// A 2xx response whose payload reports a non-zero vendor status.
	#[error("Vendor error {status}: {detail}")]
	Vendor { status: i64, detail: String },

	/// The payload did not have the expected shape.
	#[error("Malformed response: {0}")]
	MalformedResponse(String),

	/// The vendor answered without an image, usually because the camera is
	/// off or the requested frame does not exist.
	#[error("Camera image is not available or camera is turned off")]
	Unavailable,

	#[error("Not logged in")]
	NotLoggedIn,

	#[error("Invalid endpoint URL: {0}")]
	InvalidUrl(#[from] url::ParseError),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	pub(crate) fn transport(err: reqwest::Error) -> Self {
		Error::Transport { reason: err.to_string() }
	}

	pub(crate) fn malformed(err: serde_json::Error) -> Self {
		Error::MalformedResponse(err.to_string())
	}
}
