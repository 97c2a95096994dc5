use std::time::Duration;


pub const API_BASE: &str = "https://www.dropcam.com";
pub const NEXUS_BASE: &str = "https://nexusapi.dropcam.com";
pub const DEFAULT_LOG_TARGET: &str = "dropcam";


/// Settings shared by an [`Account`](crate::Account) and its transport.
///
/// The defaults point at the vendor hosts with no request timeout, so a hung
/// connection blocks the caller until the HTTP stack gives up.
#[derive(Clone)]
#[derive(Debug)]
pub struct ClientConfig {
	pub api_base: String,
	pub nexus_base: String,
	pub timeout: Option<Duration>,
	pub log_target: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		ClientConfig {
			api_base: API_BASE.to_string(),
			nexus_base: NEXUS_BASE.to_string(),
			timeout: None,
			log_target: DEFAULT_LOG_TARGET.to_string(),
		}
	}
}

impl ClientConfig {
	pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
		self.api_base = base.into();
		self
	}

	pub fn with_nexus_base(mut self, base: impl Into<String>) -> Self {
		self.nexus_base = base.into();
		self
	}

	/// Points both hosts at the same server; handy for a local stand-in of
	/// the vendor API.
	pub fn with_base(self, base: impl Into<String>) -> Self {
		let base = base.into();
		self.with_api_base(base.clone()).with_nexus_base(base)
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	/// Target attached to every log record the account emits.
	pub fn with_log_target(mut self, target: impl Into<String>) -> Self {
		self.log_target = target.into();
		self
	}
}
