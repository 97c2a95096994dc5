use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::camera::Camera;
use crate::common::{CameraGroup, CameraRecord, Envelope, SessionItem};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::rest_api::{read_json, Endpoints, Method, Transport};


/// Decides whether a failed operation should trigger a fresh login and one
/// retry of that operation.
pub type ReauthHook = Arc<dyn Fn(&Error) -> bool + Send + Sync>;


/// A Dropcam account and its session.
///
/// [`login`](Account::login) has to succeed before anything else; the cameras
/// returned by [`list_cameras`](Account::list_cameras) borrow the account and
/// read its session token for each of their requests.
pub struct Account {
	username: String,
	password: String,
	// Written only by login; every other operation reads it.
	session: RwLock<Option<String>>,
	transport: Transport,
	endpoints: Endpoints,
	log_target: String,
	reauth: Option<ReauthHook>,
}

impl Account {
	pub fn new(config: ClientConfig, username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
		Ok(Account {
			username: username.into(),
			password: password.into(),
			session: RwLock::new(None),
			transport: Transport::new(&config)?,
			endpoints: Endpoints::new(&config)?,
			log_target: config.log_target,
			reauth: None,
		})
	}

	/// Creates the account and logs in straight away.
	pub async fn connect(config: ClientConfig, username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
		let account = Account::new(config, username, password)?;
		account.login().await?;
		Ok(account)
	}

	/// Installs a hook consulted whenever an authenticated operation fails.
	/// Without one, failures are returned as-is and nothing is retried.
	pub fn with_reauth_hook<F>(mut self, hook: F) -> Self
	where
		F: Fn(&Error) -> bool + Send + Sync + 'static,
	{
		self.reauth = Some(Arc::new(hook));
		self
	}

	pub fn username(&self) -> &str {
		&self.username
	}

	pub async fn session_token(&self) -> Option<String> {
		self.session.read().await.clone()
	}

	pub async fn is_logged_in(&self) -> bool {
		self.session.read().await.as_deref().is_some_and(|token| !token.is_empty())
	}

	/// Exchanges the credentials for a session token. On failure the
	/// previously stored session, if any, is left untouched.
	pub async fn login(&self) -> Result<()> {
		info!(target: self.log_target(), "Logging in as {}", self.username);
		let params = json!({
			"username": self.username,
			"password": self.password,
		});
		let response = self.transport.request(&self.endpoints.login, &params, None, Method::Post).await?;
		let envelope: Envelope<SessionItem> = read_json(response).await?;

		let token = envelope.into_items()?.into_iter()
			.next()
			.map(|item| item.session_token)
			.filter(|token| !token.is_empty())
			.ok_or_else(|| Error::MalformedResponse("login response has no session token".to_string()))?;

		*self.session.write().await = Some(token);
		debug!(target: self.log_target(), "Session established for {}", self.username);
		Ok(())
	}

	/// Lists every camera owned across the account's camera groups, in the
	/// order the vendor returns them. Duplicates are kept.
	pub async fn list_cameras(&self) -> Result<Vec<Camera<'_>>> {
		let url = &self.endpoints.cameras_get_visible;
		let params = &json!({"group_cameras": true});

		let groups = self.authorized(move |token| async move {
			let response = self.transport.request(url, params, Some(&token), Method::Post).await?;
			let envelope: Envelope<Value> = read_json(response).await?;
			check_vendor_status(envelope)
		}).await?;

		let groups = groups.into_iter()
			.map(serde_json::from_value::<CameraGroup>)
			.collect::<std::result::Result<Vec<_>, _>>()
			.map_err(Error::malformed)?;

		let cameras: Vec<Camera<'_>> = groups.into_iter()
			.flat_map(|group| group.owned)
			.map(|record: CameraRecord| Camera::new(self, record))
			.collect();
		debug!(target: self.log_target(), "Listed {} cameras", cameras.len());
		Ok(cameras)
	}

	pub(crate) fn transport(&self) -> &Transport {
		&self.transport
	}

	pub(crate) fn endpoints(&self) -> &Endpoints {
		&self.endpoints
	}

	pub(crate) fn log_target(&self) -> &str {
		&self.log_target
	}

	/// Runs `operation` with the current session token, logging in again and
	/// retrying once if the re-authentication hook asks for it.
	pub(crate) async fn authorized<T, F, Fut>(&self, operation: F) -> Result<T>
	where
		F: Fn(String) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let token = self.current_token().await?;
		match operation(token).await {
			Err(err) if self.should_reauthenticate(&err) => {
				warn!(target: self.log_target(), "Re-authenticating after error: {}", err);
				self.login().await?;
				let token = self.current_token().await?;
				operation(token).await
			},
			result => result,
		}
	}

	async fn current_token(&self) -> Result<String> {
		match self.session.read().await.as_deref() {
			Some(token) if !token.is_empty() => Ok(token.to_string()),
			_ => Err(Error::NotLoggedIn),
		}
	}

	fn should_reauthenticate(&self, err: &Error) -> bool {
		self.reauth.as_ref().is_some_and(|hook| hook(err))
	}
}

impl fmt::Debug for Account {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Account")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.field("endpoints", &self.endpoints)
			.finish_non_exhaustive()
	}
}


// The status is checked before `items`; error replies often carry none.
fn check_vendor_status<T>(envelope: Envelope<T>) -> Result<Vec<T>> {
	match envelope.status {
		Some(0) => envelope.into_items(),
		Some(status) => Err(Error::Vendor {
			status,
			detail: envelope.status_detail.unwrap_or_default(),
		}),
		None => Err(Error::MalformedResponse("response has no status".to_string())),
	}
}
