use std::fmt;
use std::path::Path;

use chrono::Utc;
use log::{debug, info};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::account::Account;
use crate::common::{Attributes, CameraRecord, Envelope};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::rest_api::{read_json, Method};


pub const DEFAULT_IMAGE_WIDTH: u32 = 720;


/// One camera from the account's listing.
///
/// Holds the listing record as it was when fetched. Property changes happen
/// on the vendor side only, so re-list the cameras to see them.
#[derive(Clone)]
pub struct Camera<'a> {
	account: &'a Account,
	record: CameraRecord,
}

impl<'a> Camera<'a> {
	pub(crate) fn new(account: &'a Account, record: CameraRecord) -> Self {
		Camera { account, record }
	}

	pub fn account(&self) -> &'a Account {
		self.account
	}

	pub fn uuid(&self) -> &str {
		&self.record.uuid
	}

	pub fn title(&self) -> &str {
		&self.record.title
	}

	pub fn is_online(&self) -> bool {
		self.record.is_online
	}

	pub fn record(&self) -> &CameraRecord {
		&self.record
	}

	pub fn attributes(&self) -> &Attributes {
		&self.record.extra
	}

	pub fn attribute(&self, name: &str) -> Option<&Value> {
		self.record.extra.get(name)
	}

	/// Changes a camera setting on the vendor side. Names and values are not
	/// checked here; known ones include:
	///
	/// - `irled.state`: `auto_on` / `always_on` / `always_off`
	/// - `streaming.enabled`, `streaming.params.hd`: bool
	/// - `audio.enabled`, `statusled.enabled`: bool
	pub async fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<()> {
		let url = self.account.endpoints().properties(self.uuid())?;
		let params = json!({
			"camera_uuid": self.uuid(),
			"name": name,
			"value": value.into(),
		});

		self.send(&url, &params, Method::Post).await?;
		info!(target: self.account.log_target(), "Set {} on camera {}", name, self.uuid());
		Ok(())
	}

	/// Events recorded between two epoch-second timestamps, in vendor order.
	/// `end` defaults to now; `start > end` is sent as-is.
	pub async fn events(&self, start: i64, end: Option<i64>) -> Result<Vec<Event<'_>>> {
		let end = end.unwrap_or_else(|| Utc::now().timestamp());
		let params = json!({
			"uuid": self.uuid(),
			"start_time": start,
			"end_time": end,
		});

		let response = self.send(&self.account.endpoints().get_cuepoint, &params, Method::Get).await?;
		let envelope: Envelope<Attributes> = read_json(response).await?;
		let items = envelope.into_items()?;
		debug!(target: self.account.log_target(), "Camera {} has {} events between {} and {}", self.uuid(), items.len(), start, end);

		Ok(items.into_iter()
			.map(|attributes| Event::new(self, attributes))
			.collect())
	}

	/// Fetches a still image `width` pixels wide, either the latest frame or
	/// the one captured at `seconds`. `Some(0)` counts as no time and also
	/// asks for the latest frame. The body is left unread.
	pub async fn get_image(&self, width: u32, seconds: Option<i64>) -> Result<Response> {
		let mut params = json!({
			"uuid": self.uuid(),
			"width": width,
		});
		if let Some(seconds) = seconds.filter(|seconds| *seconds != 0) {
			params["time"] = json!(seconds);
		}

		let response = self.send(&self.account.endpoints().get_image, &params, Method::Get).await?;
		ensure_content(response)
	}

	/// Writes an image to `path`, replacing any existing file. The write is
	/// not atomic; a failure part way leaves a partial file behind.
	pub async fn save_image(&self, path: impl AsRef<Path>, width: u32, seconds: Option<i64>) -> Result<()> {
		let response = self.get_image(width, seconds).await?;
		write_body(response, path.as_ref()).await?;
		info!(target: self.account.log_target(), "Saved image from camera {} to {}", self.uuid(), path.as_ref().display());
		Ok(())
	}

	/// Fetches the recorded clip covering `start..end` (epoch seconds).
	pub async fn get_event_clip(&self, start: i64, end: i64) -> Result<Response> {
		let params = json!({
			"uuid": self.uuid(),
			"start_time": start,
			"end_time": end,
		});

		let response = self.send(&self.account.endpoints().get_event_clip, &params, Method::Get).await?;
		ensure_content(response)
	}

	pub async fn save_event_clip(&self, path: impl AsRef<Path>, start: i64, end: i64) -> Result<()> {
		let response = self.get_event_clip(start, end).await?;
		write_body(response, path.as_ref()).await
	}

	async fn send(&self, url: &Url, params: &Value, method: Method) -> Result<Response> {
		let transport = self.account.transport();
		self.account.authorized(move |token| async move {
			transport.request(url, params, Some(&token), method).await
		}).await
	}
}

impl fmt::Display for Camera<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<dropcam.Camera '{}'>", self.title())
	}
}

impl fmt::Debug for Camera<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Camera")
			.field("uuid", &self.record.uuid)
			.field("title", &self.record.title)
			.field("is_online", &self.record.is_online)
			.finish_non_exhaustive()
	}
}


// The vendor answers 200 with an empty body when there is no image to send.
fn ensure_content(response: Response) -> Result<Response> {
	let length = response.headers()
		.get(CONTENT_LENGTH)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.trim().parse::<u64>().ok())
		.unwrap_or(0);

	if response.status() != StatusCode::OK || length == 0 {
		return Err(Error::Unavailable);
	}
	Ok(response)
}

async fn write_body(response: Response, path: &Path) -> Result<()> {
	let body = response.bytes().await.map_err(Error::transport)?;
	let file = tokio::fs::File::create(path).await?;
	let mut writer = tokio::io::BufWriter::new(file);
	writer.write_all(&body).await?;
	writer.flush().await?;
	Ok(())
}
