//! HTTP plumbing: endpoint layout, the single-request transport and JSON
//! decoding of vendor replies.

use std::fmt;

use log::{debug, warn};
use reqwest::header::{CONTENT_TYPE, COOKIE, REFERER};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};


/// Cookie the vendor expects the session token under.
pub const SESSION_COOKIE: &str = "website_2";


#[derive(Clone, Copy)]
#[derive(Debug)]
#[derive(PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Method::Get => f.write_str("GET"),
			Method::Post => f.write_str("POST"),
		}
	}
}



#[derive(Clone)]
#[derive(Debug)]
pub struct Endpoints {
	pub login: Url,
	pub cameras_get_visible: Url,
	pub get_image: Url,
	pub get_cuepoint: Url,
	pub get_event_clip: Url,
	properties: Url,
}

impl Endpoints {
	pub fn new(config: &ClientConfig) -> Result<Self> {
		let api = parse_base(&config.api_base)?;
		let nexus = parse_base(&config.nexus_base)?;
		Ok(Endpoints {
			login: api.join("api/login.login")?,
			cameras_get_visible: api.join("api/cameras.get_visible")?,
			properties: api.join("app/cameras/properties/")?,
			get_image: nexus.join("get_image")?,
			get_cuepoint: nexus.join("get_cuepoint")?,
			get_event_clip: nexus.join("get_event_clip")?,
		})
	}

	pub fn properties(&self, uuid: &str) -> Result<Url> {
		Ok(self.properties.join(uuid)?)
	}
}

// Joining replaces the last path segment unless the base ends with a slash.
fn parse_base(base: &str) -> Result<Url> {
	let mut url = Url::parse(base)?;
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());
		url.set_path(&path);
	}
	Ok(url)
}



/// Issues one request per call: no retries, no caching.
#[derive(Clone)]
#[derive(Debug)]
pub struct Transport {
	client: Client,
	referer: String,
	log_target: String,
}

impl Transport {
	pub fn new(config: &ClientConfig) -> Result<Self> {
		let mut builder = Client::builder();
		if let Some(timeout) = config.timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder.build().map_err(Error::transport)?;

		Ok(Transport {
			client,
			referer: config.api_base.clone(),
			log_target: config.log_target.clone(),
		})
	}

	/// Sends `params` as the query string (GET) or JSON body (POST), with the
	/// session cookie when a token is given. Any non-2xx status becomes
	/// [`Error::Transport`] carrying the reason phrase.
	pub async fn request(&self, url: &Url, params: &Value, session_token: Option<&str>, method: Method) -> Result<Response> {
		let mut builder = match method {
			Method::Get => self.client.get(url.clone()),
			Method::Post => self.client.post(url.clone()),
		}
			.header(CONTENT_TYPE, "application/json")
			.header(REFERER, self.referer.as_str());

		if let Some(token) = session_token {
			builder = builder.header(COOKIE, format!("{}={}", SESSION_COOKIE, token));
		}

		builder = match method {
			Method::Get => builder.query(&query_pairs(params)),
			Method::Post => builder.json(params),
		};

		debug!(target: self.log_target.as_str(), "{} {}", method, url);
		let response = builder.send().await.map_err(|err| {
			warn!(target: self.log_target.as_str(), "{} {} failed: {}", method, url, err);
			Error::transport(err)
		})?;

		let status = response.status();
		if !status.is_success() {
			let reason = status.canonical_reason().unwrap_or("Unknown status").to_string();
			warn!(target: self.log_target.as_str(), "{} {} returned {}", method, url, status);
			return Err(Error::Transport { reason });
		}

		Ok(response)
	}
}


/// Flattens a JSON object into query pairs. Strings go through as-is, other
/// values use their JSON text.
pub fn query_pairs(params: &Value) -> Vec<(String, String)> {
	let Some(object) = params.as_object() else {
		return Vec::new();
	};
	object.iter()
		.filter(|(_, value)| !value.is_null())
		.map(|(key, value)| {
			let value = match value {
				Value::String(text) => text.clone(),
				other => other.to_string(),
			};
			(key.clone(), value)
		})
		.collect()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
	let body = response.bytes().await.map_err(Error::transport)?;
	serde_json::from_slice(&body).map_err(Error::malformed)
}
