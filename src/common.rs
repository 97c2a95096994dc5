use serde_json::{Map, Value};

use crate::error::{Error, Result};



pub type CameraUuid = String;
/// Vendor-defined fields carried through verbatim.
pub type Attributes = Map<String, Value>;

#[derive(Clone)]
#[derive(Debug)]
#[derive(PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct CameraRecord {
	pub uuid: CameraUuid,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub is_online: bool,
	#[serde(flatten)]
	pub extra: Attributes,
}

/// One group from `cameras.get_visible`.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Deserialize)]
pub struct CameraGroup {
	pub owned: Vec<CameraRecord>,
}

#[derive(Clone)]
#[derive(Debug)]
#[derive(Deserialize)]
pub struct SessionItem {
	pub session_token: String,
}

/// Common shape of the vendor's JSON replies. Error replies may leave out
/// `items`, so it is only required once the status has been looked at.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Deserialize)]
pub struct Envelope<T> {
	pub status: Option<i64>,
	pub status_detail: Option<String>,
	pub items: Option<Vec<T>>,
}

impl<T> Envelope<T> {
	pub fn into_items(self) -> Result<Vec<T>> {
		self.items.ok_or_else(|| Error::MalformedResponse("response has no items".to_string()))
	}
}


#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn camera_record_keeps_unknown_fields() {
		let record: CameraRecord = serde_json::from_value(json!({
			"uuid": "abc123",
			"title": "Porch",
			"is_online": true,
			"timezone": "America/Los_Angeles",
			"capabilities": ["audio", "hd"],
		})).unwrap();

		assert_eq!(record.uuid, "abc123");
		assert_eq!(record.title, "Porch");
		assert!(record.is_online);
		assert_eq!(record.extra.len(), 2);
		assert_eq!(record.extra["timezone"], json!("America/Los_Angeles"));
		assert!(!record.extra.contains_key("uuid"));
	}

	#[test]
	fn camera_record_requires_uuid() {
		let result = serde_json::from_value::<CameraRecord>(json!({"title": "Porch"}));
		assert!(result.is_err());
	}

	#[test]
	fn envelope_status_is_optional() {
		let envelope: Envelope<SessionItem> = serde_json::from_value(json!({
			"items": [{"session_token": "tok"}],
		})).unwrap();
		assert_eq!(envelope.status, None);
		assert_eq!(envelope.into_items().unwrap()[0].session_token, "tok");
	}

	#[test]
	fn envelope_without_items_decodes_but_has_no_items() {
		let envelope: Envelope<SessionItem> = serde_json::from_value(json!({
			"status": 2,
			"items": null,
		})).unwrap();
		assert_eq!(envelope.status, Some(2));
		assert!(matches!(envelope.into_items(), Err(Error::MalformedResponse(_))));
	}
}
