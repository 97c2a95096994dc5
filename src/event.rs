use serde_json::Value;

use crate::camera::Camera;
use crate::common::Attributes;


/// A cuepoint (motion or sound event) recorded by a camera.
#[derive(Clone)]
#[derive(Debug)]
pub struct Event<'a> {
	camera: &'a Camera<'a>,
	attributes: Attributes,
}

impl<'a> Event<'a> {
	pub(crate) fn new(camera: &'a Camera<'a>, attributes: Attributes) -> Self {
		Event { camera, attributes }
	}

	pub fn camera(&self) -> &'a Camera<'a> {
		self.camera
	}

	pub fn attributes(&self) -> &Attributes {
		&self.attributes
	}

	pub fn attribute(&self, name: &str) -> Option<&Value> {
		self.attributes.get(name)
	}
}
