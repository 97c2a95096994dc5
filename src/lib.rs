//! Unofficial client for the Dropcam cloud camera API.
//!
//! An [`Account`] logs in once and keeps the session token; cameras listed
//! from it borrow the account and reuse that session for every request.
//!
//! ```no_run
//! # async fn snapshot() -> dropcam::Result<()> {
//! use dropcam::{Account, ClientConfig, DEFAULT_IMAGE_WIDTH};
//!
//! let account = Account::connect(ClientConfig::default(), "user@example.com", "secret").await?;
//! for camera in account.list_cameras().await? {
//! 	if camera.is_online() {
//! 		camera.save_image(format!("{}.jpg", camera.uuid()), DEFAULT_IMAGE_WIDTH, None).await?;
//! 	}
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use] extern crate serde_derive;

pub mod account;
pub mod camera;
pub mod common;
pub mod config;
pub mod error;
pub mod event;
pub mod rest_api;

pub use account::{Account, ReauthHook};
pub use camera::{Camera, DEFAULT_IMAGE_WIDTH};
pub use common::{Attributes, CameraRecord, CameraUuid};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use event::Event;
