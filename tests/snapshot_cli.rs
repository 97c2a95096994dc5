use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};



const JPEG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46];

async fn run_cli(server: &MockServer, password: &str, output_dir: &Path) -> Output {
	let mut command = Command::new(env!("CARGO_BIN_EXE_dropcam"));
	command
		.env("DROPCAM_USERNAME", "user")
		.env("DROPCAM_PASSWORD", password)
		.env("DROPCAM_API_BASE", server.uri())
		.env("DROPCAM_NEXUS_BASE", server.uri())
		.env_remove("RUST_LOG")
		.arg("--output-dir")
		.arg(output_dir);

	tokio::task::spawn_blocking(move || command.output().unwrap())
		.await
		.unwrap()
}

async fn mount_vendor(server: &MockServer) {
	Mock::given(method("POST"))
		.and(path("/api/login.login"))
		.and(wiremock::matchers::body_json(json!({"username": "user", "password": "secret"})))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"session_token": "tok"}]})))
		.mount(server)
		.await;
	Mock::given(method("POST"))
		.and(path("/api/cameras.get_visible"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"status": 0,
			"items": [
				{"owned": [
					{"uuid": "porch", "title": "Porch", "is_online": true},
					{"uuid": "attic", "title": "Attic", "is_online": false},
				]},
				{"owned": [{"uuid": "yard", "title": "Yard", "is_online": true}]},
			],
		})))
		.mount(server)
		.await;
	Mock::given(method("GET"))
		.and(path("/get_image"))
		.and(query_param("uuid", "porch"))
		.respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG))
		.mount(server)
		.await;
	Mock::given(method("GET"))
		.and(path("/get_image"))
		.and(query_param("uuid", "yard"))
		.respond_with(ResponseTemplate::new(200))
		.mount(server)
		.await;
}

fn saved_files(dir: &Path) -> Vec<String> {
	let mut names: Vec<String> = std::fs::read_dir(dir).unwrap()
		.map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
		.collect();
	names.sort();
	names
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshots_online_cameras_and_skips_the_rest() {
	let server = MockServer::start().await;
	mount_vendor(&server).await;
	let dir = tempfile::tempdir().unwrap();

	let output = run_cli(&server, "secret", dir.path()).await;
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(output.status.success(), "stdout: {}\nstderr: {}", stdout, String::from_utf8_lossy(&output.stderr));

	assert!(stdout.contains("0 'Porch' saving image at time"));
	assert!(stdout.contains("1 'Attic' offline, skipping"));
	assert!(stdout.contains("image unavailable, skipping"));

	let files = saved_files(dir.path());
	assert_eq!(files.len(), 1);
	assert!(files[0].starts_with("dropcam.0.") && files[0].ends_with(".jpg"));
	assert_eq!(std::fs::read(dir.path().join(&files[0])).unwrap(), JPEG);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_login_exits_with_failure() {
	let server = MockServer::start().await;
	mount_vendor(&server).await;
	let dir = tempfile::tempdir().unwrap();

	let output = run_cli(&server, "wrong", dir.path()).await;
	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("Request failed: Not Found"));
	assert!(saved_files(dir.path()).is_empty());
}
