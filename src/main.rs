use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Utc;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{error, warn};

use dropcam::config::{API_BASE, NEXUS_BASE};
use dropcam::{Account, ClientConfig, Error, DEFAULT_IMAGE_WIDTH};



const SECONDS_PER_DAY: i64 = 60 * 60 * 24;
const DEFAULT_DAYS_AGO: i64 = 7;

struct Settings {
	username: String,
	password: String,
	config: ClientConfig,
	width: u32,
	days_ago: i64,
	output_dir: PathBuf,
}

impl Settings {
	fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
		let username = matches.get_one::<String>("username")
			.ok_or_else(|| anyhow::anyhow!("no username given"))?;
		let password = matches.get_one::<String>("password")
			.ok_or_else(|| anyhow::anyhow!("no password given"))?;

		let mut config = ClientConfig::default();
		if let Some(base) = matches.get_one::<String>("api-base") {
			config = config.with_api_base(base);
		}
		if let Some(base) = matches.get_one::<String>("nexus-base") {
			config = config.with_nexus_base(base);
		}
		if let Some(seconds) = matches.get_one::<u64>("timeout") {
			config = config.with_timeout(Duration::from_secs(*seconds));
		}

		Ok(Settings {
			username: username.clone(),
			password: password.clone(),
			config,
			width: matches.get_one::<u32>("width").copied().unwrap_or(DEFAULT_IMAGE_WIDTH),
			days_ago: matches.get_one::<i64>("days-ago").copied().unwrap_or(DEFAULT_DAYS_AGO),
			output_dir: matches.get_one::<PathBuf>("output-dir").cloned().unwrap_or_else(|| PathBuf::from(".")),
		})
	}
}


fn cli() -> Command {
	Command::new("dropcam")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Saves a snapshot from every online Dropcam camera on an account.")
		.arg(
			Arg::new("username")
				.short('u')
				.long("username")
				.env("DROPCAM_USERNAME")
				.required(true)
				.help("Dropcam account username")
		)
		.arg(
			Arg::new("password")
				.short('p')
				.long("password")
				.env("DROPCAM_PASSWORD")
				.hide_env_values(true)
				.required(true)
				.help("Dropcam account password")
		)
		.arg(
			Arg::new("api-base")
				.long("api-base")
				.env("DROPCAM_API_BASE")
				.default_value(API_BASE)
				.help("Base URL of the account API")
		)
		.arg(
			Arg::new("nexus-base")
				.long("nexus-base")
				.env("DROPCAM_NEXUS_BASE")
				.default_value(NEXUS_BASE)
				.help("Base URL of the image and event API")
		)
		.arg(
			Arg::new("timeout")
				.long("timeout")
				.env("DROPCAM_TIMEOUT")
				.value_parser(value_parser!(u64))
				.help("Request timeout in seconds (default: wait indefinitely)")
		)
		.arg(
			Arg::new("width")
				.short('w')
				.long("width")
				.value_parser(value_parser!(u32))
				.help("Image width in pixels [default: 720]")
		)
		.arg(
			Arg::new("days-ago")
				.long("days-ago")
				.value_parser(value_parser!(i64))
				.help("How many days back the snapshot is taken from [default: 7]")
		)
		.arg(
			Arg::new("output-dir")
				.short('o')
				.long("output-dir")
				.value_parser(value_parser!(PathBuf))
				.help("Directory the images are written to [default: current directory]")
		)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.action(ArgAction::SetTrue)
				.help("Log every request")
		)
}

fn init_logging(verbose: bool) {
	use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

	let filter = if verbose {
		EnvFilter::new("dropcam=debug,info")
	} else {
		EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new("dropcam=info,warn"))
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
		.init();
}


async fn run(settings: &Settings) -> dropcam::Result<()> {
	let account = Account::connect(settings.config.clone(), settings.username.as_str(), settings.password.as_str()).await?;

	for (index, camera) in account.list_cameras().await?.iter().enumerate() {
		print!("{} '{}' ", index, camera.title());
		if !camera.is_online() {
			println!("offline, skipping");
			continue;
		}

		let seconds = Utc::now().timestamp() - settings.days_ago * SECONDS_PER_DAY;
		println!("saving image at time {}", seconds);
		let path = settings.output_dir.join(format!("dropcam.{}.{}.jpg", index, seconds));

		match camera.save_image(&path, settings.width, Some(seconds)).await {
			Ok(()) => {},
			// An offline or idle camera is expected; move on to the next one.
			Err(Error::Unavailable) => {
				warn!("No image from camera {} at {}", camera.uuid(), seconds);
				println!("image unavailable, skipping");
			},
			Err(err) => return Err(err),
		}
	}

	Ok(())
}

fn report(err: &Error) {
	error!("{}", err);
	match err {
		Error::Transport { reason } => eprintln!("Request failed: {}", reason),
		Error::Vendor { status, detail } => eprintln!("Dropcam returned status {}: {}", status, detail),
		Error::MalformedResponse(detail) => eprintln!("Unexpected response from Dropcam: {}", detail),
		Error::Unavailable => eprintln!("{}", err),
		Error::NotLoggedIn => eprintln!("Not logged in to Dropcam"),
		Error::InvalidUrl(parse_err) => eprintln!("Invalid endpoint URL: {}", parse_err),
		Error::Io(io_err) => eprintln!("Could not write image: {}", io_err),
	}
}


#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
	let matches = cli().get_matches();
	init_logging(matches.get_flag("verbose"));

	let settings = Settings::from_matches(&matches)?;
	match run(&settings).await {
		Ok(()) => anyhow::Ok(ExitCode::SUCCESS),
		Err(err) => {
			report(&err);
			anyhow::Ok(ExitCode::FAILURE)
		},
	}
}
