mod sink;

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use sun_matrix_core::{
    AppConfig, Coordinates, FrameComposer, LightEventProvider, SunMatrixError, SunriseSunsetClient,
    SystemClock, WallClock,
};
use tracing_subscriber::EnvFilter;

use crate::sink::{FrameSink, PpmSink, TerminalSink};

fn main() -> sun_matrix_core::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Run {
            sink,
            output,
            tick_ms,
            max_runtime,
        } => {
            let tick = Duration::from_millis(tick_ms.unwrap_or(config.run.tick_millis));
            let max_runtime = max_runtime.unwrap_or(config.run.max_runtime_seconds);
            let sink: Box<dyn FrameSink> = match sink {
                SinkKind::Terminal => Box::new(TerminalSink::stdout()),
                SinkKind::Ppm => Box::new(PpmSink::new(output)),
            };
            run_live(&config, sink, tick, max_runtime)
        }
        Commands::Render { output, at } => run_render(&config, output, at),
        Commands::Fetch { date } => run_fetch(&config, date),
    }
}

fn run_live(
    config: &AppConfig,
    mut sink: Box<dyn FrameSink>,
    tick: Duration,
    max_runtime_seconds: u64,
) -> sun_matrix_core::Result<()> {
    let clock = SystemClock;
    let client = SunriseSunsetClient::new(&config.provider)?;
    let mut composer = FrameComposer::new(
        config.display.clone(),
        coordinates(config),
        client,
        clock.now(),
    )?;

    let limit = (max_runtime_seconds > 0).then(|| Duration::from_secs(max_runtime_seconds));
    tracing::info!(?tick, ?limit, "starting display loop");

    let started = Instant::now();
    let mut last = None;
    loop {
        let frame = composer.compose_frame(clock.now());
        if last.as_ref() != Some(&frame) {
            sink.present(&frame)?;
            last = Some(frame);
        }

        thread::sleep(tick);

        if limit.is_some_and(|limit| started.elapsed() > limit) {
            tracing::info!("maximum runtime reached, stopping");
            return Ok(());
        }
    }
}

fn run_render(
    config: &AppConfig,
    output: PathBuf,
    at: Option<NaiveTime>,
) -> sun_matrix_core::Result<()> {
    let now = SystemClock.now();
    let wall = at.map(|time| now.date().and_time(time)).unwrap_or(now);
    let client = SunriseSunsetClient::new(&config.provider)?;
    let composer = FrameComposer::new(config.display.clone(), coordinates(config), client, wall)?;

    tracing::info!(%wall, ?output, "rendering single frame");
    PpmSink::new(output).present(&composer.render())
}

fn run_fetch(config: &AppConfig, date: Option<NaiveDate>) -> sun_matrix_core::Result<()> {
    let client = SunriseSunsetClient::new(&config.provider)?;
    let coordinates = coordinates(config);

    let data = match date {
        Some(date) => client.fetch(coordinates, date)?,
        None => client.fetch_today(coordinates)?,
    };
    let data = data.ok_or_else(|| SunMatrixError::MissingData {
        date: date.unwrap_or_else(|| SystemClock.now().date()),
    })?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn load_config(cli: &Cli) -> sun_matrix_core::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(latitude) = cli.lat {
        config.location.latitude = latitude;
    }
    if let Some(longitude) = cli.lon {
        config.location.longitude = longitude;
    }
    Ok(config)
}

fn coordinates(config: &AppConfig) -> Coordinates {
    Coordinates::new(config.location.latitude, config.location.longitude)
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Sun position and light schedule on a 64x32 matrix", long_about = None)]
struct Cli {
    /// JSON configuration file; every section is optional.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Latitude in decimal degrees, overrides the configuration.
    #[arg(long, global = true, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees, overrides the configuration.
    #[arg(long, global = true, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SinkKind {
    Terminal,
    Ppm,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the display until the maximum runtime elapses.
    Run {
        /// Where frames go.
        #[arg(long, value_enum, default_value_t = SinkKind::Terminal)]
        sink: SinkKind,
        /// Output file for the `ppm` sink.
        #[arg(short, long, default_value = "frame.ppm")]
        output: PathBuf,
        /// Sleep between ticks, in milliseconds.
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Stop after this many seconds; 0 runs forever.
        #[arg(long)]
        max_runtime: Option<u64>,
    },
    /// Compose a single frame and save it as a PPM image.
    Render {
        /// Path of the generated image.
        #[arg(short, long, default_value = "frame.ppm")]
        output: PathBuf,
        /// Render as if the clock showed this time today (HH:MM[:SS]).
        #[arg(long)]
        at: Option<NaiveTime>,
    },
    /// Print the light events for a date as JSON.
    Fetch {
        /// Date to query (YYYY-MM-DD), today when omitted.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}
