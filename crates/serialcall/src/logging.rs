use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Overrides `--log-level` with a full filter directive when set.
pub const LOG_ENV: &str = "SERIALCALL_LOG";

const CRATE_TARGETS: [&str; 5] = [
    "serialcall",
    "serialcall_transport",
    "serialcall_wire",
    "serialcall_proto",
    "serialcall_device",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Filter directive applying `level` to the serialcall crates only.
///
/// Other targets stay at `warn`, or at `error` when that is quieter.
pub fn default_filter(level: LogLevel) -> String {
    let other = level.min(LogLevel::Warn).as_str();
    std::iter::once(other.to_string())
        .chain(
            CRATE_TARGETS
                .iter()
                .map(|target| format!("{target}={}", level.as_str())),
        )
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the stderr subscriber. Packet hex dumps appear at `trace`.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(level)));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
