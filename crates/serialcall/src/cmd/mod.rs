use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use serialcall_device::{Device, RegisterMap};
use serialcall_proto::{CommandRegistry, RegistryConfig};
use serialcall_wire::Value;

use crate::exit::{device_error, proto_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod call;
pub mod commands;
pub mod decode;
pub mod encode;
pub mod info;
pub mod read;
pub mod version;
pub mod write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered commands.
    Commands(CommandsArgs),
    /// Print the request packet for a call without sending it.
    Encode(EncodeArgs),
    /// Decode reply bytes for a command.
    Decode(DecodeArgs),
    /// Call a command on the device and print its return value.
    Call(CallArgs),
    /// Read a register.
    Read(ReadArgs),
    /// Write a register.
    Write(WriteArgs),
    /// Print the device id and type string.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Commands(args) => commands::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Call(args) => call::run(args, format),
        Command::Read(args) => read::run(args, format),
        Command::Write(args) => write::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where command definitions come from.
#[derive(Args, Debug, Default)]
pub struct RegistryArgs {
    /// Prototype list file, one `<id> <prototype>` per line.
    #[arg(long, value_name = "FILE", env = "SERIALCALL_PROTOTYPES")]
    pub prototypes: Option<PathBuf>,
    /// Do not register the built-in command table.
    #[arg(long)]
    pub no_builtins: bool,
}

/// How to reach the device.
#[derive(Args, Debug)]
pub struct PortArgs {
    /// Serial device path; line settings must already be configured.
    #[arg(long, short = 'p', value_name = "PATH", env = "SERIALCALL_PORT")]
    pub port: PathBuf,
    /// Reply timeout (e.g. 500ms, 2s).
    #[arg(long, default_value = "500ms")]
    pub timeout: String,
    /// Register map as a JSON object of name to address.
    #[arg(long, value_name = "FILE", env = "SERIALCALL_REGISTERS")]
    pub registers: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CommandsArgs {
    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command name.
    pub name: String,
    /// Arguments (decimal, 0x hex, floats, true/false).
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<String>,
    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Command name.
    pub name: String,
    /// Reply bytes in hex (e.g. "34 01" or 0x34,0x01).
    pub bytes: String,
    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Command name.
    pub name: String,
    /// Arguments (decimal, 0x hex, floats, true/false).
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<String>,
    #[command(flatten)]
    pub port: PortArgs,
    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Register name.
    pub register: String,
    #[command(flatten)]
    pub port: PortArgs,
    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Register name.
    pub register: String,
    /// Byte value to store.
    pub value: String,
    #[command(flatten)]
    pub port: PortArgs,
    #[command(flatten)]
    pub registry: RegistryArgs,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub port: PortArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Build the session registry: built-ins first, then the prototype file.
pub fn build_registry(args: &RegistryArgs) -> CliResult<CommandRegistry> {
    let mut registry = CommandRegistry::with_config(RegistryConfig::default());
    if !args.no_builtins {
        registry
            .load_builtins()
            .map_err(|err| proto_error("loading built-in commands failed", err))?;
    }
    if let Some(path) = &args.prototypes {
        registry
            .load_file(path)
            .map_err(|err| proto_error(&format!("loading {} failed", path.display()), err))?;
    }
    Ok(registry)
}

pub fn load_registers(args: &PortArgs) -> CliResult<RegisterMap> {
    match &args.registers {
        Some(path) => RegisterMap::from_json_file(path)
            .map_err(|err| device_error(&format!("loading {} failed", path.display()), err)),
        None => Ok(RegisterMap::new()),
    }
}

pub fn parse_values(args: &[String]) -> CliResult<Vec<Value>> {
    args.iter()
        .map(|arg| {
            arg.parse::<Value>()
                .map_err(|err| CliError::new(USAGE, format!("argument {arg:?}: {err}")))
        })
        .collect()
}

/// Open the device session. Built-ins are already in `registry` unless
/// disabled, so none are added here.
#[cfg(unix)]
pub fn open_device(
    port: &PortArgs,
    registry: CommandRegistry,
) -> CliResult<Device<impl serialcall_transport::Transport>> {
    use serialcall_device::DeviceConfig;
    use serialcall_transport::{PortConfig, TtyPort};

    use crate::exit::transport_error;

    let timeout = parse_duration(&port.timeout)?;
    let registers = load_registers(port)?;
    let config = PortConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
    };
    let transport = TtyPort::open_transport(&port.port, config)
        .map_err(|err| transport_error(&format!("opening {} failed", port.port.display()), err))?;

    let device_config = DeviceConfig {
        load_builtins: false,
        ..DeviceConfig::default()
    };
    Device::with_config(transport, registry, registers, device_config)
        .map_err(|err| device_error("session setup failed", err))
}

#[cfg(not(unix))]
pub fn open_device(
    _port: &PortArgs,
    _registry: CommandRegistry,
) -> CliResult<Device<serialcall_transport::MemoryTransport>> {
    Err(CliError::new(
        crate::exit::TRANSPORT_ERROR,
        "serial devices are only supported on unix",
    ))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
