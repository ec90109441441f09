use serde::Serialize;
use serialcall_proto::CommandRegistry;

use crate::cmd::{open_device, InfoArgs};
use crate::exit::{device_error, proto_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    port: String,
    dev_id: u8,
    dev_type: String,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let registry =
        CommandRegistry::with_builtins().map_err(|err| proto_error("session setup failed", err))?;
    let mut device = open_device(&args.port, registry)?;

    let dev_id = device
        .dev_id()
        .map_err(|err| device_error("getDevId failed", err))?;
    let dev_type = device
        .dev_type()
        .map_err(|err| device_error("reading device type failed", err))?;

    let out = InfoOutput {
        port: args.port.port.display().to_string(),
        dev_id,
        dev_type,
    };
    print_record(
        &out,
        &[
            ("port", out.port.clone()),
            ("dev_id", out.dev_id.to_string()),
            ("dev_type", out.dev_type.clone()),
        ],
        format,
    );
    Ok(SUCCESS)
}
