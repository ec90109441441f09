use serde::Serialize;

use crate::cmd::{build_registry, open_device, parse_values, CallArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_record, value_json, value_text, OutputFormat};

#[derive(Serialize)]
struct CallOutput<'a> {
    command: &'a str,
    value: serde_json::Value,
}

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let values = parse_values(&args.args)?;
    let registry = build_registry(&args.registry)?;
    let mut device = open_device(&args.port, registry)?;

    let value = device
        .call(&args.name, &values)
        .map_err(|err| device_error(&format!("{} failed", args.name), err))?;

    let out = CallOutput {
        command: &args.name,
        value: value_json(value),
    };
    print_record(
        &out,
        &[("command", args.name.clone()), ("value", value_text(value))],
        format,
    );
    Ok(SUCCESS)
}
