use serde::Serialize;

use crate::cmd::{build_registry, open_device, ReadArgs};
use crate::exit::{device_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct ReadOutput<'a> {
    register: &'a str,
    address: u16,
    value: u8,
}

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = build_registry(&args.registry)?;
    let mut device = open_device(&args.port, registry)?;
    let address = device
        .registers()
        .get(&args.register)
        .ok_or_else(|| CliError::new(USAGE, format!("unknown register {:?}", args.register)))?;

    let value = device
        .read_register(&args.register)
        .map_err(|err| device_error(&format!("reading {} failed", args.register), err))?;

    let out = ReadOutput {
        register: &args.register,
        address,
        value,
    };
    print_record(
        &out,
        &[
            ("register", args.register.clone()),
            ("address", format!("{address:#06x}")),
            ("value", format!("{value:#04x} ({value})")),
        ],
        format,
    );
    Ok(SUCCESS)
}
