use serde::Serialize;
use serialcall_wire::Value;

use crate::cmd::{build_registry, open_device, WriteArgs};
use crate::exit::{device_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct WriteOutput<'a> {
    register: &'a str,
    address: u16,
    value: u8,
}

pub fn run(args: WriteArgs, format: OutputFormat) -> CliResult<i32> {
    let value = parse_byte(&args.value)?;
    let registry = build_registry(&args.registry)?;
    let mut device = open_device(&args.port, registry)?;
    let address = device
        .registers()
        .get(&args.register)
        .ok_or_else(|| CliError::new(USAGE, format!("unknown register {:?}", args.register)))?;

    device
        .write(&args.register, value)
        .map_err(|err| device_error(&format!("writing {} failed", args.register), err))?;

    let out = WriteOutput {
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

fn parse_byte(input: &str) -> CliResult<u8> {
    let invalid = || CliError::new(USAGE, format!("register value must be a byte: {input:?}"));
    let value: Value = input.parse().map_err(|_| invalid())?;
    value
        .as_u64()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_byte_accepts_decimal_and_hex() {
        assert_eq!(parse_byte("255").unwrap(), 255);
        assert_eq!(parse_byte("0x20").unwrap(), 0x20);
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("-1").is_err());
        assert!(parse_byte("1.5").is_err());
    }
}
