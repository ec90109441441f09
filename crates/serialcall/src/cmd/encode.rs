use serde::Serialize;
use serialcall_wire::{encode_request_vec, to_hex};

use crate::cmd::{build_registry, parse_values, EncodeArgs};
use crate::exit::{proto_error, wire_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput<'a> {
    command: &'a str,
    id: u8,
    packet: String,
    bytes: &'a [u8],
    reply_width: usize,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = build_registry(&args.registry)?;
    let descriptor = registry
        .lookup(&args.name)
        .map_err(|err| proto_error("encode failed", err))?;
    let values = parse_values(&args.args)?;
    let packet = encode_request_vec(descriptor, &values)
        .map_err(|err| wire_error("encode failed", err))?;

    let out = EncodeOutput {
        command: descriptor.name(),
        id: descriptor.id(),
        packet: to_hex(&packet),
        bytes: &packet,
        reply_width: descriptor.reply_width(),
    };
    print_record(
        &out,
        &[
            ("command", descriptor.to_string()),
            ("packet", out.packet.clone()),
            ("reply_width", out.reply_width.to_string()),
        ],
        format,
    );
    Ok(SUCCESS)
}
