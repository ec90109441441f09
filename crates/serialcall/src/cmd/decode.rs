use serde::Serialize;
use serialcall_wire::{decode_reply, parse_hex, to_hex};

use crate::cmd::{build_registry, DecodeArgs};
use crate::exit::{proto_error, wire_error, CliResult, SUCCESS};
use crate::output::{print_record, value_json, value_text, OutputFormat};

#[derive(Serialize)]
struct DecodeOutput<'a> {
    command: &'a str,
    reply: String,
    value: serde_json::Value,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = build_registry(&args.registry)?;
    let descriptor = registry
        .lookup(&args.name)
        .map_err(|err| proto_error("decode failed", err))?;
    let bytes = parse_hex(&args.bytes).map_err(|err| wire_error("decode failed", err))?;
    let value = decode_reply(descriptor, &bytes).map_err(|err| wire_error("decode failed", err))?;

    let out = DecodeOutput {
        command: descriptor.name(),
        reply: to_hex(&bytes),
        value: value_json(value),
    };
    print_record(
        &out,
        &[
            ("command", descriptor.to_string()),
            ("reply", out.reply.clone()),
            ("value", value_text(value)),
        ],
        format,
    );
    Ok(SUCCESS)
}
