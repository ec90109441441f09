use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serialcall_proto::CommandDescriptor;
use serialcall_wire::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct CommandRow {
    pub id: u8,
    pub name: String,
    pub returns: Option<char>,
    pub args: String,
    pub prototype: String,
}

impl From<&CommandDescriptor> for CommandRow {
    fn from(desc: &CommandDescriptor) -> Self {
        Self {
            id: desc.id(),
            name: desc.name().to_string(),
            returns: desc.return_format().map(|code| code.as_char()),
            args: desc.arg_formats().iter().map(|code| code.as_char()).collect(),
            prototype: desc.to_string(),
        }
    }
}

pub fn print_commands(rows: &[CommandRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "NAME", "RET", "ARGS", "PROTOTYPE"]);
            for row in rows {
                table.add_row(vec![
                    row.id.to_string(),
                    row.name.clone(),
                    row.returns.map_or_else(|| "-".to_string(), String::from),
                    row.args.clone(),
                    row.prototype.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!("{:>3}  {}", row.id, row.prototype);
            }
        }
    }
}

/// Print one result record. `fields` drives the table and pretty views,
/// `record` the JSON view.
pub fn print_record<T: Serialize>(record: &T, fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (name, value) in fields {
                table.add_row(vec![name.to_string(), value.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line = fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{line}");
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// JSON form of a decoded value; `void` and non-finite floats become null.
pub fn value_json(value: Option<Value>) -> serde_json::Value {
    match value {
        None => serde_json::Value::Null,
        Some(Value::Bool(b)) => serde_json::Value::Bool(b),
        Some(Value::Int(v)) => serde_json::Value::from(v),
        Some(Value::UInt(v)) => serde_json::Value::from(v),
        Some(Value::Float(v)) => serde_json::Number::from_f64(v)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
    }
}

pub fn value_text(value: Option<Value>) -> String {
    value.map_or_else(|| "void".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use serialcall_wire::FormatCode;

    use super::*;

    #[test]
    fn command_row_uses_format_tags() {
        let desc = CommandDescriptor::new(
            14,
            "tone",
            None,
            [FormatCode::U8, FormatCode::U16, FormatCode::U32],
        );
        let row = CommandRow::from(&desc);
        assert_eq!(row.returns, None);
        assert_eq!(row.args, "BHI");
        assert_eq!(row.prototype, "void tone(uint8_t, uint16_t, uint32_t)");
    }

    #[test]
    fn values_to_json() {
        assert_eq!(value_json(None), serde_json::Value::Null);
        assert_eq!(value_json(Some(Value::Int(-3))), serde_json::json!(-3));
        assert_eq!(value_json(Some(Value::UInt(308))), serde_json::json!(308));
        assert_eq!(value_json(Some(Value::Float(1.5))), serde_json::json!(1.5));
        assert_eq!(value_json(Some(Value::Float(f64::NAN))), serde_json::Value::Null);
        assert_eq!(value_text(None), "void");
    }
}
