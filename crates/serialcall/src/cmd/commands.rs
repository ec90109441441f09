use crate::cmd::{build_registry, CommandsArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_commands, CommandRow, OutputFormat};

pub fn run(args: CommandsArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = build_registry(&args.registry)?;
    let rows: Vec<CommandRow> = registry.iter().map(CommandRow::from).collect();
    print_commands(&rows, format);
    Ok(SUCCESS)
}
