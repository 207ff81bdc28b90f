use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use obidome::commands;

fn main() -> Result<()> {
    let matches = Command::new("obidome")
        .version(env!("CARGO_PKG_VERSION"))
        .about("System monitor that lives in the Windows taskbar, next to the tray icons")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Settings file to use (defaults to $OBIDOME_CONFIG or the user config dir)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("run").about("Embed the monitor into the taskbar (default)"))
        .subcommand(
            Command::new("print")
                .about("Print the rendered template in the terminal")
                .arg(
                    Arg::new("once")
                        .long("once")
                        .help("Print a single sample and exit")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Refresh interval in milliseconds (defaults to the configured one)")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("values")
                .about("List metric keys with their current values")
                .arg(
                    Arg::new("keys")
                        .help("Metric keys to show (all known keys if omitted)")
                        .num_args(1..)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the settings file (use 'obidome config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("path").about("Show the settings file location"))
                .subcommand(Command::new("show").about("Show the effective settings"))
                .subcommand(
                    Command::new("init")
                        .about("Write the default settings file")
                        .arg(
                            Arg::new("force")
                                .long("force")
                                .help("Overwrite an existing file")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(Command::new("reset").about("Overwrite the settings file with defaults")),
        )
        .get_matches();

    obidome::init_logging(matches.get_flag("verbose"));

    let config_path = commands::resolve_config_path(&matches)?;

    match matches.subcommand() {
        Some(("print", sub_matches)) => commands::print(sub_matches, &config_path)?,
        Some(("values", sub_matches)) => commands::values(sub_matches, &config_path)?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches, &config_path)?,
        Some(("run", _)) | None => commands::run(&config_path)?,
        Some((other, _)) => anyhow::bail!("Unknown command '{}'", other),
    }

    Ok(())
}
