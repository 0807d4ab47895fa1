use osplink::shell::{Shell, ShellConfig};
use osplink::variants::VariantRegistry;
use tracing::debug;

use crate::cmd::{build_station, open_transport, register_commands, Globals, RunArgs};
use crate::exit::{io_error, CliResult, SUCCESS};

pub fn run(args: RunArgs, globals: &Globals, variants: VariantRegistry) -> CliResult<i32> {
    let script = std::fs::read_to_string(&args.file)
        .map_err(|err| io_error(&args.file.display().to_string(), err))?;
    let transport = open_transport(args.socket.as_deref(), globals.checksum)?;
    let mut station = build_station(variants, transport, &args.script, globals.checksum);

    // no prompt, no echo: only what the commands print
    let config = ShellConfig {
        prompt: String::new(),
        ..ShellConfig::default()
    };
    let mut shell = Shell::with_config(config, std::io::stdout());
    register_commands(&mut shell)?;
    shell.set_echo(false);

    debug!(file = %args.file.display(), bytes = script.len(), "running command file");
    shell.add_str(&mut station, &script);
    if shell.pending() > 0 {
        shell.add_char(&mut station, b'\n');
    }
    shell.flush();
    Ok(SUCCESS)
}
