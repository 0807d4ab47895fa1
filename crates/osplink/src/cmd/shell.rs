use std::io::{IsTerminal, Read};

use osplink::shell::Shell;
use osplink::variants::VariantRegistry;
use tracing::debug;

use crate::cmd::{build_station, open_transport, register_commands, Globals, ShellArgs};
use crate::exit::{io_error, CliResult, SUCCESS};

const READ_CHUNK: usize = 256;

pub fn run(args: ShellArgs, globals: &Globals, variants: VariantRegistry) -> CliResult<i32> {
    let transport = open_transport(args.socket.as_deref(), globals.checksum)?;
    let mut station = build_station(variants, transport, &args.script, globals.checksum);

    let mut shell = Shell::new(std::io::stdout());
    register_commands(&mut shell)?;

    let stdin = std::io::stdin();
    // terminals echo on their own
    shell.set_echo(!args.no_echo && !stdin.is_terminal());

    if !args.no_boot {
        station.boot(&mut shell);
    }
    shell.prompt();

    let mut input = stdin.lock();
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_error("stdin", err)),
        };
        for &ch in &buf[..n] {
            shell.add_char(&mut station, ch);
        }
        shell.flush();
    }

    if shell.pending() > 0 {
        shell.add_char(&mut station, b'\n');
    }
    println!();
    debug!(faults = shell.faults(), "input closed");
    Ok(SUCCESS)
}
