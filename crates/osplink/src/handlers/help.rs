use osplink_shell::{out, outln, Shell};

use crate::station::Station;

const LONG_HELP: &str = "\
SYNTAX: help
- lists all commands
SYNTAX: help <cmd>
- gives detailed help on command <cmd>
NOTES:
- all commands may be shortened, for example 'help' or 'h'
- the interpreter supports backspace and // comments
";

pub fn register(shell: &mut Shell<Station>) -> osplink_shell::Result<usize> {
    shell.register("help", main, "gives help (try 'help help')", LONG_HELP)
}

fn main(shell: &mut Shell<Station>, _: &mut Station, args: &[&str]) {
    match args {
        [_] => {
            let lines: Vec<String> = shell
                .registry()
                .iter()
                .map(|c| format!("{} - {}", c.name, c.short_help))
                .collect();
            outln!(shell, "Available commands");
            for line in lines {
                outln!(shell, "{line}");
            }
        }
        [_, name] => match shell.registry().find(name).map(|c| c.long_help) {
            Some(text) => out!(shell, "{text}"),
            None => outln!(shell, "ERROR: command not found (try 'help')"),
        },
        _ => outln!(shell, "ERROR: too many arguments"),
    }
}
