use osplink_shell::{outln, Shell};

use crate::station::Station;

const LONG_HELP: &str = "\
SYNTAX: board
- shows information about the host the shell runs on
NOTES:
- the application may add lines (bus bridge, firmware, ...)
";

pub fn register(shell: &mut Shell<Station>) -> osplink_shell::Result<usize> {
    shell.register("board", main, "board (host) info", LONG_HELP)
}

fn main(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    if let [_, arg, ..] = args {
        outln!(shell, "ERROR: 'board' has unknown argument ('{arg}')");
        return;
    }
    let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
    outln!(shell, "os   : {}", std::env::consts::OS);
    outln!(shell, "arch : {}", std::env::consts::ARCH);
    outln!(shell, "cpus : {cpus}");
    outln!(shell, "pid  : {}", std::process::id());
    outln!(shell, "bus  : {}", station.transport.name());
    if let Some(extra) = &station.board_extra {
        for line in extra() {
            outln!(shell, "{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::session;

    #[test]
    fn shows_host_and_hook_lines() {
        let (mut sh, mut st, out) = session();
        st.board_extra = Some(Box::new(|| vec!["bridge: simulated".to_string()]));
        sh.add_str(&mut st, "board\n");
        let text = out.take();
        assert!(text.starts_with(&format!("os   : {}\n", std::env::consts::OS)));
        assert!(text.contains("bus  : memory\n"));
        assert!(text.ends_with("bridge: simulated\n>> "));
    }

    #[test]
    fn rejects_arguments() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, "board clk\n");
        assert_eq!(out.take(), "ERROR: 'board' has unknown argument ('clk')\n>> ");
    }
}
