use std::time::Duration;

use osplink_shell::{is_prefix, is_quiet, outln, parse_dec, Shell};

use crate::station::Station;

const LONG_HELP: &str = "\
SYNTAX: echo [line] <word>...
- prints all words (useful in scripts)
SYNTAX: echo faults [step]
- shows and resets the fault counter (overflows, too many arguments)
- with 'step', steps the counter first
SYNTAX: echo [ enabled | disabled ]
- with argument enables/disables echoing of typed characters
- without argument shows the echo state
SYNTAX: echo wait <time>
- waits <time> ms; the shell does not respond meanwhile
NOTES:
- supports @-prefix to suppress output
- 'echo line' prints an empty line, 'echo line faults' prints 'faults'
";

pub fn register(shell: &mut Shell<Station>) -> osplink_shell::Result<usize> {
    shell.register("echo", main, "echo a message (or en/disables echoing)", LONG_HELP)
}

fn show(shell: &mut Shell<Station>) {
    let state = if shell.echo() { "enabled" } else { "disabled" };
    outln!(shell, "echo: echoing {state}");
}

fn main(shell: &mut Shell<Station>, _: &mut Station, args: &[&str]) {
    let quiet = is_quiet(args);
    match args {
        [_] => show(shell),
        [_, sub] | [_, sub, _] if is_prefix("faults", sub) => {
            if let [_, _, step] = args {
                if !is_prefix("step", step) {
                    outln!(shell, "ERROR: 'faults' may have 'step' (not '{step}')");
                    return;
                }
                shell.step_faults();
            }
            let faults = shell.take_faults();
            if !quiet {
                outln!(shell, "echo: faults: {faults}");
            }
        }
        [_, sub] if is_prefix("enabled", sub) => {
            shell.set_echo(true);
            if !quiet {
                show(shell);
            }
        }
        [_, sub] if is_prefix("disabled", sub) => {
            shell.set_echo(false);
            if !quiet {
                show(shell);
            }
        }
        [_, sub, ms] if is_prefix("wait", sub) => {
            let Some(ms) = parse_dec(ms).and_then(|ms| u64::try_from(ms).ok()) else {
                outln!(shell, "ERROR: wait time");
                return;
            };
            if !quiet {
                outln!(shell, "echo: wait: {ms}");
            }
            shell.flush();
            std::thread::sleep(Duration::from_millis(ms));
        }
        [_, rest @ ..] => {
            let words = match rest {
                [first, words @ ..] if is_prefix("line", first) => words,
                words => words,
            };
            outln!(shell, "{}", words.join(" "));
        }
        [] => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::session;

    #[test]
    fn prints_words() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, "echo hello  world\necho line enabled\necho line\n");
        assert_eq!(out.take(), "hello world\n>> enabled\n>> \n>> ");
    }

    #[test]
    fn toggles_echo() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, "echo enabled\n");
        assert!(sh.echo());
        assert_eq!(out.take(), "echo: echoing enabled\n>> ");
        sh.add_str(&mut st, "@echo dis\n");
        assert!(!sh.echo());
        assert_eq!(out.take(), "@echo dis\n>> ");
        sh.add_str(&mut st, "echo\n");
        assert_eq!(out.take(), "echo: echoing disabled\n>> ");
    }

    #[test]
    fn faults_are_taken_and_stepped() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, &"x".repeat(128));
        sh.add_str(&mut st, "\n");
        out.take();
        sh.add_str(&mut st, "echo faults\necho faults\necho f step\n");
        assert_eq!(
            out.take(),
            "echo: faults: 1\n>> echo: faults: 0\n>> echo: faults: 1\n>> "
        );
    }

    #[test]
    fn wait_needs_a_number() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, "echo wait x\necho wait 1\n");
        assert_eq!(out.take(), "ERROR: wait time\n>> echo: wait: 1\n>> ");
    }
}
