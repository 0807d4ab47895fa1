use osplink_shell::{is_prefix, out, outln, Shell};
use tracing::warn;

use crate::station::{Recording, Station, MAX_EXEC_DEPTH};
use crate::store::{MAX_SCRIPT_SIZE, SCRIPT_NAME};

const LONG_HELP: &str = "\
SYNTAX: file show
- shows the content of the file (prints to console)
SYNTAX: file exec
- feeds the content of the file to the command interpreter (executes it)
SYNTAX: file record
- prompt changes and <line>s are entered (each terminated by CR)
- every <line> is written to the file
- an empty <line> stops recording and commits content to file
NOTES:
- there is only one file (boot.cmd); it is run on startup
- can make it empty with 'file record', then empty line
";

pub fn register(shell: &mut Shell<Station>) -> osplink_shell::Result<usize> {
    shell.register(
        "file",
        main,
        "manages the file 'boot.cmd' with commands run at startup",
        LONG_HELP,
    )
}

fn main(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let sub = match args {
        [_] => {
            outln!(shell, "ERROR: 'file' needs argument");
            return;
        }
        [_, sub] => *sub,
        _ => {
            outln!(shell, "ERROR: 'file' has too many args");
            return;
        }
    };

    if is_prefix("show", sub) {
        match station.load_script() {
            Some(script) => {
                outln!(shell, "file: '{SCRIPT_NAME}' content:");
                out!(shell, "{script}");
            }
            None => outln!(shell, "file: '{SCRIPT_NAME}' empty"),
        }
    } else if is_prefix("exec", sub) {
        match station.load_script() {
            Some(_) if station.exec_depth >= MAX_EXEC_DEPTH => {
                outln!(shell, "ERROR: 'file exec' nested too deep (max {MAX_EXEC_DEPTH})");
            }
            Some(script) => {
                outln!(shell, "file: executing '{SCRIPT_NAME}'");
                exec_script(shell, station, &script);
            }
            None => outln!(shell, "file: '{SCRIPT_NAME}' empty"),
        }
    } else if is_prefix("record", sub) {
        station.recording = Some(Recording::default());
        set_record_prompt(shell, 1);
        shell.set_streaming(record_line);
    } else {
        outln!(
            shell,
            "ERROR: 'file' expects 'show', 'exec', or 'record', not '{sub}'"
        );
    }
}

/// Feed `script` to the engine as if it were typed.
pub(crate) fn exec_script(shell: &mut Shell<Station>, station: &mut Station, script: &str) {
    if station.exec_depth >= MAX_EXEC_DEPTH {
        warn!(depth = station.exec_depth, "script nesting limit reached");
        return;
    }
    station.exec_depth += 1;
    shell.prompt();
    shell.add_str(station, script);
    if shell.pending() > 0 {
        shell.add_char(station, b'\n');
    }
    outln!(shell);
    station.exec_depth -= 1;
}

fn set_record_prompt(shell: &mut Shell<Station>, line: usize) {
    shell.set_stream_prompt(&format!("{line:03}>> "));
}

fn record_line(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    let Some(recording) = station.recording.as_mut() else {
        shell.clear_streaming();
        return;
    };

    if args.is_empty() {
        let script = std::mem::take(&mut recording.script);
        station.recording = None;
        shell.clear_streaming();
        match station.store.save(&script) {
            Ok(()) => outln!(shell, "file: {} bytes written", script.len()),
            Err(err) => {
                warn!(error = %err, "saving script failed");
                outln!(shell, "ERROR: save failed ({err})");
            }
        }
        return;
    }

    let line = args.join(" ");
    // one byte stays reserved for the checksum
    if recording.script.len() + line.len() + 1 >= MAX_SCRIPT_SIZE {
        station.recording = None;
        shell.clear_streaming();
        outln!(shell, "ERROR: file too long");
        return;
    }
    recording.script.push_str(&line);
    recording.script.push('\n');
    recording.lines += 1;
    let next = recording.lines + 1;
    set_record_prompt(shell, next);
}

#[cfg(test)]
mod tests {
    use crate::store::ScriptStore;
    use crate::testing::session;

    #[test]
    fn records_and_shows_a_script() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, "file record\n");
        assert_eq!(out.take(), "001>> ");
        assert!(st.is_recording());

        sh.add_str(&mut st, "echo   one // first\n@echo two\n\n");
        assert_eq!(out.take(), "002>> 003>> file: 19 bytes written\n>> ");
        assert!(!sh.is_streaming());
        assert!(!st.is_recording());
        assert_eq!(st.store.load().unwrap().as_deref(), Some("echo one\n@echo two\n"));

        sh.add_str(&mut st, "file show\n");
        assert_eq!(
            out.take(),
            "file: 'boot.cmd' content:\necho one\n@echo two\n>> "
        );
    }

    #[test]
    fn exec_feeds_the_engine() {
        let (mut sh, mut st, out) = session();
        st.store.save("echo one\necho two").unwrap();
        sh.add_str(&mut st, "file exec\n");
        assert_eq!(
            out.take(),
            "file: executing 'boot.cmd'\n>> one\n>> two\n>> \n>> "
        );
    }

    #[test]
    fn exec_nesting_is_bounded() {
        let (mut sh, mut st, out) = session();
        st.store.save("file exec\n").unwrap();
        sh.add_str(&mut st, "file exec\n");
        let text = out.take();
        assert_eq!(text.matches("file: executing").count(), 4);
        assert_eq!(text.matches("ERROR: 'file exec' nested too deep (max 4)").count(), 1);
        assert_eq!(st.exec_depth, 0);
    }

    #[test]
    fn empty_and_bad_arguments() {
        let (mut sh, mut st, out) = session();
        sh.add_str(&mut st, "file show\nfile exec\nfile\nfile a b\nfile zap\n");
        assert_eq!(
            out.take(),
            "file: 'boot.cmd' empty\n>> file: 'boot.cmd' empty\n>> \
             ERROR: 'file' needs argument\n>> ERROR: 'file' has too many args\n>> \
             ERROR: 'file' expects 'show', 'exec', or 'record', not 'zap'\n>> "
        );
    }

    #[test]
    fn overlong_recording_is_aborted() {
        let (mut sh, mut st, out) = session();
        st.store.save("echo kept\n").unwrap();
        sh.add_str(&mut st, "file record\n");
        let line = format!("echo {}\n", "x".repeat(100));
        for _ in 0..20 {
            sh.add_str(&mut st, &line);
        }
        let text = out.take();
        assert!(text.contains("ERROR: file too long\n"));
        assert!(!sh.is_streaming());
        assert_eq!(st.store.load().unwrap().as_deref(), Some("echo kept\n"));
    }
}
