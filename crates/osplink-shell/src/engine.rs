use std::fmt;
use std::io::Write;

use tracing::{debug, warn};

use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use crate::registry::{CommandDescriptor, CommandRegistry, Handler};
use crate::tokenize::tokenize;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Marker on the command token that asks a handler to suppress confirmations.
pub const QUIET_MARKER: char = '@';

/// Who owns the next line.
pub enum Mode<C> {
    /// Lines are looked up in the command registry.
    Normal,
    /// Every line, empty ones included, goes to this handler.
    Streaming(Handler<C>),
}

impl<C> Clone for Mode<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Mode<C> {}

impl<C> fmt::Debug for Mode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("Normal"),
            Self::Streaming(_) => f.write_str("Streaming"),
        }
    }
}

/// Character-driven command line engine.
///
/// Characters come in one at a time through [`Shell::add_char`]. A complete
/// line is tokenized and dispatched to a registered command, or to the
/// streaming handler when one is installed. Handlers run to completion
/// before the next character is accepted.
pub struct Shell<C> {
    registry: CommandRegistry<C>,
    config: ShellConfig,
    line: Vec<u8>,
    echo: bool,
    mode: Mode<C>,
    stream_prompt: String,
    faults: u32,
    out: Box<dyn Write>,
}

impl<C> Shell<C> {
    /// Create an engine with default limits writing to `out`.
    pub fn new(out: impl Write + 'static) -> Self {
        Self::with_config(ShellConfig::default(), out)
    }

    /// Create an engine with explicit limits.
    pub fn with_config(config: ShellConfig, out: impl Write + 'static) -> Self {
        Self {
            registry: CommandRegistry::with_capacity(config.slots),
            line: Vec::with_capacity(config.buffer_size),
            echo: true,
            mode: Mode::Normal,
            stream_prompt: String::new(),
            faults: 0,
            out: Box::new(out),
            config,
        }
    }

    /// Register a command; failures are also reported to the operator.
    pub fn register(
        &mut self,
        name: &'static str,
        handler: Handler<C>,
        short_help: &'static str,
        long_help: &'static str,
    ) -> Result<usize> {
        let descriptor = CommandDescriptor {
            name,
            handler,
            short_help,
            long_help,
        };
        self.registry.register(descriptor).inspect_err(|err| {
            self.print(format_args!("ERROR: {err}\n"));
        })
    }

    pub fn registry(&self) -> &CommandRegistry<C> {
        &self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Feed one character.
    pub fn add_char(&mut self, ctx: &mut C, ch: u8) {
        match ch {
            b'\n' | b'\r' => {
                if self.echo {
                    self.print(format_args!("\n"));
                }
                self.execute(ctx);
                self.prompt();
            }
            BACKSPACE | DELETE => {
                if self.line.pop().is_some() && self.echo {
                    self.print(format_args!("\x08 \x08"));
                }
            }
            _ if self.line.len() + 1 >= self.config.buffer_size => {
                // overflow marker is shown even with echo off
                self.print(format_args!("_\x08"));
                self.faults += 1;
                warn!(limit = self.config.buffer_size - 1, "command line overflow");
            }
            _ => {
                self.line.push(ch);
                if self.echo {
                    let _ = self.out.write_all(&[ch]);
                }
            }
        }
    }

    /// Feed every byte of `text`.
    pub fn add_str(&mut self, ctx: &mut C, text: &str) {
        for &ch in text.as_bytes() {
            self.add_char(ctx, ch);
        }
    }

    /// Number of characters waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.line.len()
    }

    /// Print the prompt for the current mode.
    pub fn prompt(&mut self) {
        let prompt = match self.mode {
            Mode::Normal => self.config.prompt.clone(),
            Mode::Streaming(_) => self.stream_prompt.clone(),
        };
        let _ = self.out.write_all(prompt.as_bytes());
        let _ = self.out.flush();
    }

    pub fn mode(&self) -> Mode<C> {
        self.mode
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.mode, Mode::Streaming(_))
    }

    /// Route all following lines to `handler`.
    pub fn set_streaming(&mut self, handler: Handler<C>) {
        self.mode = Mode::Streaming(handler);
    }

    /// Return to registry dispatch.
    pub fn clear_streaming(&mut self) {
        self.mode = Mode::Normal;
    }

    pub fn stream_prompt(&self) -> &str {
        &self.stream_prompt
    }

    /// Set the streaming prompt, cut to the configured prompt size.
    pub fn set_stream_prompt(&mut self, prompt: &str) {
        let max = self.config.prompt_size.saturating_sub(1);
        self.stream_prompt = prompt.chars().take(max).collect();
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn step_faults(&mut self) {
        self.faults = self.faults.saturating_add(1);
    }

    /// Return the fault count and reset it.
    pub fn take_faults(&mut self) -> u32 {
        std::mem::take(&mut self.faults)
    }

    /// Write formatted output; see [`out!`](crate::out) and [`outln!`](crate::outln).
    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
    }

    pub fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn execute(&mut self, ctx: &mut C) {
        // the buffer is empty again before any handler runs, so handlers may feed lines
        let raw = std::mem::replace(&mut self.line, Vec::with_capacity(self.config.buffer_size));
        let line = String::from_utf8_lossy(&raw).into_owned();

        let args = match tokenize(&line, self.config.max_args) {
            Ok(args) => args,
            Err(ShellError::TooManyArgs { max }) => {
                self.print(format_args!("ERROR: too many arguments\n"));
                self.step_faults();
                warn!(max, "command line has too many arguments");
                return;
            }
            Err(err) => {
                self.print(format_args!("ERROR: {err}\n"));
                return;
            }
        };

        if let Mode::Streaming(handler) = self.mode {
            handler(self, ctx, &args);
            return;
        }

        let Some(first) = args.first() else {
            return;
        };
        let name = first.strip_prefix(QUIET_MARKER).unwrap_or(first);
        if self.registry.is_empty() {
            self.print(format_args!("ERROR: no commands registered\n"));
            return;
        }
        match self.registry.find(name).map(|c| (c.name, c.handler)) {
            Some((command, handler)) => {
                debug!(command, args = args.len(), "dispatch");
                handler(self, ctx, &args);
            }
            None => {
                self.print(format_args!("ERROR: command '{name}' not found (try help)\n"));
            }
        }
    }
}

/// Whether the command token carries the quiet marker.
pub fn is_quiet(args: &[&str]) -> bool {
    args.first().is_some_and(|a| a.starts_with(QUIET_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Transcript;
    use crate::{out, outln};

    #[derive(Default)]
    struct Ctx {
        calls: Vec<Vec<String>>,
        streamed: Vec<Vec<String>>,
    }

    fn record(_: &mut Shell<Ctx>, ctx: &mut Ctx, args: &[&str]) {
        ctx.calls.push(args.iter().map(|a| a.to_string()).collect());
    }

    fn greet(shell: &mut Shell<Ctx>, _: &mut Ctx, args: &[&str]) {
        if !is_quiet(args) {
            outln!(shell, "hello {}", args.len());
        }
    }

    fn collect(shell: &mut Shell<Ctx>, ctx: &mut Ctx, args: &[&str]) {
        if args.is_empty() {
            shell.clear_streaming();
            out!(shell, "done\n");
            return;
        }
        ctx.streamed.push(args.iter().map(|a| a.to_string()).collect());
    }

    fn start_stream(shell: &mut Shell<Ctx>, _: &mut Ctx, _: &[&str]) {
        shell.set_stream_prompt("data>> ");
        shell.set_streaming(collect);
    }

    fn run_script(shell: &mut Shell<Ctx>, ctx: &mut Ctx, _: &[&str]) {
        assert_eq!(shell.pending(), 0);
        shell.add_str(ctx, "record one\nrecord two\n");
    }

    fn shell() -> (Shell<Ctx>, Transcript) {
        let transcript = Transcript::new();
        let mut shell = Shell::new(transcript.clone());
        shell.register("record", record, "records args", "").unwrap();
        shell.register("greet", greet, "says hello", "").unwrap();
        shell.register("stream", start_stream, "streams", "").unwrap();
        shell.register("script", run_script, "feeds lines", "").unwrap();
        (shell, transcript)
    }

    #[test]
    fn dispatches_by_prefix_with_full_args() {
        let (mut sh, _) = shell();
        let mut ctx = Ctx::default();
        sh.add_str(&mut ctx, "rec a b  c // comment\n");
        assert_eq!(ctx.calls, vec![vec!["rec", "a", "b", "c"]]);
    }

    #[test]
    fn echoes_and_prompts() {
        let (mut sh, out) = shell();
        let mut ctx = Ctx::default();
        sh.add_str(&mut ctx, "greet x\r");
        assert_eq!(out.contents(), "greet x\nhello 2\n>> ");
    }

    #[test]
    fn quiet_marker_stays_in_argument_zero() {
        let (mut sh, out) = shell();
        let mut ctx = Ctx::default();
        sh.set_echo(false);
        sh.add_str(&mut ctx, "@greet\n@rec z\n");
        assert_eq!(out.contents(), ">> >> ");
        assert_eq!(ctx.calls, vec![vec!["@rec", "z"]]);
    }

    #[test]
    fn unknown_and_empty_lines() {
        let (mut sh, out) = shell();
        let mut ctx = Ctx::default();
        sh.set_echo(false);
        sh.add_str(&mut ctx, "\n   \nfoo 1\n");
        assert_eq!(
            out.contents(),
            ">> >> ERROR: command 'foo' not found (try help)\n>> "
        );
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn backspace_edits_the_line() {
        let (mut sh, out) = shell();
        let mut ctx = Ctx::default();

        sh.add_char(&mut ctx, BACKSPACE);
        assert_eq!(sh.pending(), 0);
        assert_eq!(out.contents(), "");

        sh.add_str(&mut ctx, "abc");
        for _ in 0..3 {
            sh.add_char(&mut ctx, BACKSPACE);
        }
        assert_eq!(sh.pending(), 0);
        assert_eq!(out.contents(), "abc\x08 \x08\x08 \x08\x08 \x08");

        sh.add_str(&mut ctx, "recx");
        sh.add_char(&mut ctx, DELETE);
        sh.add_str(&mut ctx, " 1\n");
        assert_eq!(ctx.calls, vec![vec!["rec", "1"]]);
    }

    #[test]
    fn overflow_drops_chars_and_counts_faults() {
        let (mut sh, out) = shell();
        let mut ctx = Ctx::default();
        sh.set_echo(false);

        let long = "x".repeat(130);
        sh.add_str(&mut ctx, &long);
        assert_eq!(sh.pending(), 127);
        assert_eq!(sh.faults(), 3);
        assert_eq!(out.contents(), "_\x08_\x08_\x08");

        assert_eq!(sh.take_faults(), 3);
        assert_eq!(sh.faults(), 0);
    }

    #[test]
    fn too_many_arguments_drops_line() {
        let (mut sh, out) = shell();
        let mut ctx = Ctx::default();
        sh.set_echo(false);
        let line = format!("rec{}\n", " a".repeat(32));
        sh.add_str(&mut ctx, &line);
        assert!(ctx.calls.is_empty());
        assert_eq!(sh.faults(), 1);
        assert!(out.contents().starts_with("ERROR: too many arguments\n"));

        let line = format!("rec{}\n", " a".repeat(31));
        sh.add_str(&mut ctx, &line);
        assert_eq!(ctx.calls[0].len(), 32);
    }

    #[test]
    fn streaming_mode_owns_lines() {
        let (mut sh, out) = shell();
        let mut ctx = Ctx::default();
        sh.set_echo(false);

        sh.add_str(&mut ctx, "stream\n");
        assert!(sh.is_streaming());
        sh.add_str(&mut ctx, "rec 1 // c\ngreet\n");
        assert!(ctx.calls.is_empty());
        assert_eq!(ctx.streamed, vec![vec!["rec", "1"], vec!["greet"]]);

        sh.add_str(&mut ctx, "\n");
        assert!(!sh.is_streaming());
        assert_eq!(out.contents(), "data>> data>> data>> done\n>> ");
    }

    #[test]
    fn stream_prompt_is_bounded() {
        let (mut sh, _) = shell();
        sh.set_stream_prompt("0123456789abcdef");
        assert_eq!(sh.stream_prompt(), "012345678");
    }

    #[test]
    fn handler_may_feed_further_lines() {
        let (mut sh, _) = shell();
        let mut ctx = Ctx::default();
        sh.set_echo(false);
        sh.add_str(&mut ctx, "script\n");
        assert_eq!(ctx.calls, vec![vec!["record", "one"], vec!["record", "two"]]);
    }

    #[test]
    fn registration_failure_is_reported() {
        let transcript = Transcript::new();
        let config = ShellConfig {
            slots: 1,
            ..ShellConfig::default()
        };
        let mut sh: Shell<Ctx> = Shell::with_config(config, transcript.clone());
        assert_eq!(sh.register("record", record, "", "").unwrap(), 0);
        assert!(sh.register("greet", greet, "", "").is_err());
        assert_eq!(
            transcript.contents(),
            "ERROR: command 'greet' can not be registered (too many)\n"
        );
        assert_eq!(sh.registry().len(), 1);
    }

    #[test]
    fn empty_registry_reports() {
        let transcript = Transcript::new();
        let mut sh: Shell<Ctx> = Shell::new(transcript.clone());
        sh.set_echo(false);
        sh.add_str(&mut Ctx::default(), "help\n");
        assert_eq!(transcript.contents(), "ERROR: no commands registered\n>> ");
    }
}
