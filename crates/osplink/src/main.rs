mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::{ChecksumArg, Command, Globals};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "osplink", version, about = "Command shell for OSP LED chains")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Telegram checksum algorithm.
    #[arg(
        long,
        value_name = "KIND",
        default_value = "additive",
        env = "OSPLINK_CHECKSUM",
        global = true
    )]
    checksum: ChecksumArg,

    /// Telegram knowledge base (JSON) replacing the built-in table.
    #[arg(long, value_name = "FILE", env = "OSPLINK_TELEGRAMS", global = true)]
    telegrams: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let globals = Globals {
        format: cli.format.unwrap_or_else(OutputFormat::default_for_stdout),
        checksum: cli.checksum.into(),
        telegrams: cli.telegrams,
    };

    match cmd::run(cli.command, &globals) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_shell_subcommand() {
        let cli = Cli::try_parse_from([
            "osplink",
            "shell",
            "--socket",
            "/tmp/osp.sock",
            "--no-boot",
        ])
        .expect("shell args should parse");

        match cli.command {
            Command::Shell(args) => {
                assert_eq!(args.socket, Some(PathBuf::from("/tmp/osp.sock")));
                assert!(args.no_boot);
                assert!(!args.no_echo);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_global_checksum_after_subcommand() {
        let cli = Cli::try_parse_from([
            "osplink", "dissect", "A0", "00", "05", "71", "--checksum", "crc8",
        ])
        .expect("dissect args should parse");
        assert!(matches!(cli.checksum, ChecksumArg::Crc8));
        match cli.command {
            Command::Dissect(args) => assert_eq!(args.bytes.len(), 4),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn dissect_requires_bytes() {
        let err = Cli::try_parse_from(["osplink", "dissect"]).expect_err("no bytes should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_unknown_checksum() {
        let err = Cli::try_parse_from(["osplink", "--checksum", "md5", "info"])
            .expect_err("unknown checksum should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn parses_info_with_filter() {
        let cli =
            Cli::try_parse_from(["osplink", "info", "setpwm"]).expect("info args should parse");
        match cli.command {
            Command::Info(args) => assert_eq!(args.tele.as_deref(), Some("setpwm")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
