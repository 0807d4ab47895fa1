use std::path::{Path, PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use osplink::frame::Checksum;
use osplink::shell::Shell;
use osplink::station::{AppInfo, Station};
use osplink::store::{FileScriptStore, SCRIPT_NAME};
use osplink::transport::{MemoryTransport, Transport};
use osplink::variants::VariantRegistry;
use tracing::{debug, info};

use crate::exit::{transport_error, variant_error, CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod dissect;
pub mod info;
pub mod run;
pub mod shell;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the interactive command shell on stdin/stdout.
    Shell(ShellArgs),
    /// Feed a command file through the shell.
    Run(RunArgs),
    /// List the telegram knowledge base.
    Info(InfoArgs),
    /// Decode and validate a telegram given as hex bytes.
    Dissect(DissectArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Options shared by every subcommand.
#[derive(Debug)]
pub struct Globals {
    pub format: OutputFormat,
    pub checksum: Checksum,
    pub telegrams: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ChecksumArg {
    Additive,
    Crc8,
}

impl From<ChecksumArg> for Checksum {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::Additive => Checksum::Additive,
            ChecksumArg::Crc8 => Checksum::Crc8,
        }
    }
}

pub fn run(command: Command, globals: &Globals) -> CliResult<i32> {
    // a knowledge base that fails its consistency check stops everything
    let variants = load_variants(globals.telegrams.as_deref())?;
    match command {
        Command::Shell(args) => shell::run(args, globals, variants),
        Command::Run(args) => run::run(args, globals, variants),
        Command::Info(args) => info::run(args, globals, &variants),
        Command::Dissect(args) => dissect::run(args, globals, &variants),
        Command::Version(args) => version::run(args, &variants),
    }
}

#[derive(Args, Debug)]
pub struct ShellArgs {
    /// Unix socket of a bus bridge; without one telegrams go nowhere.
    #[arg(long, value_name = "PATH", env = "OSPLINK_SOCKET")]
    pub socket: Option<PathBuf>,
    /// Where the startup script is stored.
    #[arg(long, value_name = "FILE", env = "OSPLINK_SCRIPT", default_value = SCRIPT_NAME)]
    pub script: PathBuf,
    /// Do not run the startup script.
    #[arg(long)]
    pub no_boot: bool,
    /// Never echo typed characters.
    #[arg(long)]
    pub no_echo: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command file, one shell line per line.
    pub file: PathBuf,
    /// Unix socket of a bus bridge.
    #[arg(long, value_name = "PATH", env = "OSPLINK_SOCKET")]
    pub socket: Option<PathBuf>,
    /// Where `file record` and `file exec` keep their script.
    #[arg(long, value_name = "FILE", env = "OSPLINK_SCRIPT", default_value = SCRIPT_NAME)]
    pub script: PathBuf,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Telegram name, name fragment or two-digit hex tid.
    pub tele: Option<String>,
}

#[derive(Args, Debug)]
pub struct DissectArgs {
    /// Telegram bytes in hex, e.g. `A0 00 05 4A`.
    #[arg(required = true, num_args = 1..)]
    pub bytes: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn load_variants(path: Option<&Path>) -> CliResult<VariantRegistry> {
    let registry = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading telegram knowledge base");
            VariantRegistry::from_path(path)
        }
        None => VariantRegistry::builtin(),
    };
    registry.map_err(|err| variant_error("telegram knowledge base", err))
}

/// Connect to the bridge at `socket`, or fall back to a bus without nodes.
pub fn open_transport(socket: Option<&Path>, checksum: Checksum) -> CliResult<Box<dyn Transport>> {
    let Some(path) = socket else {
        info!("no socket given, telegrams are not delivered");
        return Ok(Box::new(MemoryTransport::with_checksum(checksum)));
    };
    connect(path, checksum)
}

#[cfg(unix)]
fn connect(path: &Path, checksum: Checksum) -> CliResult<Box<dyn Transport>> {
    use osplink::transport::{StreamConfig, StreamTransport};

    let config = StreamConfig {
        checksum,
        ..StreamConfig::default()
    };
    let transport = StreamTransport::connect_unix(path, config)
        .map_err(|err| transport_error("connect", err))?;
    info!(path = %path.display(), "connected to bus bridge");
    Ok(Box::new(transport))
}

#[cfg(not(unix))]
fn connect(path: &Path, _checksum: Checksum) -> CliResult<Box<dyn Transport>> {
    Err(CliError::new(
        crate::exit::USAGE,
        format!("{}: unix sockets are not supported on this platform", path.display()),
    ))
}

/// A station for this process with all built-in commands registered.
pub fn build_station(
    variants: VariantRegistry,
    transport: Box<dyn Transport>,
    script: &Path,
    checksum: Checksum,
) -> Station {
    let mut station = Station::new(
        variants,
        transport,
        Box::new(FileScriptStore::new(script)),
    );
    station.checksum = checksum;
    station.app = Some(AppInfo {
        name: "osplink".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });
    station.version_extra = Some(Box::new(|| {
        vec![format!(
            "profile : {}",
            option_env!("OSPLINK_BUILD_PROFILE").unwrap_or("unknown")
        )]
    }));
    station
}

pub fn register_commands(shell: &mut Shell<Station>) -> CliResult<()> {
    osplink::handlers::register_all(shell)
        .map(|_| ())
        .map_err(|err| CliError::new(INTERNAL, format!("command registry: {err}")))
}
