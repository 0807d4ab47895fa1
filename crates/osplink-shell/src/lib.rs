//! Line-oriented command engine for character streams.
//!
//! Bytes arrive one at a time, typically from a serial port or a terminal.
//! The engine buffers and echoes them, and on a line terminator:
//! - strips a `//` comment and splits the line into arguments
//! - hands the arguments to the streaming handler when one is installed
//! - otherwise looks the first argument up by prefix in a sorted,
//!   bounded command registry and runs the handler to completion
//!
//! All state lives in the [`Shell`] value; handlers get it by `&mut` next
//! to an application context of their choice.

pub mod config;
pub mod engine;
pub mod error;
pub mod parse;
pub mod registry;
pub mod tokenize;
pub mod transcript;

pub use config::{ShellConfig, DEFAULT_PROMPT};
pub use engine::{is_quiet, Mode, Shell, QUIET_MARKER};
pub use error::{Result, ShellError};
pub use parse::{is_prefix, parse_dec, parse_hex};
pub use registry::{CommandDescriptor, CommandRegistry, Handler};
pub use tokenize::tokenize;
pub use transcript::Transcript;

/// Print formatted text through a [`Shell`].
#[macro_export]
macro_rules! out {
    ($shell:expr, $($arg:tt)*) => {
        $shell.print(::std::format_args!($($arg)*))
    };
}

/// Print a formatted line through a [`Shell`].
#[macro_export]
macro_rules! outln {
    ($shell:expr) => {
        $shell.print(::std::format_args!("\n"))
    };
    ($shell:expr, $($arg:tt)*) => {{
        $shell.print(::std::format_args!($($arg)*));
        $shell.print(::std::format_args!("\n"));
    }};
}

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
