//! Interactive command shell for chains of OSP LED nodes.
//!
//! osplink puts a character-driven command line in front of an OSP bus:
//! operators (or scripts) type commands, and the `osp` command builds,
//! validates and exchanges telegrams with the nodes.
//!
//! # Crate Structure
//!
//! - [`frame`]: telegram wire format, checksums and dissection
//! - [`variants`]: telegram knowledge base and validator
//! - [`shell`]: the line engine and command registry
//! - [`transport`]: in-memory and stream bus transports
//! - [`station`]: the context shared by all commands
//! - [`handlers`]: the built-in commands
//! - [`said`]: OTP and I2C bridge procedures for SAID nodes
//!
//! A minimal session:
//!
//! ```
//! use osplink::handlers::register_all;
//! use osplink::shell::{Shell, Transcript};
//! use osplink::station::Station;
//! use osplink::store::MemoryScriptStore;
//! use osplink::transport::MemoryTransport;
//! use osplink::variants::VariantRegistry;
//!
//! let out = Transcript::new();
//! let mut shell = Shell::new(out.clone());
//! register_all(&mut shell).unwrap();
//! let mut station = Station::new(
//!     VariantRegistry::builtin().unwrap(),
//!     Box::new(MemoryTransport::new()),
//!     Box::new(MemoryScriptStore::new()),
//! );
//!
//! shell.set_echo(false);
//! shell.add_str(&mut station, "osp send 000 goactive\n");
//! assert_eq!(out.contents(), "tx A0 00 05 4A\nrx none ok\n>> ");
//! ```

/// Re-export frame types.
pub mod frame {
    pub use osplink_frame::*;
}

/// Re-export variant registry types.
pub mod variants {
    pub use osplink_variants::*;
}

/// Re-export line engine types.
pub mod shell {
    pub use osplink_shell::*;
}

/// Re-export transport types.
pub mod transport {
    pub use osplink_transport::*;
}

pub mod handlers;
pub mod procedures;
pub mod said;
pub mod station;
pub mod store;
