//! Telegram knowledge base and wire validation for OSP.
//!
//! The knowledge base maps every 7-bit telegram identifier to one or more
//! named variants (an identifier may have several, told apart by payload
//! size). It is checked once when a [`VariantRegistry`] is built; a table
//! that fails the check never yields a registry.
//!
//! On top of it the registry resolves operator-typed telegram keys and
//! validates raw telegrams against the protocol rules.

pub mod describe;
pub mod error;
pub mod registry;
pub mod table;
pub mod validator;
pub mod variant;

pub use error::{Result, VariantError};
pub use registry::{Selection, TidSlot, VariantRegistry, TID_COUNT};
pub use validator::{Exchange, Finding, ValidationContext};
pub use variant::{Casting, SizeMask, TelegramVariant};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
