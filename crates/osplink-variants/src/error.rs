/// Errors raised while loading or checking a telegram knowledge base.
///
/// Every variant describes a table defect; a registry is never built from
/// a table that produced one.
#[derive(Debug, thiserror::Error)]
pub enum VariantError {
    /// The table has no rows.
    #[error("knowledge base is empty")]
    Empty,

    /// A row carries a tid that does not fit in 7 bits.
    #[error("row {row}: tid {tid:02X} out of range (max 7F)")]
    TidOutOfRange { row: usize, tid: u8 },

    /// Rows are not ordered by tid.
    #[error("row {row}: tid {tid:02X} follows {prev:02X} (table must be ordered by tid)")]
    OutOfOrder { row: usize, tid: u8, prev: u8 },

    /// A tid has no row at all.
    #[error("tid {tid:02X} missing from knowledge base")]
    MissingTid { tid: u8 },

    /// A row is neither fully described nor fully empty.
    #[error("row {row} (tid {tid:02X}): {reason}")]
    Inconsistent {
        row: usize,
        tid: u8,
        reason: &'static str,
    },

    /// Two rows share a name.
    #[error("row {row} (tid {tid:02X}): duplicate name '{name}'")]
    DuplicateName { row: usize, tid: u8, name: String },

    /// Knowledge base file could not be read.
    #[error("failed to load knowledge base: {0}")]
    LoadFailed(String),

    /// Knowledge base JSON could not be parsed.
    #[error("invalid knowledge base json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VariantError>;
