/// Errors reported by the command registry and tokenizer.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// All registration slots are taken.
    #[error("command '{name}' can not be registered (too many)")]
    RegistryFull { name: String, capacity: usize },

    /// A command with this name is already registered.
    #[error("command '{name}' can not be registered (duplicate)")]
    DuplicateCommand { name: String },

    /// A line holds more arguments than the engine accepts.
    #[error("too many arguments (max {max})")]
    TooManyArgs { max: usize },
}

pub type Result<T> = std::result::Result<T, ShellError>;
