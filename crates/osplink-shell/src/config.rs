/// Prompt shown while no streaming handler is installed.
pub const DEFAULT_PROMPT: &str = ">> ";

/// Controls the capacity limits of the line engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Line buffer size in bytes; a line holds at most `buffer_size - 1` characters.
    pub buffer_size: usize,
    /// Maximum number of arguments on one line, command included.
    pub max_args: usize,
    /// Number of command registration slots.
    pub slots: usize,
    /// Streaming prompt buffer size; prompts keep at most `prompt_size - 1` characters.
    pub prompt_size: usize,
    /// Prompt shown in normal mode.
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            buffer_size: 128,
            max_args: 32,
            slots: 20,
            prompt_size: 10,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}
