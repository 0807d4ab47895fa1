//! The built-in shell commands.

use osplink_shell::Shell;

use crate::station::Station;

pub mod board;
pub mod echo;
pub mod file;
pub mod help;
pub mod osp;
pub mod said;
pub mod version;

/// Register every built-in command.
///
/// Returns the number of registration slots still free.
pub fn register_all(shell: &mut Shell<Station>) -> osplink_shell::Result<usize> {
    board::register(shell)?;
    echo::register(shell)?;
    file::register(shell)?;
    help::register(shell)?;
    osp::register(shell)?;
    said::register(shell)?;
    version::register(shell)
}
