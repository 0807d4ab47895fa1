use std::fmt;

use crate::engine::Shell;
use crate::error::{Result, ShellError};

/// Entry point of a command.
///
/// Receives the engine (for output and mode changes), the application
/// context and the tokenized line, command name included.
pub type Handler<C> = fn(&mut Shell<C>, &mut C, &[&str]);

/// A registered command.
pub struct CommandDescriptor<C> {
    pub name: &'static str,
    pub handler: Handler<C>,
    pub short_help: &'static str,
    pub long_help: &'static str,
}

impl<C> Clone for CommandDescriptor<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for CommandDescriptor<C> {}

impl<C> fmt::Debug for CommandDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("short_help", &self.short_help)
            .finish_non_exhaustive()
    }
}

/// Bounded command table kept sorted by name.
pub struct CommandRegistry<C> {
    commands: Vec<CommandDescriptor<C>>,
    capacity: usize,
}

impl<C> CommandRegistry<C> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a command at its sorted position.
    ///
    /// Returns the number of free slots left. A full registry or a
    /// duplicate name leaves the table untouched.
    pub fn register(&mut self, descriptor: CommandDescriptor<C>) -> Result<usize> {
        if self.commands.len() >= self.capacity {
            return Err(ShellError::RegistryFull {
                name: descriptor.name.to_string(),
                capacity: self.capacity,
            });
        }
        if self.commands.iter().any(|c| c.name == descriptor.name) {
            return Err(ShellError::DuplicateCommand {
                name: descriptor.name.to_string(),
            });
        }

        let slot = self.commands.partition_point(|c| c.name < descriptor.name);
        self.commands.insert(slot, descriptor);
        Ok(self.remaining())
    }

    /// First command, in sorted order, whose name starts with `query`.
    ///
    /// A short query may shadow later commands sharing the prefix; `e`
    /// finds `echo` even when `exit` is registered too.
    pub fn find(&self, query: &str) -> Option<&CommandDescriptor<C>> {
        self.commands.iter().find(|c| c.name.starts_with(query))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor<C>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Shell<()>, _: &mut (), _: &[&str]) {}

    fn cmd(name: &'static str) -> CommandDescriptor<()> {
        CommandDescriptor {
            name,
            handler: noop,
            short_help: "test",
            long_help: "test",
        }
    }

    fn names(reg: &CommandRegistry<()>) -> Vec<&'static str> {
        reg.iter().map(|c| c.name).collect()
    }

    #[test]
    fn keeps_commands_sorted() {
        let mut reg = CommandRegistry::with_capacity(20);
        for name in ["version", "echo", "osp", "help", "file", "board"] {
            reg.register(cmd(name)).unwrap();
        }
        assert_eq!(names(&reg), vec!["board", "echo", "file", "help", "osp", "version"]);
    }

    #[test]
    fn register_reports_remaining_slots() {
        let mut reg = CommandRegistry::with_capacity(3);
        assert_eq!(reg.register(cmd("a")).unwrap(), 2);
        assert_eq!(reg.register(cmd("b")).unwrap(), 1);
        assert_eq!(reg.register(cmd("c")).unwrap(), 0);
    }

    #[test]
    fn full_registry_is_unchanged() {
        let mut reg = CommandRegistry::with_capacity(2);
        reg.register(cmd("echo")).unwrap();
        reg.register(cmd("help")).unwrap();

        let err = reg.register(cmd("board")).unwrap_err();
        assert!(matches!(err, ShellError::RegistryFull { capacity: 2, .. }));
        assert_eq!(err.to_string(), "command 'board' can not be registered (too many)");
        assert_eq!(names(&reg), vec!["echo", "help"]);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut reg = CommandRegistry::with_capacity(4);
        reg.register(cmd("echo")).unwrap();
        assert!(matches!(
            reg.register(cmd("echo")),
            Err(ShellError::DuplicateCommand { .. })
        ));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn find_by_full_name_and_prefix() {
        let mut reg = CommandRegistry::with_capacity(20);
        for name in ["board", "echo", "exit", "file", "help", "osp", "version"] {
            reg.register(cmd(name)).unwrap();
        }

        for name in names(&reg) {
            assert_eq!(reg.find(name).unwrap().name, name);
        }
        assert_eq!(reg.find("b").unwrap().name, "board");
        assert_eq!(reg.find("ex").unwrap().name, "exit");
        assert_eq!(reg.find("ver").unwrap().name, "version");
        // first match in sorted order shadows "exit"
        assert_eq!(reg.find("e").unwrap().name, "echo");
        assert!(reg.find("echoes").is_none());
        assert!(reg.find("Echo").is_none());
    }
}
