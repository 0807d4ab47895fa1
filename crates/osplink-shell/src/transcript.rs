use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Shareable in-memory sink for shell output.
///
/// Clones write to the same buffer, so one clone can be handed to a
/// [`Shell`](crate::Shell) while another reads what was printed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Return the contents and empty the buffer.
    pub fn take(&self) -> String {
        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        let text = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        text
    }
}

impl Write for Transcript {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
