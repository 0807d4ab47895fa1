//! The context every command handler works on.

use std::fmt;

use osplink_frame::{hex_bytes, Checksum, Header};
use osplink_shell::{outln, Shell};
use osplink_transport::{Status, Transport};
use osplink_variants::VariantRegistry;
use tracing::{info, warn};

use crate::procedures::Chain;
use crate::said::PASSWORD_UNSET;
use crate::store::{ScriptStore, SCRIPT_NAME};

/// Deepest nesting of `file exec` (a script running itself).
pub const MAX_EXEC_DEPTH: usize = 4;

/// How much of the telegram traffic goes to the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TelegramLog {
    #[default]
    None,
    /// Telegram name and payload.
    Args,
    /// Name, payload and the raw bytes of both directions.
    Tele,
}

impl TelegramLog {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Args => "args",
            Self::Tele => "tele",
        }
    }
}

impl fmt::Display for TelegramLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and version of the application embedding the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

/// Extra lines for `version` or `board`, supplied by the application.
pub type InfoHook = Box<dyn Fn() -> Vec<String>>;

/// A script being typed in with `file record`.
#[derive(Debug, Default)]
pub(crate) struct Recording {
    pub(crate) script: String,
    pub(crate) lines: usize,
}

/// Everything the commands share: the telegram knowledge base, the bus,
/// the script store and the operator's settings.
pub struct Station {
    pub variants: VariantRegistry,
    pub transport: Box<dyn Transport>,
    pub checksum: Checksum,
    /// Run the validator on telegrams entered with `osp send|tx|trx`.
    pub validate: bool,
    pub log: TelegramLog,
    pub store: Box<dyn ScriptStore>,
    pub app: Option<AppInfo>,
    pub version_extra: Option<InfoHook>,
    pub board_extra: Option<InfoHook>,
    /// Chain found by the last `osp resetinit`; `None` until one succeeds.
    pub chain: Option<Chain>,
    /// Test password sent before OTP writes on SAID nodes.
    pub said_password: u64,
    pub(crate) recording: Option<Recording>,
    pub(crate) exec_depth: usize,
}

impl Station {
    pub fn new(
        variants: VariantRegistry,
        transport: Box<dyn Transport>,
        store: Box<dyn ScriptStore>,
    ) -> Self {
        Self {
            variants,
            transport,
            checksum: Checksum::default(),
            validate: true,
            log: TelegramLog::default(),
            store,
            app: None,
            version_extra: None,
            board_extra: None,
            chain: None,
            said_password: PASSWORD_UNSET,
            recording: None,
            exec_depth: 0,
        }
    }

    /// Run the stored startup script, if there is one.
    pub fn boot(&mut self, shell: &mut Shell<Station>) {
        match self.load_script() {
            Some(script) => {
                outln!(shell, "Running '{SCRIPT_NAME}'");
                crate::handlers::file::exec_script(shell, self, &script);
            }
            None => outln!(shell, "No '{SCRIPT_NAME}' file available to execute"),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// The stored script; store failures are logged and read as no script.
    pub(crate) fn load_script(&self) -> Option<String> {
        self.store.load().unwrap_or_else(|err| {
            warn!(error = %err, "script store unreadable");
            None
        })
    }

    /// Send a telegram without waiting for a response.
    pub fn transmit(&mut self, frame: &[u8]) -> Status {
        let status = self.transport.transmit(frame);
        self.log_exchange(frame, None, status);
        status
    }

    /// Send a telegram and read its response.
    pub fn transmit_receive(&mut self, frame: &[u8], expected: Option<usize>) -> (Vec<u8>, Status) {
        let (response, status) = self.transport.transmit_receive(frame, expected);
        self.log_exchange(frame, Some(&response), status);
        (response, status)
    }

    fn log_exchange(&self, frame: &[u8], response: Option<&[u8]>, status: Status) {
        if !status.is_ok() {
            warn!(%status, tx = %hex_bytes(frame), "telegram exchange failed");
        }
        if self.log == TelegramLog::None {
            return;
        }
        let label = match Header::parse(frame) {
            Some(h) if frame.len() >= osplink_frame::MIN_TELEGRAM_SIZE => {
                let size = frame.len() - osplink_frame::MIN_TELEGRAM_SIZE;
                let index = self.variants.find(h.tid, size);
                self.variants.variants()[index].label()
            }
            _ => "??/???".to_string(),
        };
        let args = frame
            .get(osplink_frame::HEADER_SIZE..frame.len().saturating_sub(1))
            .map(hex_bytes)
            .unwrap_or_default();
        match (self.log, response) {
            (TelegramLog::Tele, Some(rx)) => {
                info!(
                    tele = %label,
                    args = %args,
                    tx = %hex_bytes(frame),
                    rx = %hex_bytes(rx),
                    %status
                )
            }
            (TelegramLog::Tele, None) => {
                info!(tele = %label, args = %args, tx = %hex_bytes(frame), %status)
            }
            _ => info!(tele = %label, args = %args, %status),
        }
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Station")
            .field("variants", &self.variants.len())
            .field("transport", &self.transport.name())
            .field("checksum", &self.checksum)
            .field("validate", &self.validate)
            .field("log", &self.log)
            .field("app", &self.app)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}
