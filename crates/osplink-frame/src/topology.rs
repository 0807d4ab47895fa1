use std::fmt;
use std::str::FromStr;

/// Direction mode of the chain.
///
/// In `Bidir` mode responses travel back over the same wires towards the
/// controller; in `Loop` mode the last node is wired back to the
/// controller's second port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Topology {
    #[default]
    Bidir,
    Loop,
}

impl Topology {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bidir => "bidir",
            Self::Loop => "loop",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bidir" => Ok(Self::Bidir),
            "loop" => Ok(Self::Loop),
            other => Err(format!("unknown topology '{other}'")),
        }
    }
}
