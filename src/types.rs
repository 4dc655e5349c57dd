use std::fmt;

use serde::Deserialize;

/// How a configured task is launched.
///
/// The config file stores this as a bare integer (`"mode": 1`). Values the
/// launcher does not know are kept as `Unknown` so that a typo only disables
/// the one task instead of rejecting the whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub enum RunMode {
    /// Explicitly disabled; kept in the file but never launched.
    None,
    /// Launch the program directly as the current user.
    Direct,
    /// Launch through the credential helper as another user.
    Credentialed,
    Unknown(u8),
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::None
    }
}

impl From<u8> for RunMode {
    fn from(value: u8) -> Self {
        match value {
            0 => RunMode::None,
            1 => RunMode::Direct,
            2 => RunMode::Credentialed,
            other => RunMode::Unknown(other),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::None => write!(f, "none"),
            RunMode::Direct => write!(f, "direct"),
            RunMode::Credentialed => write!(f, "credentialed"),
            RunMode::Unknown(n) => write!(f, "unknown({n})"),
        }
    }
}

/// Which kind of filesystem entry a path is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Dir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_modes_map_to_variants() {
        assert_eq!(RunMode::from(0), RunMode::None);
        assert_eq!(RunMode::from(1), RunMode::Direct);
        assert_eq!(RunMode::from(2), RunMode::Credentialed);
        assert_eq!(RunMode::from(9), RunMode::Unknown(9));
    }
}
