use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Raised by any worker when its workflow hits an unrecoverable error.
pub const ERROR: SignalName = SignalName::from_static("ERROR");
/// Raised right before the host restarts.
pub const REBOOT: SignalName = SignalName::from_static("REBOOT");
pub const ONBOARD_RUNNING: SignalName = SignalName::from_static("ONBOARD_RUNNING");
pub const ONBOARD_DONE: SignalName = SignalName::from_static("ONBOARD_DONE");
pub const CLUSTER_RUNNING: SignalName = SignalName::from_static("CLUSTER_RUNNING");
pub const CLUSTER_DONE: SignalName = SignalName::from_static("CLUSTER_DONE");

/// Vocabulary shared verbatim by every worker and the supervisor.
pub const RESERVED: [SignalName; 6] = [
    ERROR,
    REBOOT,
    ONBOARD_RUNNING,
    ONBOARD_DONE,
    CLUSTER_RUNNING,
    CLUSTER_DONE,
];

/// Name of a signal.
///
/// A signal is a persistent, payload-less fact: "this event happened at least once".
/// The name doubles as the marker file name inside the signal directory,
/// so it is restricted to a flat ASCII token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignalName(Cow<'static, str>);

impl SignalName {
    /// Build a name from a literal known to be valid.
    ///
    /// Only used for the reserved vocabulary; runtime input goes through [`SignalName::new`].
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if is_valid(&name) {
            Ok(Self(Cow::Owned(name)))
        } else {
            Err(ModelError::InvalidSignalName(name))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name belongs to the reserved vocabulary.
    pub fn is_reserved(&self) -> bool {
        RESERVED.iter().any(|r| r == self)
    }
}

fn is_valid(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SignalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SignalName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SignalName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SignalName> for String {
    fn from(value: SignalName) -> Self {
        value.0.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_are_valid_tokens() {
        for name in RESERVED {
            assert!(is_valid(name.as_str()), "{name} must be a valid token");
            assert!(name.is_reserved());
        }
    }

    #[test]
    fn accepts_custom_names() {
        let name = SignalName::new("SCRIPT_1_DONE").unwrap();
        assert_eq!(name.as_str(), "SCRIPT_1_DONE");
        assert!(!name.is_reserved());
        assert!("license.applied".parse::<SignalName>().is_ok());
    }

    #[test]
    fn rejects_path_like_names() {
        for bad in ["", ".hidden", "..", "a/b", "with space", "ünicode"] {
            assert_eq!(
                SignalName::new(bad),
                Err(ModelError::InvalidSignalName(bad.to_string())),
            );
        }
    }

    #[test]
    fn owned_and_static_names_compare_equal() {
        assert_eq!(SignalName::new("REBOOT").unwrap(), REBOOT);
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let json = serde_json::to_string(&ONBOARD_DONE).unwrap();
        assert_eq!(json, r#""ONBOARD_DONE""#);

        let back: SignalName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ONBOARD_DONE);

        assert!(serde_json::from_str::<SignalName>(r#""../etc""#).is_err());
    }
}
