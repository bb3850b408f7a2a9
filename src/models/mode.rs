use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Assistant function a chat is locked to. Wire keys follow the backend routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "phishng")]
    Phishing,
    #[serde(rename = "wifisec")]
    WifiSecurity,
    #[serde(rename = "cybersec")]
    GeneralSecurity,
    #[serde(rename = "emailbreached")]
    EmailBreached,
}

impl Mode {
    pub const ALL: [Mode; 4] = [
        Mode::Phishing,
        Mode::WifiSecurity,
        Mode::GeneralSecurity,
        Mode::EmailBreached,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Mode::Phishing => "phishng",
            Mode::WifiSecurity => "wifisec",
            Mode::GeneralSecurity => "cybersec",
            Mode::EmailBreached => "emailbreached",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Phishing => "Phishing Check",
            Mode::WifiSecurity => "Wi-Fi Security",
            Mode::GeneralSecurity => "General Security",
            Mode::EmailBreached => "Breached Email",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Mode::Phishing => "Analyze emails/text/links",
            Mode::WifiSecurity => "Harden router & network",
            Mode::GeneralSecurity => "Cyber hygiene & triage",
            Mode::EmailBreached => "Check your email's health",
        }
    }

    pub fn is_breach_check(self) -> bool {
        matches!(self, Mode::EmailBreached)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| AppError::InvalidRequest(format!("Unknown mode: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        for mode in Mode::ALL {
            assert_eq!(mode.key().parse::<Mode>().unwrap(), mode);
        }
        assert!("phishing".parse::<Mode>().is_err());
    }

    #[test]
    fn test_serde_uses_route_keys() {
        assert_eq!(serde_json::to_string(&Mode::Phishing).unwrap(), "\"phishng\"");
        let m: Mode = serde_json::from_str("\"emailbreached\"").unwrap();
        assert_eq!(m, Mode::EmailBreached);
    }
}
