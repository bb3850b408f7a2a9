use serde::{Deserialize, Serialize};

/// Body of `POST /ask/emailbreached`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailCheckRequest {
    pub question: String,
    pub email: Option<String>,
    pub with_ai: bool,
    pub include_unverified: bool,
    pub truncate: bool,
    pub domain: Option<String>,
}

/// One historical breach entry. Field names follow the upstream breach API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BreachRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub breach_date: String,
    #[serde(default)]
    pub added_date: String,
    #[serde(default)]
    pub pwn_count: u64,
    #[serde(default)]
    pub data_classes: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_sensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmailCheckResponse {
    pub email: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub breaches: Vec<BreachRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

impl EmailCheckResponse {
    /// Short headline stored as the message content.
    pub fn headline(&self) -> String {
        if self.count > 0 {
            format!("{} breach(es) found for {}.", self.count, self.email)
        } else {
            format!("No breaches found for {}.", self.email)
        }
    }
}
