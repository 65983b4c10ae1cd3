use serde::{Deserialize, Serialize};

/// Configuration of one announcement monitor instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub name: String,
    pub enabled: bool,
    #[serde(rename = "logLevel")]
    pub log_level: String,
    pub sources: Vec<Source>,
    pub notifications: Vec<Notification>,
    pub filters: Filters,
}

/// A polled announcement source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub name: String,
    pub url: String,
    /// Polling interval in seconds
    pub interval: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    /// webhook, email, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub keywords: Vec<String>,
}
