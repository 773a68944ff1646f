use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WHATSAPP_LINK: &str = "https://wa.me/51921450162";

/// One product record from the catalog file. `name` is required; missing
/// keyword/function arrays deserialize as empty rather than failing the load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub functions: Vec<String>,
}

impl CatalogEntry {
    pub fn functions_label(&self) -> String {
        if self.functions.is_empty() {
            "Funciones no registradas".to_string()
        } else {
            self.functions.join(", ")
        }
    }
}

/// Which matching strategy produced a catalog hit. Shapes the reply template
/// only; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Exact,
    Fuzzy,
    Keyword,
}

/// Onboarding stage of one conversation. Every transition comes from the
/// dispatcher's guard table; no other code mutates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    New,
    AwaitingName,
    MenuShown,
    AwaitingShippingLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub stage: Stage,
    pub name: Option<String>,
    pub shipping_location: Option<String>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            stage: Stage::New,
            name: None,
            shipping_location: None,
            last_seen: now,
        }
    }
}

/// One inbound customer message: a stable opaque conversation identity plus
/// the raw text as typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub conversation_id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub whatsapp_link: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            whatsapp_link: DEFAULT_WHATSAPP_LINK.to_string(),
        }
    }
}

impl BotConfig {
    pub fn from_env() -> Self {
        let whatsapp_link = std::env::var("AGRO_WHATSAPP_LINK")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_WHATSAPP_LINK.to_string());

        Self { whatsapp_link }
    }
}
