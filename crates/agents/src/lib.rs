use std::sync::Arc;
use std::time::Instant;

use agro_catalog::{Catalog, Classifier};
use agro_core::{contains_any, menu, normalize, BotConfig, InboundMessage, Stage};
use agro_observability::AppMetrics;
use agro_storage::SessionStore;
use anyhow::Result;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info, instrument};

/// Phrases that signal the sender is asking about shipping.
pub const SHIPPING_TERMS: &[&str] = &[
    "envio a",
    "envío a",
    "hacen envio",
    "realizan envio",
    "envio",
    "envíos",
    "envios",
    "envío",
    "enviar",
    "envían",
    "envien",
];

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:soy|me llamo|mi nombre es)\s+([a-záéíóúüñ\s]+)")
        .expect("valid name pattern")
});

/// Routes each inbound message through the session state machine, falling
/// back to the free-text classifier when no menu guard fires. Errors never
/// reach the sender: they are logged and replaced with a fixed apology.
#[derive(Clone)]
pub struct Dispatcher<S>
where
    S: SessionStore,
{
    classifier: Classifier,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> Dispatcher<S>
where
    S: SessionStore,
{
    pub fn new(
        catalog: Arc<Catalog>,
        config: BotConfig,
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            classifier: Classifier::new(catalog, config),
            store,
            metrics,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.classifier.catalog()
    }

    #[instrument(skip(self, msg), fields(conversation = %msg.conversation_id))]
    pub fn handle_message(&self, msg: &InboundMessage) -> String {
        let started = Instant::now();
        self.metrics.inc_message();

        let reply = match self.dispatch(msg) {
            Ok(reply) => reply,
            Err(error) => {
                self.metrics.inc_dispatch_error();
                error!(%error, "dispatch failed");
                menu::APOLOGY.to_string()
            }
        };

        self.metrics.observe_latency(started.elapsed());
        reply
    }

    pub fn purge_expired_sessions(&self) -> Result<u64> {
        self.store.purge_expired(Utc::now())
    }

    fn dispatch(&self, msg: &InboundMessage) -> Result<String> {
        let raw = msg.text.trim();
        if raw.is_empty() {
            return Ok(String::new());
        }

        let normalized = normalize(raw);
        let mut session = self.store.get(&msg.conversation_id)?;

        // Introductions like "soy Carlos" skip the name prompt entirely,
        // but only before any session row exists.
        if session.stage == Stage::New {
            if let Some(name) = extract_introduced_name(raw) {
                session.stage = Stage::MenuShown;
                session.name = Some(name.clone());
                self.store.set(&msg.conversation_id, session)?;
                info!(stage = "menu_shown", "name captured from introduction");
                self.metrics.inc_menu_reply();
                return Ok(menu::welcome_menu(&name));
            }
        }

        if raw.eq_ignore_ascii_case("!hola") {
            session.stage = Stage::AwaitingName;
            self.store.set(&msg.conversation_id, session)?;
            return Ok(menu::ASK_NAME.to_string());
        }

        if session.stage == Stage::AwaitingName {
            session.stage = Stage::MenuShown;
            session.name = Some(raw.to_string());
            self.store.set(&msg.conversation_id, session)?;
            self.metrics.inc_menu_reply();
            return Ok(menu::onboarding_menu(raw));
        }

        if session.stage == Stage::AwaitingShippingLocation {
            session.stage = Stage::MenuShown;
            session.shipping_location = Some(raw.to_string());
            self.store.set(&msg.conversation_id, session)?;
            return Ok(menu::shipping_saved(raw));
        }

        // Everything below assumes an onboarded sender.
        if session.stage != Stage::MenuShown {
            session.stage = Stage::AwaitingName;
            self.store.set(&msg.conversation_id, session)?;
            return Ok(menu::ASK_NAME.to_string());
        }

        if contains_any(raw, SHIPPING_TERMS) {
            if let Some(location) = session.shipping_location.clone() {
                self.store.set(&msg.conversation_id, session)?;
                return Ok(menu::shipping_confirmed(&location));
            }
            session.stage = Stage::AwaitingShippingLocation;
            self.store.set(&msg.conversation_id, session)?;
            return Ok(menu::ASK_SHIPPING_LOCATION.to_string());
        }

        if normalized.contains("hola") || normalized.contains("menu") {
            let name = session.name.clone().unwrap_or_default();
            self.store.set(&msg.conversation_id, session)?;
            self.metrics.inc_menu_reply();
            return Ok(menu::welcome_menu(&name));
        }

        if let Some(reply) = menu::category_reply(&normalized) {
            self.store.set(&msg.conversation_id, session)?;
            self.metrics.inc_menu_reply();
            return Ok(reply.to_string());
        }

        if let Some(reply) = menu::product_reply(&normalized) {
            self.store.set(&msg.conversation_id, session)?;
            self.metrics.inc_menu_reply();
            return Ok(reply.to_string());
        }

        self.store.set(&msg.conversation_id, session)?;
        self.metrics.inc_classifier();
        Ok(self.classifier.evaluate(raw))
    }
}

fn extract_introduced_name(text: &str) -> Option<String> {
    let capture = NAME_RE.captures(text)?;
    let name = capture.get(1)?.as_str().trim();
    if is_likely_name(name) {
        Some(name.to_string())
    } else {
        None
    }
}

/// Heuristic filter for the introduction capture. Rejects anything that
/// reads like a command or a query rather than a person's name.
fn is_likely_name(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 40 {
        return false;
    }
    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let lower = trimmed.to_lowercase();
    const NOT_NAMES: &[&str] = &[
        "hola", "buenos", "buenas", "menu", "menú", "fito", "nutri", "bio", "precio", "cuanto",
        "cuánto", "necesito", "tengo", "ayuda", "gracias",
    ];
    if NOT_NAMES.iter().any(|word| lower.contains(word)) {
        return false;
    }
    trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agro_core::CatalogEntry;
    use agro_storage::MemorySessionStore;

    fn sample_catalog() -> Arc<Catalog> {
        Arc::new(Catalog::from_entries(vec![
            CatalogEntry {
                name: "POTASIO K50".to_string(),
                keywords: vec!["engorde".to_string(), "llenado de fruto".to_string()],
                functions: vec!["Llenado y calidad de fruto".to_string()],
            },
            CatalogEntry {
                name: "BORO B15".to_string(),
                keywords: vec!["caída de flores".to_string()],
                functions: vec!["Cuaje y floración".to_string()],
            },
        ]))
    }

    fn dispatcher() -> Dispatcher<MemorySessionStore> {
        Dispatcher::new(
            sample_catalog(),
            BotConfig::default(),
            Arc::new(MemorySessionStore::default()),
            AppMetrics::shared(),
        )
    }

    fn msg(id: &str, text: &str) -> InboundMessage {
        InboundMessage {
            conversation_id: id.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn onboarding_asks_name_then_shows_personalized_menu() {
        let bot = dispatcher();
        let first = bot.handle_message(&msg("a", "!hola"));
        assert_eq!(first, menu::ASK_NAME);

        let second = bot.handle_message(&msg("a", "Carlos"));
        assert!(second.contains("Carlos"));
        assert!(second.contains("1️⃣"));
    }

    #[test]
    fn introduction_skips_name_prompt() {
        let bot = dispatcher();
        let reply = bot.handle_message(&msg("a", "Hola, soy María Fernanda"));
        assert!(reply.contains("María Fernanda"));
        assert!(reply.contains("6️⃣"));
    }

    #[test]
    fn introduction_with_digits_is_not_a_name() {
        let bot = dispatcher();
        let reply = bot.handle_message(&msg("a", "soy 42"));
        // Falls through to the name prompt for unonboarded senders.
        assert_eq!(reply, menu::ASK_NAME);
    }

    #[test]
    fn unonboarded_free_text_is_asked_for_name_first() {
        let bot = dispatcher();
        let reply = bot.handle_message(&msg("a", "necesito algo para engorde"));
        assert_eq!(reply, menu::ASK_NAME);
    }

    #[test]
    fn shipping_asks_for_location_then_confirms() {
        let bot = dispatcher();
        bot.handle_message(&msg("a", "!hola"));
        bot.handle_message(&msg("a", "Rosa"));

        let ask = bot.handle_message(&msg("a", "¿hacen envíos?"));
        assert_eq!(ask, menu::ASK_SHIPPING_LOCATION);

        let saved = bot.handle_message(&msg("a", "Cusco"));
        assert!(saved.contains("Cusco"));

        let confirmed = bot.handle_message(&msg("a", "¿envían a provincia?"));
        assert!(confirmed.contains("Cusco"));
    }

    #[test]
    fn menu_keyword_reprints_menu_with_stored_name() {
        let bot = dispatcher();
        bot.handle_message(&msg("a", "!hola"));
        bot.handle_message(&msg("a", "Pedro"));

        let reply = bot.handle_message(&msg("a", "menú"));
        assert!(reply.contains("Pedro"));
        assert!(reply.contains("1️⃣"));
    }

    #[test]
    fn digit_routes_to_category_after_onboarding() {
        let bot = dispatcher();
        bot.handle_message(&msg("a", "!hola"));
        bot.handle_message(&msg("a", "Ana"));

        let reply = bot.handle_message(&msg("a", "1"));
        assert!(reply.contains("FITOPROTECTORES"));
    }

    #[test]
    fn free_text_falls_through_to_classifier() {
        let bot = dispatcher();
        bot.handle_message(&msg("a", "!hola"));
        bot.handle_message(&msg("a", "Luis"));

        let reply = bot.handle_message(&msg("a", "tengo caída de flores"));
        assert!(reply.contains("BORO B15"));
    }

    #[test]
    fn sessions_are_isolated_per_conversation() {
        let bot = dispatcher();
        bot.handle_message(&msg("a", "!hola"));
        bot.handle_message(&msg("a", "Carlos"));

        // A different conversation starts from scratch.
        let reply = bot.handle_message(&msg("b", "menú"));
        assert_eq!(reply, menu::ASK_NAME);
    }

    #[test]
    fn empty_text_yields_empty_reply() {
        let bot = dispatcher();
        assert_eq!(bot.handle_message(&msg("a", "   ")), "");
    }

    #[test]
    fn likely_name_filter() {
        assert!(is_likely_name("Carlos"));
        assert!(is_likely_name("María Fernanda"));
        assert!(!is_likely_name("hola buenos dias"));
        assert!(!is_likely_name("lote 42"));
        assert!(!is_likely_name(""));
        assert!(!is_likely_name(
            "un nombre exageradamente largo que nadie escribiria como presentacion"
        ));
    }
}
