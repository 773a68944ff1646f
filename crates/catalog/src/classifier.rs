use std::sync::Arc;

use agro_core::{contains_any, BotConfig, CatalogEntry, MatchRule};

use crate::matcher::{find_by_keywords, find_exact, fuzzy_match};
use crate::Catalog;

/// Terms that route straight to the quotation-deferral reply.
pub const PRICE_TERMS: &[&str] = &["precio", "precios", "cotiz", "cuánto", "cuanto", "valor"];

/// Urgent plant-health signals. Checked before any catalog matching so a
/// coincidental product-name hit can never mask an escalation.
pub const SERIOUS_DISEASE_TERMS: &[&str] = &[
    "virus",
    "enfermedad grave",
    "fuerte infección",
    "necrosis",
    "muerte masiva",
    "muy enfermo",
];

const CLASSIFIER_FUZZY_THRESHOLD: f64 = 0.5;

/// Rule-based free-text classifier: ordered business rules first, then the
/// three catalog strategies, then a fixed fallback. Total: any input maps to
/// exactly one reply string, empty input to an empty string.
#[derive(Clone)]
pub struct Classifier {
    catalog: Arc<Catalog>,
    config: BotConfig,
}

impl Classifier {
    pub fn new(catalog: Arc<Catalog>, config: BotConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn evaluate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        if contains_any(text, PRICE_TERMS) {
            return "Te respondemos en unos minutos con la cotización. Si quieres que incluya envío, indícanos el lugar.".to_string();
        }

        if contains_any(text, SERIOUS_DISEASE_TERMS) {
            return "Recomiendo consultar a un ingeniero en campo para un diagnóstico detallado. Mientras tanto, puedo sugerir medidas paliativas, pero es importante la evaluación presencial.".to_string();
        }

        let entries = self.catalog.entries();

        if let Some(entry) = find_exact(entries, text) {
            return render_recommendation(entry, MatchRule::Exact);
        }

        if let Some(entry) = fuzzy_match(entries, text, CLASSIFIER_FUZZY_THRESHOLD) {
            return render_recommendation(entry, MatchRule::Fuzzy);
        }

        let keyword_hits = find_by_keywords(entries, text);
        if !keyword_hits.is_empty() {
            return render_keyword_suggestions(&keyword_hits, &self.config);
        }

        format!(
            "No te entendí. Para ver las opciones escribe 'menu' o 'hola' o indícame el nombre del producto o síntoma. También puedes escribirnos directamente: {}",
            self.config.whatsapp_link
        )
    }
}

fn render_recommendation(entry: &CatalogEntry, rule: MatchRule) -> String {
    let functions = entry.functions_label();
    match rule {
        MatchRule::Fuzzy => format!(
            "Recomendación (similitud): {} — {}. ¿Te gustaría recibir cotización o instrucciones de uso?",
            entry.name, functions
        ),
        _ => format!(
            "Recomendación para {}: {}. ¿Te gustaría recibir cotización o instrucciones de uso?",
            entry.name, functions
        ),
    }
}

fn render_keyword_suggestions(hits: &[&CatalogEntry], config: &BotConfig) -> String {
    // De-duplicate by name, first occurrence wins, catalog order preserved.
    let mut seen = Vec::new();
    let mut descriptions = Vec::new();
    for entry in hits {
        if seen.contains(&entry.name.as_str()) {
            continue;
        }
        seen.push(entry.name.as_str());
        descriptions.push(format!("{} ({})", entry.name, entry.functions.join(", ")));
    }

    format!(
        "Te puedo recomendar los siguientes productos: {}. Si quieres cotizar, te conecto con el vendedor humano: {}",
        descriptions.join(", "),
        config.whatsapp_link
    )
}
