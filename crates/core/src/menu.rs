//! The scripted reply texts: welcome menu, category sub-menus, and per-product
//! detail cards. These are fixed marketing copy and are sent verbatim.
//!
//! The lookup functions here expect text already passed through
//! [`crate::normalize::normalize`]; every needle below is written in that
//! normalized form (lower-case, no diacritics).

pub const ASK_NAME: &str =
    "👋 ¡Hola! Soy el asistente virtual de AGRO MONTES. ¿Cómo te llamas?";

pub const ASK_SHIPPING_LOCATION: &str =
    "¿A qué lugar deseas que realicemos el envío? Indica ciudad / distrito / país.";

pub const APOLOGY: &str =
    "Lo siento, ha ocurrido un error al procesar tu mensaje. Intenta de nuevo más tarde.";

const MENU_OPTIONS: &str = "Por favor, elige una opción del menú:\n\n\
     1️⃣ Fitoprotectores (Control de Plagas y Enfermedades)\n\
     2️⃣ Nutrientes (Fertilización Foliar)\n\
     3️⃣ Bioestimulantes (Algas y Aminoácidos)\n\
     4️⃣ Mayor Productividad (Cosecha, Peso y Calibre) 🚀\n\
     5️⃣ Reguladores y Coadyuvantes (pH y Adherentes) 💧\n\
     6️⃣ Asesoría Técnica (Hablar con un Ingeniero)";

/// The steady-state menu, personalized when a name was captured.
pub fn welcome_menu(name: &str) -> String {
    let greet = if name.is_empty() {
        "👋 ".to_string()
    } else {
        format!("¡Hola {name}! ")
    };

    format!(
        "{greet}👋 ¡Bienvenido a AGRO MONTES! Soluciones innovadoras para la rentabilidad de tu cultivo. 🇵🇪\n\
         Soy un asistente virtual agrónomo de AGRO MONTES, listo para ayudarte con tu cultivo.\n\n{MENU_OPTIONS}"
    )
}

/// Menu variant sent right after the customer tells us their name.
pub fn onboarding_menu(name: &str) -> String {
    format!(
        "👋 ¡Bienvenido a AGRO MONTES, {name}! Soluciones innovadoras para la rentabilidad de tu cultivo. 🇵🇪\n\n{MENU_OPTIONS}"
    )
}

pub fn shipping_saved(location: &str) -> String {
    format!(
        "Perfecto. He anotado el lugar de envío: {location}. Te confirmamos precio y disponibilidad en unos minutos."
    )
}

pub fn shipping_confirmed(location: &str) -> String {
    format!("Sí, hacemos envíos a {location}. Te confirmaremos precio y tiempos.")
}

/// Fixed category / contact texts for menu options 1-6 and their keyword
/// aliases. Evaluated in menu order; first hit wins.
pub fn category_reply(msg: &str) -> Option<&'static str> {
    if msg == "1" || msg.contains("fito") {
        return Some(
            "🛡️ LÍNEA FITOPROTECTORES\n\
             Protección sanitaria del cultivo.\n\n\
             🛡️ LÍNEA FITOPROTECTORES Aquí tienes nuestros productos para sanidad:\n\n\
             🔹 SULFA MAX 87: Azufre + Nitrógeno.\n\
             🔹 DUO MIX OIL: Insecticida natural (Ajo + Ají).\n\
             🔹 KANELO OIL: Aceite de Canela (Arañita/Mosca).\n\
             🔹 PROTECCION Cu 270: Cobre sistémico (Bactericida).\n\
             🔹 OMEGA OIL 369: Aceite de Salmón (Queresas).",
        );
    }

    if msg == "2" || msg.contains("nutri") {
        return Some(
            "⚡ LÍNEA NUTRIENTES\n\
             Fertilizantes para corregir deficiencias.\n\n\
             ⚡ LÍNEA NUTRIENTES Fertilizantes foliares de alta asimilación:\n\n\
             🔸 BORO B15: Para floración.\n\
             🔸 ZINC Zn14: Para crecimiento (Auxinas).\n\
             🔸 MAGNESIO Mg11: Para el verdor (Fotosíntesis).\n\
             🔸 EQUILIBRA NPK: Fórmula balanceada 20-20-20.\n\
             🔸 FOSFORO P45: Energía a la raíz.\n\
             🔸 CALCIO Ca35: Dureza de fruto.\n\
             🔸 BROTE MAX: Arranque vegetativo (40-10-10).",
        );
    }

    if msg == "3" || msg.contains("bio") {
        return Some(
            "🌱 LÍNEA BIOESTIMULANTES\n\
             Para situaciones de estrés y estimulación.\n\n\
             🌱 LÍNEA BIOESTIMULANTES Reactiva tu cultivo:\n\n\
             🍃 DUO ALGAS FORTE: Extracto de algas marinas.\n\
             🍃 AMINOZ V32: Aminoácidos + Energía.\n\
             🍃 AMINOPEZ ++: Proteína de Salmón.\n\
             🍃 + RAIZ: Potente enraizador.\n\
             🍃 SÚPER FÓLICO: Ácido fólico regenerador.",
        );
    }

    if msg == "4" || msg.contains("productividad") {
        return Some(
            "🚀 *MAYOR PRODUCTIVIDAD*\n\
             Productos clave para Cosecha y Calibre:\n\n\
             💰 POTASIO K50: Maduración y Peso.\n\
             💰 AMARRE 3.5: Cuajado potente.\n\
             💰 CYTOKING: Citoquininas (Calibre).\n\
             💰 GLOBO GIB: Giberelinas (Tamaño).",
        );
    }

    if msg == "5"
        || msg.contains("regulador")
        || msg.contains("coadyuvante")
        || msg.contains("adherente")
    {
        return Some(
            "💧 *REGULADORES Y COADYUVANTES*\n\
             Optimiza la aplicación y la absorción:\n\n\
             🧪 Regulador de pH: Acidificante.\n\
             🧪 Adherente: Pegante agrícola.\n\
             🧪 Dispersante: Mojante y dispersante.",
        );
    }

    if msg == "6" || msg.contains("asesor") || msg.contains("celular") || msg.contains("asesoria") {
        return Some(
            "👨‍🌾 *Asesoría Técnica AGRO MONTES*\n\n\
             📞 Celular: 952 348 485\n\
             🌐 agromontes-mvp: https://outworlddebourer.github.io/agromontes-mvp/\n\
             📍 Atendemos en todos los valles agrícolas del Perú.",
        );
    }

    None
}

/// Fixed product-detail cards keyed by ~24 trigger words. Ordered; first hit
/// wins, so broad triggers like `ph` sit near the end of the chain.
pub fn product_reply(msg: &str) -> Option<&'static str> {
    if msg.contains("sulfa") {
        return Some(
            "🦠 SULFA MAX 87® SC: Azufre 87% + N 11%.\n\
             Controla Oídio y Ácaros sin manchar el fruto.\n\
             Dosis: 500ml/Cilindro.",
        );
    }
    if msg.contains("duo mix") || (msg.contains("ajo") && msg.contains("aji")) {
        return Some(
            "🐜 DUO MIX OIL®: Extracto de Ajo + Ají.\n\
             Insecticida natural que daña el sistema nervioso de la plaga.\n\
             Dosis: 200 - 700ml/Cilindro.",
        );
    }
    if msg.contains("kanelo") {
        return Some(
            "🕷️ KANELO OIL 2.0®: Aceite de Canela.\n\
             Excelente para Arañita Roja y Mosca Blanca.\n\
             Acción por contacto. Dosis: 200 - 700ml/Cilindro.",
        );
    }
    if msg.contains("proteccion") || msg.contains("cobre") {
        return Some(
            "🛡️ PROTECCION Cu 270: Cobre Sistémico.\n\
             Controla hongos y bacterias en raíz y tallo. Rápida absorción.\n\
             Dosis: 400-500ml/Cilindro.",
        );
    }
    if msg.contains("omega") || msg.contains("salmon") {
        return Some(
            "🐟 OMEGA OIL 369: Aceite de Salmón.\n\
             Aumenta el control de plagas y aporta ácidos grasos que reducen el estrés.\n\
             Dosis: 1.5-2L/Cilindro.",
        );
    }
    if msg.contains("boro") {
        return Some(
            "🌼 BORO B15: Evita la caída de flores y mejora la polinización.\n\
             Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("zinc") || msg.contains("zn14") {
        return Some(
            "🌿 ZINC Zn14: Zinc quelatado 14%.\n\
             Activa el crecimiento y corrige deficiencias. Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("magnesio") || msg.contains("mg11") {
        return Some(
            "🍃 MAGNESIO Mg11: Quelatado 11%.\n\
             Potencia la fotosíntesis y corrige clorosis. Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("equilibra") || msg.contains("20 20 20") {
        return Some(
            "⚖️ EQUILIBRA NPK 20-20-20: Fórmula balanceada multiuso.\n\
             Dosis: 1-2L/Cilindro.",
        );
    }
    if msg.contains("fosforo") || msg.contains("p45") {
        return Some(
            "⚡ FOSFORO P45: Alta concentración de fósforo (45%).\n\
             Uso: desarrollo radicular y floración. Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("calcio") || msg.contains("ca35") {
        return Some(
            "🧱 CALCIO Ca35: Calcio 35% + aminoácidos.\n\
             Mejora la dureza y reduce rajaduras. Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("potasio") || msg.contains("k50") {
        return Some(
            "🍇 POTASIO K50: Potasio 50% + Algas.\n\
             Mejora maduración, peso y Brix. Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("brote") || msg.contains("40 10 10") {
        return Some(
            "🌱 BROTE MAX (40-10-10): Alto en nitrógeno para arranque.\n\
             Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("algas") || msg.contains("duo") {
        return Some(
            "🌊 DUO ALGAS FORTE: Extracto marino para recuperar plantas estresadas (frío/calor).\n\
             Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("amarre") {
        return Some(
            "🔗 AMARRE 3.5: Ca + B + Zn.\n\
             \"Amarra\" la flor para asegurar cuajado. Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("aminoz") {
        return Some(
            "🧬 AMINOZ V32: Aminoácidos 32% + N.\n\
             Anti-estrés y aporte de energía rápida. Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("aminopez") {
        return Some(
            "🐟 AMINOPEZ ++PLUS: Proteína de Salmón hidrolizada.\n\
             Rápida construcción de tejidos. Dosis: 300-500ml foliar.",
        );
    }
    if msg.contains("raiz") || msg.contains("enraiz") {
        return Some(
            "🌱 + RAIZ: Bioestimulante radicular de alto poder.\n\
             Dosis: 500ml-1L/Cilindro.",
        );
    }
    if msg.contains("globo") || msg.contains("gib") {
        return Some(
            "📏 GLOBO GIB: Giberelinas 40%.\n\
             Alargamiento celular y rompimiento de dormancia. Dosis: 30-125ml/200L.",
        );
    }
    if msg.contains("folico") {
        return Some(
            "🧬 SÚPER FÓLICO 5.7: Ácido Fólico + Algas + Aminoácidos.\n\
             División celular y regeneración. Dosis: 250-500ml/200L.",
        );
    }
    if msg.contains("regulador") || msg.contains("ph") {
        return Some(
            "💧 *REGULADOR DE pH*\n\
             Acidifica el agua para mejorar la eficacia de los agroquímicos.\n\
             💧 Dosis referencial: 100 ml / Cilindro (ajustar según análisis de agua).",
        );
    }
    if msg.contains("adherente") {
        return Some(
            "💧 *ADHERENTE*\n\
             Mejora la adherencia de gotas y reduce lavado por lluvia.\n\
             💧 Dosis referencial: 50 - 100 ml / Cilindro.",
        );
    }
    if msg.contains("dispersa") || msg.contains("mojante") {
        return Some(
            "💧 *DISPERSANTE / MOJANTE*\n\
             Mejora la repartición del producto y reduce gotas.\n\
             💧 Dosis referencial: 100 - 200 ml / Cilindro.",
        );
    }
    if msg.contains("cyto") || msg.contains("king") {
        return Some(
            "👑 CYTOKING POWER: Citoquininas para mejorar calibre y brotamiento.\n\
             Dosis: 250-500ml/Cilindro.",
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn welcome_menu_personalizes_when_named() {
        let menu = welcome_menu("Carlos");
        assert!(menu.starts_with("¡Hola Carlos! "));
        assert!(menu.contains("Asesoría Técnica"));
    }

    #[test]
    fn digits_map_to_category_texts() {
        assert!(category_reply("1").unwrap().contains("FITOPROTECTORES"));
        assert!(category_reply("4").unwrap().contains("MAYOR PRODUCTIVIDAD"));
        assert!(category_reply("6").unwrap().contains("952 348 485"));
    }

    #[test]
    fn category_keywords_match_after_normalization() {
        let msg = normalize("quiero Asesoría técnica");
        assert!(category_reply(&msg).unwrap().contains("Asesoría Técnica"));
    }

    #[test]
    fn product_triggers_resolve_in_order() {
        assert!(product_reply("kanelo").unwrap().contains("KANELO OIL"));
        // "duo" alone lands on the algas card, "duo mix" on the insecticide.
        assert!(product_reply("duo").unwrap().contains("DUO ALGAS FORTE"));
        assert!(product_reply("duo mix").unwrap().contains("DUO MIX OIL"));
        assert!(product_reply(&normalize("tengo problemas de pH")).unwrap().contains("REGULADOR"));
    }

    #[test]
    fn unknown_text_matches_nothing() {
        assert!(category_reply("tractor amarillo").is_none());
        assert!(product_reply("tractor amarillo").is_none());
    }
}
