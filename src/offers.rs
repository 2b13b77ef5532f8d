//! The two product offers the backend can propose
//!
//! When the quick replies carry both offer names the presenter shows rich
//! cards instead of plain buttons. Whether to show them is derived from the
//! quick-reply set alone.

use serde::Serialize;

/// Rich presentation for one offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfferCard {
    /// Quick reply sent when the card is picked
    pub value: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub features: &'static [&'static str],
    pub price: &'static str,
}

pub const ZEN_SANTE: &str = "Zen Santé Évolutive";
pub const FMA_VITALIA: &str = "FMA Vitalia";

pub const OFFER_NAMES: [&str; 2] = [ZEN_SANTE, FMA_VITALIA];

pub const OFFER_CARDS: [OfferCard; 2] = [
    OfferCard {
        value: ZEN_SANTE,
        title: ZEN_SANTE,
        subtitle: "Zen",
        features: &[
            "Accès aux médecines douces pour un bien-être optimal",
            "Réseaux Kalixia pour des soins de qualité",
            "Téléconsultation illimitée",
            "Chambre particulière & transports",
        ],
        price: "À partir de 29 €/mois",
    },
    OfferCard {
        value: FMA_VITALIA,
        title: FMA_VITALIA,
        subtitle: "FMA",
        features: &[
            "Garantie frais réel hospitalisation",
            "Frais réel hospitalisation",
            "Tiers payant",
            "Service à domicile",
        ],
        price: "À partir de 29 €/mois",
    },
];

/// Both offer names present, in any order
pub fn is_offer_set(options: &[String]) -> bool {
    options.len() >= 2
        && OFFER_NAMES
            .iter()
            .all(|name| options.iter().any(|o| o == name))
}

/// Cards to render for this quick-reply set, empty when it isn't the offer pair
pub fn offer_cards(options: &[String]) -> &'static [OfferCard] {
    if is_offer_set(options) {
        &OFFER_CARDS
    } else {
        &[]
    }
}
