//! Rule-based reply selection for the chat endpoint.
//!
//! Intents are scanned first and the first enabled intent with a pattern contained in the
//! message wins the intent pass. The FAQ pass always runs afterwards, and the first enabled
//! FAQ whose question is contained in the message replaces whatever the intent pass chose.
//! A FAQ match therefore always beats an intent match. Comparisons are case-insensitive
//! substring checks; when nothing matches the bot's welcome message is returned.

use crate::infrastructure::entities::{Faq, Intent};

/// Picks the reply for `message` from rules given in scan order.
pub fn select_reply<'a>(
    message: &str,
    welcome_message: &'a str,
    intents: &'a [Intent],
    faqs: &'a [Faq],
) -> &'a str {
    let message = message.to_lowercase();
    let mut reply = welcome_message;

    if let Some(intent) = intents
        .iter()
        .filter(|intent| intent.enabled)
        .find(|intent| intent.patterns.iter().any(|p| contains(&message, p)))
    {
        reply = &intent.response;
    }

    if let Some(faq) = faqs
        .iter()
        .filter(|faq| faq.enabled)
        .find(|faq| contains(&message, &faq.question))
    {
        reply = &faq.answer;
    }

    reply
}

/// `haystack` must already be lowercased.
fn contains(haystack: &str, needle: &str) -> bool {
    haystack.contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    const WELCOME: &str = "Hello! How can I help you?";

    fn intent(patterns: &[&str], response: &str, enabled: bool) -> Intent {
        Intent {
            id: Uuid::new_v4(),
            bot_id: Uuid::nil(),
            name: response.to_owned(),
            patterns: Json(patterns.iter().map(|p| p.to_string()).collect()),
            response: response.to_owned(),
            enabled,
            created_at: Utc::now(),
        }
    }

    fn faq(question: &str, answer: &str, enabled: bool) -> Faq {
        Faq {
            id: Uuid::new_v4(),
            bot_id: Uuid::nil(),
            question: question.to_owned(),
            answer: answer.to_owned(),
            category: None,
            enabled,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn falls_back_to_welcome_message() {
        let intents = [intent(&["price"], "See /pricing", true)];
        let faqs = [faq("refund", "30-day refund policy", true)];

        assert_eq!(select_reply("good morning", WELCOME, &intents, &faqs), WELCOME);
        assert_eq!(select_reply("anything", WELCOME, &[], &[]), WELCOME);
    }

    #[test]
    fn any_intent_pattern_matches() {
        let intents = [intent(&["price", "cost"], "See /pricing", true)];

        assert_eq!(
            select_reply("what's your cost?", WELCOME, &intents, &[]),
            "See /pricing"
        );
    }

    #[test]
    fn matching_ignores_case() {
        let intents = [intent(&["help"], "How can I assist?", true)];
        let faqs = [faq("Opening HOURS", "9 to 5", true)];

        assert_eq!(
            select_reply("I need HELP", WELCOME, &intents, &[]),
            "How can I assist?"
        );
        assert_eq!(
            select_reply("what are your opening hours", WELCOME, &[], &faqs),
            "9 to 5"
        );
    }

    #[test]
    fn faq_overrides_intent() {
        let intents = [intent(&["refund"], "talk to sales", true)];
        let faqs = [faq("refund", "30-day refund policy", true)];

        assert_eq!(
            select_reply("what is your refund policy", WELCOME, &intents, &faqs),
            "30-day refund policy"
        );
    }

    #[test]
    fn first_enabled_rule_in_scan_order_wins() {
        let intents = [
            intent(&["order"], "first", true),
            intent(&["order"], "second", true),
        ];
        let faqs = [faq("order", "faq first", true), faq("order", "faq second", true)];

        assert_eq!(select_reply("my order", WELCOME, &intents, &[]), "first");
        assert_eq!(select_reply("my order", WELCOME, &intents, &faqs), "faq first");
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let intents = [
            intent(&["refund"], "disabled intent", false),
            intent(&["refund"], "enabled intent", true),
        ];
        let faqs = [faq("refund", "disabled faq", false)];

        assert_eq!(
            select_reply("refund please", WELCOME, &intents, &faqs),
            "enabled intent"
        );

        let only_disabled = [intent(&["refund"], "disabled intent", false)];
        assert_eq!(
            select_reply("refund please", WELCOME, &only_disabled, &faqs),
            WELCOME
        );
    }

    #[test]
    fn padded_trigger_needs_the_padding() {
        let faqs = [faq(" hours ", "9 to 5", true)];

        assert_eq!(select_reply("your hours today", WELCOME, &[], &faqs), "9 to 5");
        assert_eq!(select_reply("opening hours?", WELCOME, &[], &faqs), WELCOME);
    }

    #[test]
    fn message_must_contain_question_not_the_reverse() {
        let faqs = [faq("how do refunds work", "30-day refund policy", true)];

        assert_eq!(select_reply("refunds", WELCOME, &[], &faqs), WELCOME);
    }
}
