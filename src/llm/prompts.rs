// Instruction sets for the statement analysis and chat calls.

use crate::language::Language;
use crate::schema::{Channel, StatementData, HIGHLIGHT_LABELS, SECTION_TITLES};

/// Bump whenever the analysis instructions change shape.
pub const ANALYSIS_PROMPT_VERSION: &str = "2026-01";

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"
You are a financial data extraction assistant for restaurant point-of-sale monthly statements.

## OUTPUT RULES
Analyze the attached PDF statement and return ONLY a valid JSON object matching EXACTLY the schema below.
- No markdown, no code fences, no explanation. Raw JSON only.
- Every label, title, note and channel name is given three times: `_en` (English), `_zh` (simplified Chinese, 简体中文), `_es` (Spanish).
- Notes are optional: use an empty string when there is nothing to say.
- All values remain in USD. Never translate currency or numbers.

## HIGHLIGHTS
The `highlights` array must contain exactly these 4 KPIs, in this order:
{highlights}

## ORDER BREAKDOWN (CRITICAL)
One row per order channel, then a final Total row.
- Include ALL of these channels, in this order, even when a channel has zero orders
  (use orders "0", revenue "$0.00", tips "$0.00"):
{channels}
- Carry Out covers take-out. Online Delivery covers DoorDash, Uber Eats, Grubhub and similar.
- For each channel extract the number of orders, net revenue, and tips ("$0.00" if tips are not broken out per channel).
- The LAST row must be the Total row with `is_total: true`, summing all channels. No other row has `is_total: true`.
- Channel names must be exactly the names listed above in each language.

## SECTIONS
The `sections` array must include ALL of these sections, in this order:
{sections}
- Sales Summary: Gross Sales, Discounts, Net Sales Refunds, Net Sales, Taxes, Service Tips, Voided Items, Amount Receivable.
- Payment Methods: each payment method with its amount.
- Top Categories: the top 5 categories.
- Fees & Payout: every fee line item and the total payout.

## INSIGHTS
`insights_en` is a 2-3 sentence plain-language business insight for the restaurant owner.
`insights_zh` and `insights_es` carry the same insight in simplified Chinese and Spanish.
"#;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant for restaurant owners analyzing their point-of-sale monthly statements. A PDF of the statement is attached to the first message in the conversation.

Answer the user's questions about the statement concisely and accurately. You can reference specific numbers, line items, fees, order channels, or any other data in the PDF. Keep answers focused and practical.

If the user asks something not answerable from the statement, say so clearly.";

/// Full analysis instructions: the fixed rules followed by the JSON schema of [`StatementData`].
pub fn analysis_system_prompt() -> Result<String, serde_json::Error> {
    let highlights = HIGHLIGHT_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{}. {}", i + 1, label))
        .collect::<Vec<_>>()
        .join("\n");
    let channels = Channel::ORDERED
        .iter()
        .map(|channel| {
            let (en, zh, es) = channel.names();
            format!("  - \"{}\" / \"{}\" / \"{}\"", en, zh, es)
        })
        .collect::<Vec<_>>()
        .join("\n");
    let sections = SECTION_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{}. {}", i + 1, title))
        .collect::<Vec<_>>()
        .join("\n");

    let rules = ANALYSIS_SYSTEM_PROMPT
        .replace("{highlights}", &highlights)
        .replace("{channels}", &channels)
        .replace("{sections}", &sections);

    Ok(format!(
        "{}\n## SCHEMA (version {})\n{}\n\nReturn ONLY the JSON object, nothing else.",
        rules.trim(),
        ANALYSIS_PROMPT_VERSION,
        StatementData::schema_as_json()?
    ))
}

pub fn analysis_user_text(filename: Option<&str>) -> String {
    match filename.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!(
            "Please analyze this monthly POS statement ({}) and return the structured JSON data as specified.",
            name
        ),
        None => "Please analyze this monthly POS statement and return the structured JSON data as specified.".to_string(),
    }
}

pub fn chat_system_prompt(lang: Language) -> String {
    format!("{}\n\n{}", CHAT_SYSTEM_PROMPT, lang.reply_instruction())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_has_no_placeholders() {
        let prompt = analysis_system_prompt().unwrap();
        assert!(!prompt.contains("{highlights}"));
        assert!(!prompt.contains("{channels}"));
        assert!(!prompt.contains("{sections}"));
        assert!(prompt.contains("4. Total Payout Amount"));
        assert!(prompt.contains("\"Online Delivery\" / \"线上外卖\" / \"Entrega en Línea\""));
        assert!(prompt.contains("5. Fees & Payout"));
        assert!(prompt.contains(ANALYSIS_PROMPT_VERSION));
        assert!(prompt.contains("order_breakdown"));
    }

    #[test]
    fn test_user_text_mentions_filename_when_present() {
        assert!(analysis_user_text(Some("jan.pdf")).contains("(jan.pdf)"));
        assert!(!analysis_user_text(Some("  ")).contains('('));
        assert!(!analysis_user_text(None).contains('('));
    }

    #[test]
    fn test_chat_prompt_follows_language() {
        assert!(chat_system_prompt(Language::Zh).ends_with("Respond in simplified Chinese (简体中文)."));
        assert!(chat_system_prompt(Language::En).ends_with("Respond in English."));
    }
}
