use crate::language::Language;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fixed KPI order of `highlights`.
pub const HIGHLIGHT_LABELS: [&str; 4] =
    ["Net Sales", "Total Orders", "Service Tips", "Total Payout Amount"];

/// Fixed section order of `sections`.
pub const SECTION_TITLES: [&str; 5] = [
    "Sales Summary",
    "Payment Methods",
    "Top Categories by Order Volume",
    "Top Categories by Revenue",
    "Fees & Payout",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Highlight {
    #[schemars(description = "KPI label in English")]
    pub label_en: String,
    #[schemars(description = "KPI label in simplified Chinese (简体中文)")]
    pub label_zh: String,
    #[schemars(description = "KPI label in Spanish")]
    pub label_es: String,
    #[schemars(description = "Formatted value, e.g. '$82,638.93' or '1,260'")]
    pub value: String,
}

impl Highlight {
    pub fn label(&self, lang: Language) -> &str {
        lang.pick(&self.label_en, &self.label_zh, &self.label_es)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OrderBreakdownRow {
    #[schemars(
        description = "Channel name in English, exactly one of: Dine In, Carry Out, Kiosk, Online Delivery, Call In, Total"
    )]
    pub channel_en: String,
    #[schemars(description = "Channel name in simplified Chinese")]
    pub channel_zh: String,
    #[schemars(description = "Channel name in Spanish")]
    pub channel_es: String,
    #[schemars(description = "Formatted integer order count, e.g. '1,260'")]
    pub orders: String,
    #[schemars(description = "Formatted USD net revenue, e.g. '$72,759.26'")]
    pub revenue: String,
    #[schemars(description = "Formatted USD tips, or '$0.00' when not broken out per channel")]
    pub tips: String,
    #[schemars(description = "True only for the final Total row")]
    pub is_total: bool,
}

impl OrderBreakdownRow {
    pub fn channel_name(&self, lang: Language) -> &str {
        lang.pick(&self.channel_en, &self.channel_zh, &self.channel_es)
    }

    /// The channel identity, keyed on the English name only.
    pub fn channel(&self) -> Option<Channel> {
        Channel::from_english(&self.channel_en)
    }
}

/// Sales channel taxonomy. Only the English identity string is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    DineIn,
    CarryOut,
    Kiosk,
    OnlineDelivery,
    CallIn,
    Total,
}

impl Channel {
    pub const ORDERED: [Channel; 6] = [
        Channel::DineIn,
        Channel::CarryOut,
        Channel::Kiosk,
        Channel::OnlineDelivery,
        Channel::CallIn,
        Channel::Total,
    ];

    pub fn from_english(name: &str) -> Option<Self> {
        match name.trim() {
            "Dine In" => Some(Channel::DineIn),
            "Carry Out" => Some(Channel::CarryOut),
            "Kiosk" => Some(Channel::Kiosk),
            "Online Delivery" => Some(Channel::OnlineDelivery),
            "Call In" => Some(Channel::CallIn),
            "Total" => Some(Channel::Total),
            _ => None,
        }
    }

    /// (English, simplified Chinese, Spanish) names the model is told to use.
    pub fn names(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Channel::DineIn => ("Dine In", "堂食", "Comer Aquí"),
            Channel::CarryOut => ("Carry Out", "外带", "Para Llevar"),
            Channel::Kiosk => ("Kiosk", "自助点餐机", "Quiosco"),
            Channel::OnlineDelivery => ("Online Delivery", "线上外卖", "Entrega en Línea"),
            Channel::CallIn => ("Call In", "电话点餐", "Por Teléfono"),
            Channel::Total => ("Total", "合计", "Total"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SectionItem {
    pub label_en: String,
    pub label_zh: String,
    pub label_es: String,
    #[schemars(description = "Formatted value; currency stays in USD and is never translated")]
    pub value: String,
    #[schemars(description = "Optional note in English, or empty string")]
    pub note_en: String,
    #[schemars(description = "Optional note in simplified Chinese, or empty string")]
    pub note_zh: String,
    #[schemars(description = "Optional note in Spanish, or empty string")]
    pub note_es: String,
}

impl SectionItem {
    pub fn label(&self, lang: Language) -> &str {
        lang.pick(&self.label_en, &self.label_zh, &self.label_es)
    }

    pub fn note(&self, lang: Language) -> Option<&str> {
        let note = lang.pick(&self.note_en, &self.note_zh, &self.note_es);
        (!note.trim().is_empty()).then_some(note)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Section {
    pub title_en: String,
    pub title_zh: String,
    pub title_es: String,
    pub items: Vec<SectionItem>,
}

impl Section {
    pub fn title(&self, lang: Language) -> &str {
        lang.pick(&self.title_en, &self.title_zh, &self.title_es)
    }
}

/// Structured monthly statement as produced by the analysis proxy.
///
/// Every user-facing string comes as an English / simplified Chinese / Spanish
/// triple; nothing is translated at display time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StatementData {
    #[schemars(description = "Reporting period, e.g. 'January 2026'")]
    pub period: String,

    #[schemars(description = "Restaurant name from the statement header")]
    pub restaurant_name: String,

    #[schemars(
        description = "Exactly 4 KPIs in this order: Net Sales, Total Orders, Service Tips, Total Payout Amount"
    )]
    pub highlights: Vec<Highlight>,

    #[schemars(
        description = "One row per channel (Dine In, Carry Out, Kiosk, Online Delivery, Call In), zero rows included, then a final Total row with is_total = true"
    )]
    pub order_breakdown: Vec<OrderBreakdownRow>,

    #[schemars(
        description = "Sections in this order: Sales Summary, Payment Methods, Top Categories by Order Volume, Top Categories by Revenue, Fees & Payout"
    )]
    pub sections: Vec<Section>,

    #[schemars(description = "2-3 sentence plain-language business insight in English")]
    pub insights_en: String,

    #[schemars(description = "The same insight in simplified Chinese (简体中文)")]
    pub insights_zh: String,

    #[schemars(description = "The same insight in Spanish")]
    pub insights_es: String,
}

impl StatementData {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(StatementData)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    pub fn insights(&self, lang: Language) -> &str {
        lang.pick(&self.insights_en, &self.insights_zh, &self.insights_es)
    }

    /// Lists the ways this record deviates from the statement contract.
    ///
    /// The Total row sums are not checked: values are display strings.
    pub fn check_contract(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.highlights.len() != HIGHLIGHT_LABELS.len() {
            problems.push(format!(
                "expected {} highlights, found {}",
                HIGHLIGHT_LABELS.len(),
                self.highlights.len()
            ));
        } else {
            for (idx, (highlight, expected)) in
                self.highlights.iter().zip(HIGHLIGHT_LABELS).enumerate()
            {
                if !highlight.label_en.trim().eq_ignore_ascii_case(expected) {
                    problems.push(format!(
                        "highlight {} should be '{}', found '{}'",
                        idx, expected, highlight.label_en
                    ));
                }
            }
        }

        let totals: Vec<usize> = self
            .order_breakdown
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_total)
            .map(|(idx, _)| idx)
            .collect();
        match totals.as_slice() {
            [] => {}
            [idx] if *idx + 1 == self.order_breakdown.len() => {}
            [idx] => problems.push(format!(
                "total row at position {} is not the last row",
                idx
            )),
            many => problems.push(format!("{} rows are marked as total", many.len())),
        }

        for row in &self.order_breakdown {
            if row.channel().is_none() {
                problems.push(format!("unknown channel '{}'", row.channel_en));
            }
        }

        if self.sections.len() != SECTION_TITLES.len() {
            problems.push(format!(
                "expected {} sections, found {}",
                SECTION_TITLES.len(),
                self.sections.len()
            ));
        }

        problems
    }

    /// Projects the record onto a single language, keeping every ordering as given.
    pub fn localize(&self, lang: Language) -> LocalizedStatement {
        LocalizedStatement {
            language: lang,
            period: self.period.clone(),
            restaurant_name: self.restaurant_name.clone(),
            highlights: self
                .highlights
                .iter()
                .map(|h| LocalizedLine {
                    label: h.label(lang).to_string(),
                    value: h.value.clone(),
                    note: None,
                })
                .collect(),
            order_breakdown: self
                .order_breakdown
                .iter()
                .map(|row| LocalizedChannelRow {
                    channel: row.channel(),
                    name: row.channel_name(lang).to_string(),
                    orders: row.orders.clone(),
                    revenue: row.revenue.clone(),
                    tips: row.tips.clone(),
                    is_total: row.is_total,
                })
                .collect(),
            sections: self
                .sections
                .iter()
                .map(|section| LocalizedSection {
                    title: section.title(lang).to_string(),
                    items: section
                        .items
                        .iter()
                        .map(|item| LocalizedLine {
                            label: item.label(lang).to_string(),
                            value: item.value.clone(),
                            note: item.note(lang).map(str::to_string),
                        })
                        .collect(),
                })
                .collect(),
            insights: self.insights(lang).to_string(),
        }
    }
}

/// Single-language view of a [`StatementData`] handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedStatement {
    pub language: Language,
    pub period: String,
    pub restaurant_name: String,
    pub highlights: Vec<LocalizedLine>,
    pub order_breakdown: Vec<LocalizedChannelRow>,
    pub sections: Vec<LocalizedSection>,
    pub insights: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedLine {
    pub label: String,
    pub value: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedChannelRow {
    #[serde(skip)]
    pub channel: Option<Channel>,
    pub name: String,
    pub orders: String,
    pub revenue: String,
    pub tips: String,
    pub is_total: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedSection {
    pub title: String,
    pub items: Vec<LocalizedLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn. History never carries the document itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
