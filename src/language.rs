use serde::{Deserialize, Serialize};

/// Display and reply language. Passed explicitly into every call that
/// produces user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
    Es,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Zh, Language::Es];

    /// Parses a language code, falling back to English for anything unrecognized.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "zh-hans" => Language::Zh,
            "es" => Language::Es,
            _ => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::Es => "es",
        }
    }

    /// Picks the string for this language out of a parallel triple.
    pub fn pick<'a>(self, en: &'a str, zh: &'a str, es: &'a str) -> &'a str {
        match self {
            Language::En => en,
            Language::Zh => zh,
            Language::Es => es,
        }
    }

    pub fn reply_instruction(self) -> &'static str {
        self.pick(
            "Respond in English.",
            "Respond in simplified Chinese (简体中文).",
            "Respond in Spanish.",
        )
    }

    /// Assistant line shown in place of a failed chat reply.
    pub fn chat_failure_message(self) -> &'static str {
        self.pick(
            "Sorry, I couldn't answer that right now. Please try again.",
            "抱歉，暂时无法回答，请重试。",
            "Lo siento, no pude responder en este momento. Inténtalo de nuevo.",
        )
    }

    pub fn invalid_file_message(self) -> &'static str {
        self.pick(
            "Please upload a PDF file.",
            "请上传PDF文件。",
            "Por favor sube un archivo PDF.",
        )
    }

    pub fn file_too_large_message(self) -> &'static str {
        self.pick(
            "File must be under 20MB.",
            "文件大小不能超过20MB。",
            "El archivo no puede superar 20MB.",
        )
    }
}

/// Wire wrapper that parses any string (or null) into a [`Language`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct LenientLanguage(pub Language);

// Lenient on the wire: an unknown `lang` must not fail the whole request.
impl<'de> Deserialize<'de> for LenientLanguage {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = Option::<String>::deserialize(deserializer)?;
        Ok(LenientLanguage(
            code.as_deref().map(Language::from_code).unwrap_or_default(),
        ))
    }
}

impl From<LenientLanguage> for Language {
    fn from(value: LenientLanguage) -> Self {
        value.0
    }
}
