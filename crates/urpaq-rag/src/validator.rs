use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use urpaq_core::types::ValidationIssue;

const MIN_RESPONSE_CHARS: usize = 10;
const MAX_RESPONSE_CHARS: usize = 5000;
/// A cut at the last period is only taken when it keeps at least this much.
const MIN_SENTENCE_CUT: usize = MAX_RESPONSE_CHARS - 200;

pub const EMPTY_RESPONSE_TEXT: &str = "Извините, не удалось сформировать ответ. Попробуйте переформулировать вопрос.";
pub const TOO_SHORT_TEXT: &str = "Ответ слишком короткий. Пожалуйста, уточните ваш вопрос.";
pub const INSUFFICIENT_KNOWLEDGE_TEXT: &str = "К сожалению, в базе знаний недостаточно информации для ответа на ваш вопрос. \
     Попробуйте задать более конкретный вопрос или обратитесь к администратору.";
const TRUNCATION_NOTICE: &str = "\n\n[Ответ сокращен для удобства чтения]";

static HALLUCINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(я не знаю|не могу сказать|информация отсутствует|данных нет)").expect("hallucination pattern")
});
static INLINE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").expect("space pattern"));
static EXTRA_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline pattern"));
static CONTROL_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[INST\]|\[/INST\]|<\|.*?\|>").expect("token pattern"));
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*][ \t]+").expect("bullet pattern"));
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(\d+)[.):][ \t]+").expect("numbered pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub processed_response: String,
    pub issue: ValidationIssue,
}

impl ValidationResult {
    fn new(is_valid: bool, processed_response: impl Into<String>, issue: ValidationIssue) -> Self {
        Self { is_valid, processed_response: processed_response.into(), issue }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn validate(&self, response: &str) -> ValidationResult {
        if response.trim().is_empty() {
            warn!("Empty response received");
            return ValidationResult::new(false, EMPTY_RESPONSE_TEXT, ValidationIssue::EmptyResponse);
        }

        let len = response.chars().count();
        if len < MIN_RESPONSE_CHARS {
            warn!("Response too short: {} chars", len);
            return ValidationResult::new(false, TOO_SHORT_TEXT, ValidationIssue::TooShort);
        }

        if len > MAX_RESPONSE_CHARS {
            warn!("Response too long: {} chars, truncating", len);
            return ValidationResult::new(true, truncate_response(response), ValidationIssue::Truncated);
        }

        if HALLUCINATION.is_match(response) {
            warn!("Potential hallucination detected in response");
            return ValidationResult::new(false, INSUFFICIENT_KNOWLEDGE_TEXT, ValidationIssue::Hallucination);
        }

        let processed = post_process(response);
        info!("Response validated successfully, length: {}", processed.chars().count());
        ValidationResult::new(true, processed, ValidationIssue::None)
    }
}

fn truncate_response(response: &str) -> String {
    let mut truncated: String = response.chars().take(MAX_RESPONSE_CHARS).collect();
    if let Some(byte_pos) = truncated.rfind('.') {
        if truncated[..byte_pos].chars().count() > MIN_SENTENCE_CUT {
            truncated.truncate(byte_pos + 1);
        }
    }
    truncated.push_str(TRUNCATION_NOTICE);
    truncated
}

/// Whitespace tidy-up, model control tokens removed, list markers unified.
pub fn post_process(response: &str) -> String {
    let text = INLINE_SPACE.replace_all(response.trim(), " ");
    let text = EXTRA_NEWLINES.replace_all(&text, "\n\n");
    let text = CONTROL_TOKENS.replace_all(&text, "");
    let text = BULLET.replace_all(&text, "• ");
    let text = NUMBERED.replace_all(&text, "${1}. ");
    text.trim().to_string()
}
