use tracing::info;

use urpaq_core::types::{ProcessedQuery, QueryCategory, ScoredDocument};

const MAX_CONTEXT_CHARS: usize = 4000;
const SEPARATOR: &str = "\n---\n";
pub const NOTHING_FOUND: &str = "Информация не найдена в базе знаний.";

#[derive(Debug, Default, Clone, Copy)]
pub struct ContextBuilder;

impl ContextBuilder {
    /// Numbered documents between a header and footer. Stops before the
    /// document that would take the total past the limit; the first one is
    /// always kept.
    pub fn build_context(&self, documents: &[ScoredDocument]) -> String {
        if documents.is_empty() {
            return NOTHING_FOUND.to_string();
        }

        let mut context = String::from("=== НАЙДЕННАЯ ИНФОРМАЦИЯ ===\n\n");
        let mut total = 0usize;
        let mut used = 0usize;

        for doc in documents {
            let formatted = format_document(doc, used + 1);
            let len = formatted.chars().count();
            if used > 0 && total + len > MAX_CONTEXT_CHARS {
                info!("Context limit reached, using {} documents", used);
                break;
            }
            context.push_str(&formatted);
            context.push_str(SEPARATOR);
            total += len;
            used += 1;
        }

        context.push_str("\n=== КОНЕЦ ИНФОРМАЦИИ ===\n");
        info!("Built context with {} documents, total length: {}", used, total);
        context
    }

    pub fn build_prompt(&self, context: &str, question: &str, processed: &ProcessedQuery) -> String {
        format!(
            "Ты - AI помощник Дворца школьников \"Digital Urpaq\".\n\
             \n\
             ТВОЯ ЗАДАЧА:\n\
             - Ответить на вопрос пользователя, используя ТОЛЬКО предоставленную информацию\n\
             - Быть точным, конкретным и полезным\n\
             - Если информации недостаточно, честно сказать об этом\n\
             - Отвечать на русском языке\n\
             \n\
             {hint}\n\
             \n\
             {context}\n\
             \n\
             ВОПРОС ПОЛЬЗОВАТЕЛЯ:\n\
             {question}\n\
             \n\
             ИНСТРУКЦИИ:\n\
             1. Внимательно изучи найденную информацию\n\
             2. Найди релевантные части, которые отвечают на вопрос\n\
             3. Сформулируй четкий и полный ответ\n\
             4. Если нужно, структурируй ответ списком или таблицей\n\
             5. Не придумывай информацию, которой нет в документах\n\
             \n\
             ОТВЕТ:\n",
            hint = category_hint(processed.category),
        )
    }
}

fn format_document(doc: &ScoredDocument, index: usize) -> String {
    format!("Документ {}: {}\nРелевантность: {:.2}\n\n{}", index, doc.name(), doc.score, doc.text())
}

pub fn category_hint(category: QueryCategory) -> &'static str {
    match category {
        QueryCategory::Schedule => "КАТЕГОРИЯ: Расписание\nОбрати особое внимание на время, дни недели и смены.",
        QueryCategory::Rooms => "КАТЕГОРИЯ: Кабинеты и лаборатории\nОпиши оборудование и возможности помещений.",
        QueryCategory::Teachers => "КАТЕГОРИЯ: Учителя и педагоги\nУкажи имена, квалификацию и достижения.",
        QueryCategory::Directions => "КАТЕГОРИЯ: Направления и кружки\nОпиши программы, возраст участников и условия.",
        QueryCategory::Contacts => "КАТЕГОРИЯ: Контакты\nУкажи точные телефоны, адреса и время работы.",
        QueryCategory::General => "КАТЕГОРИЯ: Общая информация\nДай полный и информативный ответ.",
    }
}
