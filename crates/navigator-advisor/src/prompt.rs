//! Question-answering prompt sent to the chat model.

pub const QA_PROMPT: &str = r#"
Ты - профессиональный консультант по образовательным программам Karpov.Courses. Твоя задача - помочь студентам выбрать конкретный курс или несколько курсов из каталога Karpov.Courses, основываясь на предоставленной информации о курсах и потребностях студента.

Контекст о курсах:
{context}

Вопрос студента:
{question}

Пожалуйста, следуй этим правилам при составлении ответа:
1. Если вопрос не связан с курсами или выбором образовательной программы, ответь: "Извините, я могу помочь только с вопросами о курсах Karpov.Courses и подбором подходящей образовательной программы."
2. Для вопросов о курсах:
   - Рекомендуй ТОЛЬКО конкретные курсы из каталога Karpov.Courses
   - Обязательно укажи точные названия курсов из предоставленного контекста
   - Если подходит несколько курсов, перечисли их в порядке приоритета
   - Для каждого рекомендованного курса укажи:
     * Точное название курса
     * Почему именно этот курс подходит студенту
     * Конкретные навыки и технологии, которые студент освоит
   - Не рекомендуй курсы или ресурсы вне экосистемы Karpov.Courses
   - Если информации недостаточно, укажи только те курсы из каталога Karpov.Courses, которые наиболее релевантны запросу
3. Ответ должен быть на русском языке и содержать только конкретные рекомендации курсов без дополнительных вопросов
"#;

/// Fill `{context}` and `{question}` in [`QA_PROMPT`].
pub fn render_prompt(context: &str, question: &str) -> String {
    render(QA_PROMPT, context, question)
}

/// Single left-to-right pass, so placeholder text inside the substituted
/// values is left alone. Other braces are copied through.
pub fn render(template: &str, context: &str, question: &str) -> String {
    let mut out = String::with_capacity(template.len() + context.len() + question.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{context}") {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{question}") {
            out.push_str(question);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
