// Prompt fragments shared by every assessment call.

/// System prompt that pins the answer language and format.
pub const JSON_ONLY_SYSTEM: &str = "Eres un asistente preciso y estructurado. \
    Responde SIEMPRE en español. \
    Tu respuesta DEBE ser únicamente un objeto JSON válido. \
    No incluyas texto fuera del objeto JSON. \
    No uses bloques de código markdown. \
    No incluyas explicaciones ni disculpas.";

/// Keeps the salary expectation out of the model's reasoning.
pub const SALARY_INSTRUCTION: &str = "\
    IMPORTANTE: La expectativa salarial se proporciona solo como contexto. \
    NO la menciones ni bases en ella tu explicación o recomendación.";
