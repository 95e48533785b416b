// Prompt assembly for compliance answers
use crate::types::Chunk;

/// Opening delimiter; the chunk's source label follows
pub const CHUNK_BEGIN: &str = "--- INICIO DEL FRAGMENTO DE:";
/// Closing delimiter
pub const CHUNK_END: &str = "--- FIN DEL FRAGMENTO ---";

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

/// Fixed GuardianAI instruction template
pub const COMPLIANCE_TEMPLATE: &str = r#"Eres **GuardianAI**, asesor estratégico de IA especializado en la Ley de Protección de Datos Personales de Chile (Ley 21.719).
**Tu misión:** entregar respuestas claras, precisas y accionables combinando dos fuentes:
- El texto oficial de la ley.
- El análisis estratégico experto de la base de conocimiento.
---
### Contexto Recuperado
{context}
### Consulta del Cliente
{question}
---
### Instrucciones de Respuesta
1. **Sintetiza e integra**: no copies el contexto literalmente; combina lo normativo con el análisis estratégico.
2. **Distingue fuentes**:
- Lo que dice la ley → "Según el Artículo X de la Ley 21.719..."
- Lo que aporta el análisis → "El análisis estratégico indica que..."
3. **Tono consultivo**: ejecutivo, claro y orientado a la acción; prioriza riesgos y oportunidades.
4. **Recomendaciones**: cuando sea posible, propone pasos concretos para el cliente.
5. **Citas**: al final, lista brevemente los documentos o fragmentos utilizados.
6. **Si falta información**: indica la limitación y sugiere la mejor aproximación posible.
7. **Disclaimer obligatorio**: termina siempre con:
> *Nota: Esta respuesta es de carácter informativo y estratégico. No constituye asesoramiento legal formal.*
"#;

/// Render chunks as delimited, source-labelled blocks
///
/// Output order follows input order; callers pass chunks already ranked.
/// Repeated sources are rendered once per chunk.
pub fn format_docs_for_prompt(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(format_chunk)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_chunk(chunk: &Chunk) -> String {
    format!(
        "{} {} ---\nContenido: {}\n{}\n",
        CHUNK_BEGIN,
        chunk.source_label(),
        chunk.page_content,
        CHUNK_END
    )
}

/// Builds the generation prompt from the template
#[derive(Debug, Clone)]
pub struct PromptFormatter {
    template: String,
}

impl PromptFormatter {
    /// Formatter using [`COMPLIANCE_TEMPLATE`]
    pub fn new() -> Self {
        Self {
            template: COMPLIANCE_TEMPLATE.to_string(),
        }
    }

    /// Custom template; must contain `{context}` and `{question}` exactly once each
    pub fn with_template(template: impl Into<String>) -> Option<Self> {
        let template = template.into();
        if template.matches(CONTEXT_SLOT).count() == 1 && template.matches(QUESTION_SLOT).count() == 1 {
            Some(Self { template })
        } else {
            None
        }
    }

    /// Fill the template with the formatted context and the raw question
    pub fn render(&self, chunks: &[Chunk], question: &str) -> String {
        let context = format_docs_for_prompt(chunks);
        // Split on the context slot first so a literal "{question}" inside a
        // chunk is never substituted.
        match self.template.split_once(CONTEXT_SLOT) {
            Some((head, tail)) => {
                let head = head.replace(QUESTION_SLOT, question);
                let tail = tail.replace(QUESTION_SLOT, question);
                format!("{}{}{}", head, context, tail)
            }
            None => self.template.replace(QUESTION_SLOT, question),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for PromptFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_SOURCE;
    use quickcheck_macros::quickcheck;

    fn sample() -> Vec<Chunk> {
        vec![
            Chunk::new("Primer fragmento").with_source("Ley 21.719 - Chile"),
            Chunk::new("Segundo fragmento").with_source("Análisis Experto 2024"),
        ]
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_docs_for_prompt(&[]), "");
    }

    #[test]
    fn test_format_single_chunk() {
        let text = format_docs_for_prompt(&sample()[..1]);
        assert_eq!(
            text,
            "--- INICIO DEL FRAGMENTO DE: Ley 21.719 - Chile ---\nContenido: Primer fragmento\n--- FIN DEL FRAGMENTO ---\n"
        );
    }

    #[test]
    fn test_format_preserves_order() {
        let text = format_docs_for_prompt(&sample());
        let a = text.find("Ley 21.719 - Chile").unwrap();
        let b = text.find("Análisis Experto 2024").unwrap();
        assert!(a < b);
        // A's block closes before B's opens
        let a_end = text.find(CHUNK_END).unwrap();
        assert!(a_end < b);
    }

    #[test]
    fn test_missing_source_uses_fallback() {
        let text = format_docs_for_prompt(&[Chunk::new("sin metadata")]);
        assert!(text.contains(&format!("{} {} ---", CHUNK_BEGIN, UNKNOWN_SOURCE)));
    }

    #[test]
    fn test_repeated_sources_not_deduplicated() {
        let chunks = vec![
            Chunk::new("uno").with_source("Ley 21.719 - Chile"),
            Chunk::new("dos").with_source("Ley 21.719 - Chile"),
        ];
        let text = format_docs_for_prompt(&chunks);
        assert_eq!(text.matches(CHUNK_BEGIN).count(), 2);
        assert_eq!(text.matches(CHUNK_END).count(), 2);
    }

    #[test]
    fn test_render_fills_slots() {
        let formatter = PromptFormatter::new();
        let prompt = formatter.render(&sample(), "¿Qué es un dato sensible?");
        assert!(prompt.contains("Primer fragmento"));
        assert!(prompt.contains("¿Qué es un dato sensible?"));
        assert!(!prompt.contains(CONTEXT_SLOT));
        assert!(!prompt.contains(QUESTION_SLOT));
        assert!(prompt.find("Primer fragmento").unwrap() < prompt.find("¿Qué es un dato sensible?").unwrap());
    }

    #[test]
    fn test_render_does_not_expand_slots_inside_chunks() {
        let formatter = PromptFormatter::new();
        let chunks = vec![Chunk::new("literal {question} en el texto")];
        let prompt = formatter.render(&chunks, "pregunta real del cliente");
        assert!(prompt.contains("literal {question} en el texto"));
    }

    #[test]
    fn test_custom_template_requires_slots() {
        assert!(PromptFormatter::with_template("solo {context}").is_none());
        let formatter = PromptFormatter::with_template("C:{context}|Q:{question}").unwrap();
        let prompt = formatter.render(&[], "hola mundo!");
        assert_eq!(prompt, "C:|Q:hola mundo!");
    }

    #[test]
    fn test_custom_template_rejects_repeated_slots() {
        assert!(PromptFormatter::with_template("{context} {question} {context}").is_none());
        assert!(PromptFormatter::with_template("{context} {question} {question}").is_none());
    }

    #[quickcheck]
    fn prop_format_is_deterministic(texts: Vec<String>) -> bool {
        let chunks: Vec<Chunk> = texts.into_iter().map(Chunk::new).collect();
        format_docs_for_prompt(&chunks) == format_docs_for_prompt(&chunks)
    }
}
