use crate::model::CitationStyle;
use crate::text::prefix_chars;

/// Content beyond this many characters is not sent to the oracle.
pub const MAX_PROMPT_CONTENT_CHARS: usize = 1500;

pub fn credibility_prompt(content: &str, provided_url: Option<&str>) -> String {
    let content = prefix_chars(content, MAX_PROMPT_CONTENT_CHARS);
    let source = match provided_url {
        Some(url) => format!("\nFuente indicada por el usuario: {url}\n"),
        None => String::new(),
    };
    format!(
        r#"Analiza el siguiente contenido de noticias y determina su credibilidad.
{source}
Contenido: {content}

Evalúa:
1. Credibilidad general (0-100)
2. Nivel de sesgo (0-100, donde 0 es neutral)
3. Sentimiento (positive/negative/neutral)
4. Número de afirmaciones factuales y cuántas son verificables
5. Advertencias específicas

Responde SOLO en formato JSON válido:
{{
  "credibilityScore": 75,
  "status": "verified",
  "biasScore": 20,
  "sentiment": "neutral",
  "factualClaims": 8,
  "verifiedClaims": 6,
  "warnings": ["ejemplo de advertencia"],
  "reasoning": "breve explicación"
}}
"#
    )
}

pub fn citation_prompt(topic: &str, analyzed_text: &str, style: CitationStyle) -> String {
    let label = style.label();
    let text = prefix_chars(analyzed_text, MAX_PROMPT_CONTENT_CHARS);
    format!(
        r#"Genera entre 4 y 6 citas académicas REALES y verificables relacionadas con el tema "{topic}".

Texto analizado:
{text}

Reglas:
1) Usa autores, revistas y DOI reales; no inventes referencias.
2) Año de publicación entre 2015 y el año actual.
3) Las URL deben apuntar a DOI o a bases académicas reconocidas (Google Scholar, PubMed, JSTOR, ScienceDirect, Springer, IEEE, ACM, Nature, Science, Cell).
4) El campo "formatted" debe seguir el estilo {label}.
5) Incluye "searchQuery": la consulta que usarías en un buscador académico.

Responde SOLO en formato JSON:
{{
  "searchQuery": "consulta académica",
  "citations": [
    {{
      "authors": ["Apellido, N.", "Apellido2, M."],
      "title": "Título del artículo",
      "journal": "Nombre de la revista",
      "year": 2023,
      "doi": "10.1000/ejemplo",
      "url": "https://doi.org/10.1000/ejemplo",
      "abstract": "Resumen breve del estudio (2-3 líneas)",
      "type": "journal_article",
      "formatted": "Cita completa en estilo {label}",
      "relevance": "Por qué es pertinente para el texto",
      "keyFindings": ["Hallazgo principal"]
    }}
  ]
}}
"#
    )
}
