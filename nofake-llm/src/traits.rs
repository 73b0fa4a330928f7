use async_trait::async_trait;
use nofake_common::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// A text-generation oracle. Its output is untrusted: callers must expect
/// prose, code fences, missing fields and out-of-range numbers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    /// System framing shared by the credibility and citation prompts.
    fn default_system_prompt(&self) -> &str {
        r#"Eres un analista experto en verificación de hechos y en literatura académica.

Tu función:
- Evaluar la credibilidad de contenidos periodísticos y detectar desinformación
- Señalar sesgos, lenguaje sensacionalista y afirmaciones sin respaldo
- Proponer referencias académicas pertinentes al contenido analizado

Reglas de salida:
- Responde SOLO con JSON válido que siga el esquema indicado
- Sin bloques de código, sin texto antes ni después del JSON"#
    }
}
