use crate::llm::GeminiClient;

/// Separator between pages in the aggregated context.
pub const SOURCE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone)]
pub struct Generated {
    /// The model's answer, or `Generation error: ...` when the call failed.
    pub text: String,
    pub failed: bool,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

pub struct Synthesizer {
    llm: GeminiClient,
    model: String,
}

impl Synthesizer {
    pub fn new(llm: GeminiClient, model: String) -> Self {
        Self { llm, model }
    }

    pub async fn generate(&self, query: &str, context: &str) -> Generated {
        let prompt = build_prompt(query, context);

        match self.llm.generate(&self.model, &prompt).await {
            Ok(response) => Generated {
                text: response.text,
                failed: false,
                input_tokens: response.input_tokens,
                output_tokens: response.output_tokens,
            },
            Err(e) => {
                tracing::error!(error = %e, model = %self.model, "generation failed");
                Generated {
                    text: format!("Generation error: {e}"),
                    failed: true,
                    input_tokens: 0,
                    output_tokens: 0,
                }
            }
        }
    }
}

/// Segments of `context` split on blank lines.
///
/// This approximates the number of pages; a page whose own text contains a
/// blank line counts twice.
pub fn source_count(context: &str) -> usize {
    context.split(SOURCE_SEPARATOR).count()
}

pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "Analyze this information from {} websites and provide a comprehensive answer to: {}\n\n\
         Web Content:\n{}\n\n\
         Answer in detail with proper formatting:",
        source_count(context),
        query,
        context
    )
}
