//! Cycle-insights generation
//!
//! Prompt-templated text generation, separate from the scheduling agent.
//! Walks the registry's fallback chain until some provider answers; if every
//! provider is down, serves a canned response keyed off the question so the
//! endpoint degrades gracefully instead of erroring.

use crate::llm::{LlmRequest, Message, ModelRegistry};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a helpful women's health assistant providing \
accurate, factual information about menstrual cycles and reproductive health.";

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Generate an insight for a free-text question.
pub async fn generate_insight(registry: &ModelRegistry, question: &str) -> String {
    for service in registry.fallback_chain() {
        let request = LlmRequest {
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(question)],
            tools: vec![],
            max_tokens: Some(1000),
        };

        match tokio::time::timeout(PROVIDER_TIMEOUT, service.complete(&request)).await {
            Ok(Ok(response)) => {
                let text = Message::assistant(response.content).text();
                if !text.trim().is_empty() {
                    return text;
                }
                tracing::warn!(model = %service.model_id(), "Empty insight response");
            }
            Ok(Err(e)) => {
                tracing::warn!(model = %service.model_id(), error = %e, "Insight provider failed");
            }
            Err(_) => {
                tracing::warn!(model = %service.model_id(), "Insight provider timed out");
            }
        }
    }

    fallback_insight(question).to_string()
}

/// Canned response used when no provider is reachable.
fn fallback_insight(question: &str) -> &'static str {
    let question = question.to_lowercase();

    if question.contains("menstrual") || question.contains("period") {
        "During your menstrual phase, focus on rest and self-care. Iron-rich foods \
         help replenish what is lost during menstruation, and gentle movement like \
         walking or yoga can ease cramping. Lower energy is normal in this phase."
    } else if question.contains("follicular") {
        "In the follicular phase your body prepares for ovulation and energy tends \
         to rise with estrogen. It is a good window for new projects and harder \
         workouts; B-vitamin rich foods support this phase."
    } else if question.contains("ovulation") {
        "Around ovulation you are at your most fertile, and many people notice peak \
         energy and confidence. If you are not trying to conceive, be mindful of \
         protection. Antioxidant-rich foods support egg health."
    } else if question.contains("luteal") {
        "In the luteal phase the body prepares for a possible pregnancy. If PMS \
         symptoms appear, complex carbohydrates and calcium- and magnesium-rich \
         foods may help steady mood and reduce bloating; moderate exercise suits \
         this phase."
    } else {
        "Tracking your cycle, symptoms and moods over time reveals how each phase \
         affects your energy and wellbeing, and helps you work with your body's \
         natural rhythms rather than against them."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmConfig;

    #[tokio::test]
    async fn empty_registry_serves_canned_response() {
        let registry = ModelRegistry::new(&LlmConfig::default());
        let insight = generate_insight(&registry, "tell me about my period").await;
        assert!(insight.contains("menstrual phase"));
    }

    #[test]
    fn canned_responses_are_keyed_by_phase() {
        assert!(fallback_insight("what happens during ovulation?").contains("fertile"));
        assert!(fallback_insight("luteal phase tips").contains("luteal"));
        assert!(fallback_insight("follicular advice").contains("follicular"));
        assert!(fallback_insight("anything else").contains("Tracking your cycle"));
    }
}
