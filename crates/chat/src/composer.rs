//! Answer composition
//!
//! The grounding state machine: page-navigational questions answer from
//! the supplied page content without touching the store; everything else
//! retrieves context and either generates a constrained answer or falls
//! back to fixed copy. One generation call per request, and every failure
//! path terminates in a calm, bounded message.

use std::sync::Arc;

use tracing::instrument;

use scribe_common::errors::AiError;
use scribe_common::generation::Generator;

use crate::prompts;
use crate::retrieval::RetrievalEngine;
use crate::sanitize::clean_text_output;

/// Shown when retrieval finds nothing and no page content was supplied
pub const NO_CONTEXT_MESSAGE: &str =
    "I couldn't find any relevant information to answer that question. \
     Could you try rephrasing or asking about a different topic?";

/// Shown when the pipeline was never configured for this deployment
pub const UNAVAILABLE_MESSAGE: &str =
    "I apologize, but the AI assistant is currently unavailable. \
     Please contact the site administrator.";

/// Shown when a provider call failed
pub const TECHNICAL_DIFFICULTY_MESSAGE: &str =
    "I'm experiencing technical difficulties at the moment. \
     Please try again in a few seconds.";

/// Shown when every credential in the pool was throttled
pub const HIGH_TRAFFIC_MESSAGE: &str =
    "We're experiencing high traffic right now. \
     Please wait a minute and try again.";

/// A reader's question with its optional scoping and page context
#[derive(Debug, Clone, Default)]
pub struct AskRequest<'a> {
    /// The question itself
    pub query: &'a str,
    /// Restrict retrieval to one document (e.g. the article being read)
    pub scope: Option<&'a str>,
    /// URL of the page the reader is on
    pub page_url: Option<&'a str>,
    /// Visible content of that page, for page-navigational questions
    pub page_content: Option<&'a str>,
}

pub struct AnswerComposer {
    retrieval: RetrievalEngine,
    generator: Arc<dyn Generator>,
}

impl AnswerComposer {
    pub fn new(retrieval: RetrievalEngine, generator: Arc<dyn Generator>) -> Self {
        Self {
            retrieval,
            generator,
        }
    }

    /// Produce an answer. Infallible from the caller's point of view:
    /// every internal failure maps to fixed copy.
    #[instrument(skip_all, fields(query_len = request.query.len()))]
    pub async fn answer(&self, request: &AskRequest<'_>) -> String {
        metrics::counter!("scribe_chat_answers_total").increment(1);

        // Page-navigational questions never need the article corpus
        if let Some(page_content) = request.page_content {
            if prompts::is_page_question(request.query) {
                return self
                    .answer_from_page(request.query, page_content, request.page_url)
                    .await;
            }
        }

        let retrieval = match self.retrieval.retrieve(request.query, request.scope).await {
            Ok(retrieval) => retrieval,
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed");
                return fallback_for(&e);
            }
        };

        if retrieval.context.is_empty() {
            if let Some(page_content) = request.page_content {
                return self
                    .answer_from_page(request.query, page_content, request.page_url)
                    .await;
            }
            metrics::counter!("scribe_chat_fallbacks_total").increment(1);
            return NO_CONTEXT_MESSAGE.to_string();
        }

        let prompt = prompts::grounded_prompt(&retrieval.context, request.query);
        match self.generator.generate(&prompt).await {
            Ok(raw) => clean_text_output(&raw),
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                fallback_for(&e)
            }
        }
    }

    async fn answer_from_page(
        &self,
        query: &str,
        page_content: &str,
        page_url: Option<&str>,
    ) -> String {
        let prompt = prompts::page_prompt(page_content, query, prompts::page_name(page_url));
        match self.generator.generate(&prompt).await {
            Ok(raw) => clean_text_output(&raw),
            Err(e) => {
                tracing::warn!(error = %e, "page answer generation failed");
                fallback_for(&e)
            }
        }
    }
}

/// Map a pipeline failure to its fixed user-facing copy
fn fallback_for(err: &AiError) -> String {
    metrics::counter!("scribe_chat_fallbacks_total").increment(1);
    if err.is_rate_limit() {
        HIGH_TRAFFIC_MESSAGE.to_string()
    } else if err.is_unavailable() {
        UNAVAILABLE_MESSAGE.to_string()
    } else {
        TECHNICAL_DIFFICULTY_MESSAGE.to_string()
    }
}
