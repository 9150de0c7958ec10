//! Prompt templates and query classification
//!
//! Two templates: the grounded article prompt, which binds the model to
//! retrieved context, and the page prompt for questions about the page
//! the reader is currently on. The grounding rules are part of the
//! product contract: answers come from context or from the fixed
//! not-covered sentence, never from the model's own knowledge.

/// Sentence the model must emit verbatim when the context lacks the answer
pub const NOT_COVERED_SENTENCE: &str =
    "I'm sorry, that specific detail is not covered in our published articles.";

/// Phrases marking a question as being about the current page rather than
/// the article corpus
const PAGE_KEYWORDS: &[&str] = &[
    "this page",
    "this site",
    "homepage",
    "what is this",
    "navigate",
    "sections",
    "where am i",
];

/// Whether the query should bypass retrieval and answer from page content
pub fn is_page_question(query: &str) -> bool {
    let lowered = query.to_lowercase();
    PAGE_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Human label for the page a URL points at
pub fn page_name(page_url: Option<&str>) -> &'static str {
    match page_url {
        Some(url) if url.contains("index.html") => "the homepage",
        Some(url) if url.contains("journal.html") => "the journal page",
        Some(url) if url.contains("contact.html") => "the contact page",
        _ => "this page",
    }
}

/// Build the context-bound prompt for an article question
pub fn grounded_prompt(context: &str, query: &str) -> String {
    format!(
        "You are the resident assistant of a publishing platform. Answer the \
         reader's question with precision, in a professional tone, using ONLY \
         the context below.\n\
         \n\
         Rules:\n\
         1. Start directly with the answer. Never open with phrases like \
         \"The article says\" or \"According to the context\".\n\
         2. If the answer is not explicitly present in the context, reply \
         exactly: \"{not_covered}\" Do not invent information.\n\
         3. Ignore outside knowledge; the context is the only source of truth.\n\
         4. Plain text only: no markdown emphasis, no headings, no bullet \
         points. Write complete, flowing sentences.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {query}\n\
         \n\
         Answer:",
        not_covered = NOT_COVERED_SENTENCE,
        context = context,
        query = query,
    )
}

/// Build the prompt for a question about the current page
pub fn page_prompt(page_content: &str, query: &str, page_name: &str) -> String {
    format!(
        "You are the resident assistant of a publishing platform. The reader \
         is currently on {page_name} and asks about it. Answer from the page \
         content below, briefly and helpfully, in plain text with no markdown.\n\
         \n\
         Page content:\n\
         {page_content}\n\
         \n\
         Question:\n\
         {query}\n\
         \n\
         Answer:",
        page_name = page_name,
        page_content = page_content,
        query = query,
    )
}
