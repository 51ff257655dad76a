/// System message for the chat model.
pub const SYSTEM: &str = "You are a business analyst for a fresh-produce grower. \
Answer questions about weekly sales, vendors, organic and media performance using \
only the data provided. If the data does not cover the question, say so briefly and \
answer from general reasoning.";

/// User message carrying the digest and the question.
pub fn user_message(context: &str, question: &str) -> String {
    format!("Data:\n{}\n\nQuestion: {}", context.trim(), question.trim())
}
