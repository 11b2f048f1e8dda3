//! Fixed text shown to the user or sent to the model.

/// Builds the error transcript entry shown when the model cannot answer.
///
/// `message` is the raw error text; `base_url` is the endpoint the user should
/// check.
pub fn remediation_text(message: &str, base_url: &str) -> String {
    format!(
        "Error: {message}\n\nPlease make sure:\n1. Ollama is running\n2. The Gemma model is loaded\n3. You can access Ollama at {base_url}"
    )
}

/// Builds the prompt for rewriting a selected block of text.
pub fn edit_prompt(selected_text: &str, instruction: &str) -> String {
    format!("Please help me edit this code:\n{selected_text}\n\nInstructions: {instruction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remediation_text_lists_checklist() {
        let text = remediation_text("connection refused", "http://localhost:11434");
        assert_eq!(
            text,
            "Error: connection refused\n\nPlease make sure:\n1. Ollama is running\n2. The Gemma model is loaded\n3. You can access Ollama at http://localhost:11434"
        );
    }

    #[test]
    fn test_edit_prompt_layout() {
        assert_eq!(
            edit_prompt("fn main() {}", "add a comment"),
            "Please help me edit this code:\nfn main() {}\n\nInstructions: add a comment"
        );
    }
}
