//! Prompt assembly.
//!
//! A prompt is the fixed workflow preamble followed by the task document,
//! byte for byte. The document is not templated or escaped.

use crate::error::{Result, RunnerError};
use anyhow::Context;
use std::path::Path;

/// Instructions placed ahead of every task document.
pub const PREAMBLE: &str = "\
Ingest and understand the Product Requirement Prompt (PRP) below in detail.

# WORKFLOW GUIDANCE:

## Planning Phase
- Think hard before you code. Create a comprehensive plan addressing all requirements.
- Break down complex tasks into smaller, manageable steps.
- Use the TodoWrite tool to create and track your implementation plan.
- Identify implementation patterns from existing code to follow.

## Implementation Phase
- Follow code conventions and patterns found in existing files.
- Implement one component at a time and verify it works correctly.
- Write clear, maintainable code with appropriate comments.
- Consider error handling, edge cases, and potential security issues.
- Use type hints to ensure type safety.

## Testing Phase
- Test each component thoroughly as you build it.
- Use the provided validation gates to verify your implementation.
- Verify that all requirements have been satisfied.
- Run the project tests when finished and output \"DONE\" when they pass.

## Example Implementation Approach:
1. Analyze the PRP requirements in detail
2. Search for and understand existing patterns in the codebase
3. Search the Web and gather additional context and examples
4. Create a step-by-step implementation plan with TodoWrite
5. Implement core functionality first, then additional features
6. Test and validate each component
7. Ensure all validation gates pass

***When you are finished, move the completed PRP to the PRPs/completed folder***

";

/// Build the prompt for the document at `path`.
///
/// Returns [`RunnerError::NotFound`] when the document does not exist.
pub fn build_prompt(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(RunnerError::NotFound(path.to_path_buf()));
    }

    let document = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read PRP '{}'", path.display()))?;

    let mut prompt = String::with_capacity(PREAMBLE.len() + document.len());
    prompt.push_str(PREAMBLE);
    prompt.push_str(&document);
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prompt_is_preamble_plus_exact_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("feature.md");
        let document = "# Feature\r\n\n  {not a template} \\n $HOME\n\n";
        std::fs::write(&path, document).unwrap();

        let prompt = build_prompt(&path).unwrap();

        assert_eq!(prompt.len(), PREAMBLE.len() + document.len());
        assert!(prompt.starts_with(PREAMBLE));
        assert!(prompt.ends_with(document));
    }

    #[test]
    fn empty_document_yields_preamble() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.md");
        std::fs::write(&path, "").unwrap();

        assert_eq!(build_prompt(&path).unwrap(), PREAMBLE);
    }

    #[test]
    fn missing_document_is_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.md");

        match build_prompt(&path) {
            Err(RunnerError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn directory_is_an_unexpected_error() {
        let temp = TempDir::new().unwrap();

        let err = build_prompt(temp.path()).unwrap_err();
        assert!(err.wants_trace());
    }
}
