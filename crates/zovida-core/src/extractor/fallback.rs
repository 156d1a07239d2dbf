//! Collaborators consulted when local matching finds nothing.

use thiserror::Error;
use zovida_llm::{DrugListExtractor, ExtractionError, LlmClient};

/// Failure of an external collaborator. Always recoverable by the caller.
#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("Language model request failed: {0}")]
    Llm(#[from] ExtractionError),
}

/// Free-text drug-name extraction used after dictionary matching comes up empty.
pub trait ExtractionFallback: Send + Sync {
    /// Names mentioned in `text`; empty when there are none.
    fn extract_names(&self, text: &str) -> Result<Vec<String>, FallbackError>;
}

impl<C: LlmClient> ExtractionFallback for DrugListExtractor<C> {
    fn extract_names(&self, text: &str) -> Result<Vec<String>, FallbackError> {
        Ok(self.extract(text)?.into_names())
    }
}
