// ⚠️ Error taxonomy
// Everything the pricing flow can refuse to do, in user-presentable form.

use thiserror::Error;

/// Errors surfaced by catalog stores and the pricing engine.
///
/// Both variants are recoverable: the user fixes the pantry (or the
/// selection) and retries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// The backing store could not be read/written, or it does not expose
    /// the `item`, `preco`, `qtd_emb`, `unidade` columns.
    #[error("Catalog unavailable ({store}): {reason}")]
    CatalogUnavailable { store: String, reason: String },

    /// A selected ingredient is not in the catalog (deleted after selection,
    /// or never existed).
    #[error("Unknown ingredient '{0}': it is no longer in the pantry")]
    UnknownIngredient(String),
}

impl PricingError {
    pub fn unavailable(store: impl Into<String>, reason: impl ToString) -> Self {
        PricingError::CatalogUnavailable {
            store: store.into(),
            reason: reason.to_string(),
        }
    }
}

pub type PricingResult<T> = Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let err = PricingError::UnknownIngredient("Cocoa".to_string());
        assert!(err.to_string().contains("'Cocoa'"));

        let err = PricingError::unavailable("csv:pantry.csv", "missing column 'preco'");
        assert_eq!(
            err.to_string(),
            "Catalog unavailable (csv:pantry.csv): missing column 'preco'"
        );
    }
}
