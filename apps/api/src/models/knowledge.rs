use sqlx::FromRow;

use crate::retrieval::vector::RetrievedItem;

/// A stored text snippet (knowledge-base article or résumé chunk) with its embedding.
#[derive(Debug, Clone, FromRow)]
pub struct EmbeddedTextRow {
    pub text: String,
    pub embedding: sqlx::types::Json<Vec<f32>>,
}

impl From<EmbeddedTextRow> for RetrievedItem {
    fn from(row: EmbeddedTextRow) -> Self {
        RetrievedItem::new(row.text, row.embedding.0)
    }
}
