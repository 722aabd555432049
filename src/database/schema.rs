// file: src/database/schema.rs
// description: Arrow schema and record batch conversion for stored passages
// reference: https://docs.rs/lancedb

use crate::error::{PipelineError, Result};
use crate::models::{Passage, PassageKind};
use arrow_array::types::Float32Type;
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, StringArray, UInt32Array,
};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Returns the Arrow schema for the passages table with vector embeddings
pub fn passages_schema(embedding_dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("page", DataType::UInt32, false),
        Field::new("kind", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                embedding_dim as i32,
            ),
            false,
        ),
    ]))
}

/// Create an Arrow RecordBatch from passages
pub fn passages_to_batch(schema: Arc<Schema>, passages: &[Passage]) -> Result<RecordBatch> {
    let dim = match schema.field_with_name("embedding")?.data_type() {
        DataType::FixedSizeList(_, size) => *size,
        other => {
            return Err(PipelineError::IndexUnavailable(format!(
                "Unexpected embedding column type {:?}",
                other
            )));
        }
    };

    if let Some(bad) = passages.iter().find(|p| p.embedding.len() != dim as usize) {
        return Err(PipelineError::Validation(format!(
            "Passage {} has embedding dimension {}, table expects {}",
            bad.id,
            bad.embedding.len(),
            dim
        )));
    }

    let ids = StringArray::from_iter_values(passages.iter().map(|p| p.id.as_str()));
    let texts = StringArray::from_iter_values(passages.iter().map(|p| p.text.as_str()));
    let sources = StringArray::from_iter_values(passages.iter().map(|p| p.source.as_str()));
    let pages = UInt32Array::from(passages.iter().map(|p| p.page).collect::<Vec<_>>());
    let kinds = StringArray::from_iter_values(passages.iter().map(|p| p.kind.as_str()));

    let embeddings = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
        passages
            .iter()
            .map(|p| Some(p.embedding.iter().map(|v| Some(*v)).collect::<Vec<_>>())),
        dim,
    );

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(ids),
            Arc::new(texts),
            Arc::new(sources),
            Arc::new(pages),
            Arc::new(kinds),
            Arc::new(embeddings),
        ],
    )?;

    Ok(batch)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::IndexUnavailable(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| PipelineError::IndexUnavailable(format!("Invalid '{}' column type", name)))
}

/// Convert result rows back into passages
pub fn batch_to_passages(batch: &RecordBatch) -> Result<Vec<Passage>> {
    let ids = string_column(batch, "id")?;
    let texts = string_column(batch, "text")?;
    let sources = string_column(batch, "source")?;
    let kinds = string_column(batch, "kind")?;

    let pages = batch
        .column_by_name("page")
        .ok_or_else(|| PipelineError::IndexUnavailable("Missing 'page' column".to_string()))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| PipelineError::IndexUnavailable("Invalid 'page' column type".to_string()))?;

    let embeddings = batch
        .column_by_name("embedding")
        .ok_or_else(|| PipelineError::IndexUnavailable("Missing 'embedding' column".to_string()))?
        .as_any()
        .downcast_ref::<FixedSizeListArray>()
        .ok_or_else(|| {
            PipelineError::IndexUnavailable("Invalid 'embedding' column type".to_string())
        })?;

    let mut passages = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let kind = PassageKind::parse(kinds.value(i)).ok_or_else(|| {
            PipelineError::IndexUnavailable(format!("Unknown passage kind '{}'", kinds.value(i)))
        })?;

        let values = embeddings.value(i);
        let embedding = values
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| {
                PipelineError::IndexUnavailable("Invalid embedding value type".to_string())
            })?
            .values()
            .to_vec();

        passages.push(Passage {
            id: ids.value(i).to_string(),
            text: texts.value(i).to_string(),
            source: sources.value(i).to_string(),
            page: pages.value(i),
            kind,
            embedding,
        });
    }

    Ok(passages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PassageDraft;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_generation() {
        let schema = passages_schema(384);
        assert_eq!(schema.fields().len(), 6);

        let embedding_field = schema.field_with_name("embedding").unwrap();
        assert!(matches!(embedding_field.data_type(), DataType::FixedSizeList(_, 384)));
    }

    #[test]
    fn test_batch_conversion_preserves_passages() {
        let drafts = [
            PassageDraft::new("Revenue grew", "r.pdf", 1, PassageKind::Text).unwrap(),
            PassageDraft::new("Acme | Pune", "r.pdf", 2, PassageKind::TableRow).unwrap(),
        ];
        let passages: Vec<Passage> = drafts
            .into_iter()
            .map(|d| Passage::from_draft(d, vec![0.6, 0.8, 0.0]))
            .collect();

        let batch = passages_to_batch(passages_schema(3), &passages).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch_to_passages(&batch).unwrap(), passages);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let draft = PassageDraft::new("text", "r.pdf", 1, PassageKind::Text).unwrap();
        let passage = Passage::from_draft(draft, vec![1.0, 0.0]);
        assert!(passages_to_batch(passages_schema(3), &[passage]).is_err());
    }
}
