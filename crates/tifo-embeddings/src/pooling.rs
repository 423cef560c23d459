//! Defensive normalization of embedding-endpoint responses.
//!
//! Feature-extraction backends answer in one of three shapes: token-level
//! `[batch, tokens, dim]` tensors, pooled `[batch, dim]` matrices, or a
//! bare `[dim]` vector for a single input. Everything else is rejected as
//! `UnexpectedShape`.

use serde_json::Value;

use tifo_core::errors::{EmbeddingError, TifoResult};

/// Convert a raw JSON response into one pooled vector per input text.
///
/// Token-level rows are mean-pooled; a bare vector is reshaped to a
/// single-row batch. The row count must match `expected`.
pub fn pool_response(value: &Value, expected: usize) -> TifoResult<Vec<Vec<f32>>> {
    let rows = value.as_array().ok_or_else(|| shape_err("response is not an array"))?;

    if rows.is_empty() {
        if expected == 0 {
            return Ok(Vec::new());
        }
        return Err(shape_err(&format!("empty response for {expected} inputs")).into());
    }

    let vectors: Vec<Vec<f32>> = match &rows[0] {
        // Bare [dim] vector: one input, already pooled.
        Value::Number(_) => {
            let vector =
                as_f32_vec(value).ok_or_else(|| shape_err("non-numeric values in vector"))?;
            vec![vector]
        }
        Value::Array(inner) if matches!(inner.first(), Some(Value::Number(_))) => {
            // [batch, dim] matrix.
            rows.iter()
                .map(|row| as_f32_vec(row).ok_or_else(|| shape_err("non-numeric row in matrix")))
                .collect::<Result<_, _>>()?
        }
        Value::Array(inner) if matches!(inner.first(), Some(Value::Array(_))) => {
            // [batch, tokens, dim] tensor: mean-pool each row.
            rows.iter()
                .map(|row| {
                    let tokens: Vec<Vec<f32>> = row
                        .as_array()
                        .ok_or_else(|| shape_err("ragged tensor row"))?
                        .iter()
                        .map(|t| as_f32_vec(t).ok_or_else(|| shape_err("non-numeric token row")))
                        .collect::<Result<_, _>>()?;
                    mean_pool(&tokens).ok_or_else(|| shape_err("empty token sequence"))
                })
                .collect::<Result<_, _>>()?
        }
        other => {
            return Err(shape_err(&format!("unsupported element: {other}")).into());
        }
    };

    if vectors.len() != expected {
        return Err(shape_err(&format!(
            "got {} vectors for {} inputs",
            vectors.len(),
            expected
        ))
        .into());
    }

    Ok(vectors)
}

/// L2-normalize in place so downstream cosine similarity reduces to a dot
/// product.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn as_f32_vec(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

fn mean_pool(tokens: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = tokens.first()?;
    let mut pooled = vec![0.0f32; first.len()];
    for token in tokens {
        for (acc, x) in pooled.iter_mut().zip(token.iter()) {
            *acc += x;
        }
    }
    let n = tokens.len() as f32;
    for x in &mut pooled {
        *x /= n;
    }
    Some(pooled)
}

fn shape_err(detail: &str) -> EmbeddingError {
    EmbeddingError::UnexpectedShape {
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn bare_vector_is_reshaped() {
        let resp = json!([0.1, 0.2, 0.3]);
        let vectors = pool_response(&resp, 1).unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].len(), 3);
    }

    #[test]
    fn matrix_passes_through() {
        let resp = json!([[1.0, 0.0], [0.0, 1.0]]);
        let vectors = pool_response(&resp, 2).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn token_tensor_is_mean_pooled() {
        // Two inputs, each with two token vectors of dim 2.
        let resp = json!([[[1.0, 0.0], [0.0, 1.0]], [[2.0, 2.0], [4.0, 6.0]]]);
        let vectors = pool_response(&resp, 2).unwrap();
        assert_eq!(vectors[0], vec![0.5, 0.5]);
        assert_eq!(vectors[1], vec![3.0, 4.0]);
    }

    #[test]
    fn row_count_mismatch_is_rejected() {
        let resp = json!([[1.0, 0.0]]);
        let err = pool_response(&resp, 2).unwrap_err();
        assert!(err.to_string().contains("1 vectors for 2 inputs"));
    }

    #[test]
    fn non_array_response_is_rejected() {
        let resp = json!({"error": "model loading"});
        assert!(pool_response(&resp, 1).is_err());
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let resp = json!([["a", "b"]]);
        assert!(pool_response(&resp, 1).is_err());
    }

    #[test]
    fn empty_response_for_empty_batch_is_fine() {
        let resp = json!([]);
        assert!(pool_response(&resp, 0).unwrap().is_empty());
    }

    #[test]
    fn normalize_produces_unit_vectors() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((norm(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_zero_vector_alone() {
        let mut v = vec![0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }
}
