//! Row-slice layouts.
//!
//! A matrix may be handed over as a list of independent row slices. When
//! those rows happen to be consecutive runs of one buffer the BLAS wrappers
//! can borrow that buffer directly instead of copying.

use std::borrow::Cow;

use crate::error::{LinalgError, Result};

/// Returns true when every row starts right where the previous one ends.
///
/// Only addresses are compared; no memory is read.
pub fn is_contiguous(rows: &[&[f32]]) -> bool {
    rows.windows(2)
        .all(|w| w[0].as_ptr_range().end == w[1].as_ptr())
}

/// Checks that all rows share the same length and returns it.
pub fn row_len(rows: &[&[f32]]) -> Result<usize> {
    let cols = rows.first().map_or(0, |r| r.len());
    if rows.iter().any(|r| r.len() != cols) {
        return Err(LinalgError::InvalidArgument("rows have different lengths"));
    }
    Ok(cols)
}

/// Flattens rows into a single row-major buffer.
///
/// When `storage` is given and the rows form one contiguous run inside it,
/// the matching sub-slice of `storage` is borrowed. Otherwise the rows are
/// copied.
///
/// # Errors
///
/// `InvalidArgument` when the rows have different lengths.
pub fn flatten_rows<'a>(rows: &[&'a [f32]], storage: Option<&'a [f32]>) -> Result<Cow<'a, [f32]>> {
    let cols = row_len(rows)?;
    let total = rows.len() * cols;

    if let (Some(storage), Some(first)) = (storage, rows.first()) {
        if is_contiguous(rows) {
            let base = storage.as_ptr() as usize;
            let start = first.as_ptr() as usize;
            if start >= base {
                let offset = (start - base) / std::mem::size_of::<f32>();
                if let Some(view) = storage.get(offset..offset + total) {
                    if view.as_ptr() == first.as_ptr() {
                        return Ok(Cow::Borrowed(view));
                    }
                }
            }
        }
    }

    let mut out = Vec::with_capacity(total);
    for r in rows {
        out.extend_from_slice(r);
    }
    Ok(Cow::Owned(out))
}
