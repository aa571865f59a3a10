//! Assertions over query results.
//!
//! Every failure is an [`ProbeError::AssertionMismatch`] carrying the
//! expected and actual values; nothing here panics.

use crate::query::Element;
use crate::result::{ProbeError, ProbeResult};

/// Displayed text must equal the expected literal
pub fn assert_text(context: &str, expected: &str, actual: &str) -> ProbeResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ProbeError::mismatch(context, expected, actual))
    }
}

/// A query must have matched exactly `expected` elements
pub fn assert_count(context: &str, expected: usize, actual: usize) -> ProbeResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ProbeError::mismatch(
            format!("{context} count"),
            expected,
            actual,
        ))
    }
}

/// The element at `index`, or a count mismatch when the results are too short
pub fn element_at<'a>(results: &'a [Element], index: usize, context: &str) -> ProbeResult<&'a Element> {
    results.get(index).ok_or_else(|| {
        ProbeError::mismatch(
            format!("{context} count"),
            format!("more than {index}"),
            results.len(),
        )
    })
}

/// Text of the element at `index` must equal `expected`
pub fn assert_text_at(results: &[Element], index: usize, context: &str, expected: &str) -> ProbeResult<()> {
    let element = element_at(results, index, context)?;
    assert_text(context, expected, &element.text)
}
