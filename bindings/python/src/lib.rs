//! Python bindings for xmlnorm
//!
//! Thin wrapper around `xmlnorm-core`, no normalization logic here.
//! Every error is raised as `ValueError("<kind>: <message>")`.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use xmlnorm_core::{Error, Input, LabeledError, NormalizeOptions};

fn core_err(e: Error) -> PyErr {
    PyValueError::new_err(format!("{}: {}", e.kind(), e))
}

fn labeled_err(e: LabeledError) -> PyErr {
    PyValueError::new_err(format!("{}: {}", e.kind(), e))
}

/// Anything that is not a `str` (including `None`) is invalid input
fn text_arg(value: &Bound<'_, PyAny>, name: &str) -> PyResult<String> {
    value.extract::<String>().map_err(|_| {
        core_err(Error::InvalidInput(format!(
            "{} must be a str, got {}",
            name,
            value
                .get_type()
                .name()
                .map(|n| n.to_string())
                .unwrap_or_else(|_| "unknown".to_string())
        )))
    })
}

fn options_arg(options_json: Option<&str>) -> PyResult<NormalizeOptions> {
    match options_json {
        Some(json) => NormalizeOptions::from_json(json).map_err(|e| {
            PyValueError::new_err(format!("invalid_options: options JSON: {}", e))
        }),
        None => Ok(NormalizeOptions::default()),
    }
}

/// Normalize XML text to canonical form.
///
/// Args:
///     text: XML source text
///     options_json: optional JSON settings (camelCase keys, missing keys use defaults)
///
/// Returns:
///     Canonical XML text
///
/// Raises:
///     ValueError: "invalid_input: ...", "malformed_xml: ..." or "resource_exhausted: ..."
#[pyfunction]
#[pyo3(signature = (text, options_json=None))]
fn normalize(text: &Bound<'_, PyAny>, options_json: Option<&str>) -> PyResult<String> {
    let text = text_arg(text, "text")?;
    let opts = options_arg(options_json)?;
    xmlnorm_core::normalize_all(&text, &opts).map_err(core_err)
}

/// Normalize two XML texts with the same options and compare them.
///
/// Returns:
///     JSON string:
///     {
///         "equivalent": bool,
///         "left": "<canonical left>",
///         "right": "<canonical right>",
///         "leftHash": "...",
///         "rightHash": "..."
///     }
///
/// Raises:
///     ValueError: message names the failing side, e.g. "malformed_xml: right: ..."
#[pyfunction]
#[pyo3(signature = (left, right, options_json=None))]
fn compare(
    left: &Bound<'_, PyAny>,
    right: &Bound<'_, PyAny>,
    options_json: Option<&str>,
) -> PyResult<String> {
    let left = text_arg(left, "left")?;
    let right = text_arg(right, "right")?;
    let opts = options_arg(options_json)?;

    let pair = xmlnorm_core::normalize_pair(
        Input::new("left", &left),
        Input::new("right", &right),
        &opts,
    )
    .map_err(labeled_err)?;

    let output = serde_json::json!({
        "equivalent": pair.is_equivalent(),
        "leftHash": pair.left_hash(),
        "rightHash": pair.right_hash(),
        "left": pair.left,
        "right": pair.right,
    });
    serde_json::to_string_pretty(&output)
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Compute the SHA-256 semantic hash of XML text.
///
/// The hash is computed from the canonical form, so equivalent
/// documents produce the same hash.
///
/// Returns:
///     64-character lowercase hex string
#[pyfunction]
#[pyo3(signature = (text, options_json=None))]
fn semantic_hash(text: &Bound<'_, PyAny>, options_json: Option<&str>) -> PyResult<String> {
    let text = text_arg(text, "text")?;
    let opts = options_arg(options_json)?;
    xmlnorm_core::semantic_hash(&text, &opts).map_err(core_err)
}

/// Default options as a JSON string, a starting point for `options_json`.
#[pyfunction]
fn default_options() -> String {
    NormalizeOptions::default().to_json()
}

/// xmlnorm Python module: semantic XML normalization
#[pymodule]
fn xmlnorm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", xmlnorm_core::VERSION)?;
    m.add_function(wrap_pyfunction!(normalize, m)?)?;
    m.add_function(wrap_pyfunction!(compare, m)?)?;
    m.add_function(wrap_pyfunction!(semantic_hash, m)?)?;
    m.add_function(wrap_pyfunction!(default_options, m)?)?;
    Ok(())
}
