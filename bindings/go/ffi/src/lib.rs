//! C-FFI layer for xmlnorm, used by Go (cgo) and other FFI consumers.
//!
//! No normalization logic here. All calls delegate to `xmlnorm-core`.
//!
//! # Memory Contract
//!
//! All functions that return `*mut c_char` allocate via `CString`.
//! The caller MUST free the returned string by calling `xmlnorm_free_string()`.
//!
//! # Errors
//!
//! Error strings have the form `<kind>: <message>`, where kind is one of
//! `invalid_input`, `malformed_xml`, `resource_exhausted` or `invalid_options`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use xmlnorm_core::{Error, Input, NormalizeOptions};

/// Result from an xmlnorm FFI call.
/// If `error` is null, the call succeeded and `result` contains the output.
/// If `error` is non-null, the call failed and `error` contains the error message.
/// The caller MUST free both `result` and `error` with `xmlnorm_free_string()`.
#[repr(C)]
pub struct XmlNormResult {
    pub result: *mut c_char,
    pub error: *mut c_char,
}

impl XmlNormResult {
    fn ok(value: String) -> Self {
        XmlNormResult {
            result: into_c_string(value),
            error: std::ptr::null_mut(),
        }
    }

    fn err(msg: String) -> Self {
        XmlNormResult {
            result: std::ptr::null_mut(),
            error: into_c_string(msg),
        }
    }

    fn core_err(e: Error) -> Self {
        Self::err(format!("{}: {}", e.kind(), e))
    }
}

/// Interior NULs cannot cross the C boundary
fn into_c_string(value: String) -> *mut c_char {
    let c = CString::new(value).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}

/// Convert a C string argument. Null or non-UTF-8 is `InvalidInput`.
unsafe fn text_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, Error> {
    if ptr.is_null() {
        return Err(Error::InvalidInput(format!("{} is null", name)));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| Error::InvalidInput(format!("{} is not valid UTF-8: {}", name, e)))
}

/// Null means defaults
unsafe fn options_arg(ptr: *const c_char) -> Result<NormalizeOptions, String> {
    if ptr.is_null() {
        return Ok(NormalizeOptions::default());
    }
    let json = CStr::from_ptr(ptr)
        .to_str()
        .map_err(|e| format!("invalid_options: options are not valid UTF-8: {}", e))?;
    NormalizeOptions::from_json(json).map_err(|e| format!("invalid_options: options JSON: {}", e))
}

/// Normalize XML text to canonical form.
///
/// # Safety
/// `text` must be a valid null-terminated UTF-8 C string.
/// `options_json` must be null or a valid null-terminated UTF-8 C string.
/// The caller must free the returned strings with `xmlnorm_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn xmlnorm_normalize(
    text: *const c_char,
    options_json: *const c_char,
) -> XmlNormResult {
    let text = match text_arg(text, "text") {
        Ok(s) => s,
        Err(e) => return XmlNormResult::core_err(e),
    };
    let opts = match options_arg(options_json) {
        Ok(o) => o,
        Err(msg) => return XmlNormResult::err(msg),
    };

    match xmlnorm_core::normalize_all(text, &opts) {
        Ok(normalized) => XmlNormResult::ok(normalized),
        Err(e) => XmlNormResult::core_err(e),
    }
}

/// Compute the SHA-256 semantic hash of XML text.
///
/// # Safety
/// `text` must be a valid null-terminated UTF-8 C string.
/// `options_json` must be null or a valid null-terminated UTF-8 C string.
/// The caller must free the returned strings with `xmlnorm_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn xmlnorm_semantic_hash(
    text: *const c_char,
    options_json: *const c_char,
) -> XmlNormResult {
    let text = match text_arg(text, "text") {
        Ok(s) => s,
        Err(e) => return XmlNormResult::core_err(e),
    };
    let opts = match options_arg(options_json) {
        Ok(o) => o,
        Err(msg) => return XmlNormResult::err(msg),
    };

    match xmlnorm_core::semantic_hash(text, &opts) {
        Ok(hash) => XmlNormResult::ok(hash),
        Err(e) => XmlNormResult::core_err(e),
    }
}

/// Normalize two XML texts and compare them.
/// Returns JSON: { "equivalent": bool, "left": "...", "right": "...", "leftHash": "...", "rightHash": "..." }
///
/// # Safety
/// `left` and `right` must be valid null-terminated UTF-8 C strings.
/// `options_json` must be null or a valid null-terminated UTF-8 C string.
/// The caller must free the returned strings with `xmlnorm_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn xmlnorm_compare(
    left: *const c_char,
    right: *const c_char,
    options_json: *const c_char,
) -> XmlNormResult {
    let left = match text_arg(left, "left") {
        Ok(s) => s,
        Err(e) => return XmlNormResult::core_err(e),
    };
    let right = match text_arg(right, "right") {
        Ok(s) => s,
        Err(e) => return XmlNormResult::core_err(e),
    };
    let opts = match options_arg(options_json) {
        Ok(o) => o,
        Err(msg) => return XmlNormResult::err(msg),
    };

    let pair = match xmlnorm_core::normalize_pair(
        Input::new("left", left),
        Input::new("right", right),
        &opts,
    ) {
        Ok(pair) => pair,
        Err(e) => return XmlNormResult::err(format!("{}: {}", e.kind(), e)),
    };

    let output = serde_json::json!({
        "equivalent": pair.is_equivalent(),
        "leftHash": pair.left_hash(),
        "rightHash": pair.right_hash(),
        "left": pair.left,
        "right": pair.right,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => XmlNormResult::ok(json),
        Err(e) => XmlNormResult::err(format!("Serialization error: {}", e)),
    }
}

/// Free a string previously returned by an xmlnorm FFI function.
///
/// # Safety
/// `ptr` must be a pointer previously returned by an xmlnorm FFI function,
/// or null (in which case this is a no-op).
#[no_mangle]
pub unsafe extern "C" fn xmlnorm_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
