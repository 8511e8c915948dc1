//! FFI interface for C/C++ interop
//!
//! Provides C-compatible functions for running an extraction configuration
//! against HTML. Results are passed back as JSON text.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::config::ConfigNode;
use crate::document::Document;
use crate::evaluator::extract;

/// Result struct returned to C++
/// Both pointers are owned by Rust and must be freed via free_extraction_result
#[repr(C)]
pub struct ExtractionResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Extract data from HTML using YAML configuration text.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `config_text` - YAML extraction configuration (null-terminated)
/// * `base_uri` - Base URI for the `url` transform (null-terminated), may be null
///
/// # Returns
/// ExtractionResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `config_text` must be a valid null-terminated C string
/// - `base_uri` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn extract_with_config(
    html_ptr: *const c_char,
    html_len: usize,
    config_text: *const c_char,
    base_uri: *const c_char,
) -> ExtractionResultFFI {
    let html = match html_from_raw(html_ptr, html_len) {
        Ok(html) => html,
        Err(msg) => return make_error_result(msg),
    };

    let config_str = match str_from_raw(config_text) {
        Some(Ok(s)) => s,
        Some(Err(_)) => return make_error_result("Invalid UTF-8 in configuration"),
        None => return make_error_result("Configuration is null"),
    };

    let base_uri = match str_from_raw(base_uri) {
        Some(Ok(s)) => Some(s),
        Some(Err(_)) => return make_error_result("Invalid UTF-8 in base URI"),
        None => None,
    };

    let config = match ConfigNode::from_text(config_str) {
        Ok(config) => config,
        Err(e) => return make_error_result(&e.to_string()),
    };

    let mut document = Document::parse(&html);
    if let Some(base_uri) = base_uri {
        document = document.with_base_uri(base_uri);
    }

    let value = extract(&document.root_context(), &config);
    make_json_result(&value)
}

/// Check configuration text without running it.
///
/// On success json_ptr holds `null`; otherwise error_ptr holds the message.
///
/// # Safety
/// - `config_text` must be a valid null-terminated C string
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn validate_config(config_text: *const c_char) -> ExtractionResultFFI {
    let config_str = match str_from_raw(config_text) {
        Some(Ok(s)) => s,
        Some(Err(_)) => return make_error_result("Invalid UTF-8 in configuration"),
        None => return make_error_result("Configuration is null"),
    };

    match ConfigNode::from_text(config_str) {
        Ok(_) => make_json_result(&serde_json::Value::Null),
        Err(e) => make_error_result(&e.to_string()),
    }
}

/// Free an ExtractionResultFFI returned by this module
///
/// # Safety
/// - `result` must have been returned by `extract_with_config` or `validate_config`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_extraction_result(result: ExtractionResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

unsafe fn html_from_raw(html_ptr: *const c_char, html_len: usize) -> Result<String, &'static str> {
    if html_ptr.is_null() || html_len == 0 {
        return Ok(String::new());
    }
    let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
    std::str::from_utf8(slice)
        .map(str::to_string)
        .map_err(|_| "Invalid UTF-8 in HTML content")
}

// None for a null pointer
unsafe fn str_from_raw<'a>(ptr: *const c_char) -> Option<Result<&'a str, std::str::Utf8Error>> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_str())
}

fn make_json_result(value: &serde_json::Value) -> ExtractionResultFFI {
    match serde_json::to_string(value) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ExtractionResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> ExtractionResultFFI {
    let error_cstr = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    ExtractionResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}
