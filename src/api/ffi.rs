//! C-compatible API exposed to non-Rust front ends.
//!
//! Ownership rules: an engine handle from `diagstat_engine_new` must be released
//! with `diagstat_engine_free`; every string returned here must be released
//! with `diagstat_free_str`. Input strings stay owned by the caller.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use tracing::error;

use crate::common::config::AppCfg;
use crate::common::error::DiagError;
use crate::common::log;

use super::handlers::{Engine, Response, API_VERSION};

/// ABI version to coordinate with the caller.
#[no_mangle]
pub extern "C" fn diagstat_api_version() -> u32 {
    API_VERSION
}

/// Build an engine from the process environment. Returns null on bad configuration.
#[no_mangle]
pub extern "C" fn diagstat_engine_new() -> *mut Engine {
    match AppCfg::load() {
        Ok(cfg) => {
            log::init(&cfg);
            Box::into_raw(Box::new(Engine::from_cfg(&cfg)))
        }
        Err(err) => {
            let code = err.code() as u32;
            error!(code, error = %err, "engine configuration rejected");
            std::ptr::null_mut()
        }
    }
}

/// Release an engine handle.
#[no_mangle]
pub extern "C" fn diagstat_engine_free(engine: *mut Engine) {
    if engine.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(engine));
    }
}

#[no_mangle]
pub extern "C" fn diagstat_create_experiment(
    engine: *const Engine,
    payload: *const c_char,
) -> *const c_char {
    call(engine, payload, Engine::create_experiment)
}

#[no_mangle]
pub extern "C" fn diagstat_list_experiments(engine: *const Engine) -> *const c_char {
    match unsafe { engine.as_ref() } {
        Some(engine) => string_to_raw(engine.list_experiments().to_json()),
        None => null_argument("engine"),
    }
}

#[no_mangle]
pub extern "C" fn diagstat_get_experiment(
    engine: *const Engine,
    experiment_id: *const c_char,
) -> *const c_char {
    call(engine, experiment_id, Engine::get_experiment)
}

#[no_mangle]
pub extern "C" fn diagstat_delete_experiment(
    engine: *const Engine,
    experiment_id: *const c_char,
) -> *const c_char {
    call(engine, experiment_id, Engine::delete_experiment)
}

/// Bulk upload of decoded rows: `{"rows": [{...}, ...]}`.
#[no_mangle]
pub extern "C" fn diagstat_upload_rows(
    engine: *const Engine,
    payload: *const c_char,
) -> *const c_char {
    call(engine, payload, Engine::upload_rows)
}

#[no_mangle]
pub extern "C" fn diagstat_kappa(engine: *const Engine, payload: *const c_char) -> *const c_char {
    call(engine, payload, Engine::kappa)
}

#[no_mangle]
pub extern "C" fn diagstat_compare(engine: *const Engine, payload: *const c_char) -> *const c_char {
    call(engine, payload, Engine::compare)
}

/// Free strings allocated by Rust.
#[no_mangle]
pub extern "C" fn diagstat_free_str(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(ptr as *mut c_char);
    }
}

fn call(
    engine: *const Engine,
    input: *const c_char,
    handler: fn(&Engine, &str) -> Response,
) -> *const c_char {
    let Some(engine) = (unsafe { engine.as_ref() }) else {
        return null_argument("engine");
    };
    if input.is_null() {
        return null_argument("input");
    }
    let input = unsafe { CStr::from_ptr(input) }.to_string_lossy();
    string_to_raw(handler(engine, &input).to_json())
}

fn null_argument(field: &'static str) -> *const c_char {
    string_to_raw(Response::error(&DiagError::invalid(field, "null pointer")).to_json())
}

fn string_to_raw(s: String) -> *const c_char {
    match CString::new(s) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => fallback_json_raw(),
    }
}

fn fallback_json_raw() -> *const c_char {
    // Interior NUL in a response body; the static text below never contains one.
    CString::new(r#"{"status":500,"body":{"detail":"response contained NUL","code":8}}"#)
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}
