//! QNTX WASM bridge
//!
//! Exposes qntx-core functions through a minimal WASM ABI for any embedding
//! host (browser or server-side runtime). No WASI imports needed — all
//! functions are pure computation with shared memory string passing.
//!
//! # Memory Protocol
//!
//! Strings cross the WASM boundary as (ptr, len) pairs in linear memory.
//! The host allocates via [`wasm_alloc`], writes bytes, calls the function,
//! reads the result, then frees via [`wasm_free`].
//!
//! Return values pack pointer and length into a single u64:
//! `(ptr << 32) | len`

use std::sync::{Mutex, OnceLock};

use qntx_core::fuzzy::FuzzyEngine;
use qntx_core::parser::Parser;
use serde::{Deserialize, Serialize};

// ============================================================================
// Memory management
// ============================================================================

/// Allocate `size` bytes in WASM linear memory. Returns a pointer.
/// The host must call `wasm_free` to release.
#[no_mangle]
pub extern "C" fn wasm_alloc(size: u32) -> u32 {
    let layout = match std::alloc::Layout::from_size_align(size as usize, 1) {
        Ok(l) => l,
        Err(_) => return 0,
    };
    if layout.size() == 0 {
        return 0;
    }
    let ptr = unsafe { std::alloc::alloc(layout) };
    if ptr.is_null() {
        return 0;
    }
    ptr as u32
}

/// Free a buffer previously allocated by `wasm_alloc` or returned by an
/// export function.
#[no_mangle]
pub extern "C" fn wasm_free(ptr: u32, size: u32) {
    if ptr == 0 || size == 0 {
        return;
    }
    let layout = match std::alloc::Layout::from_size_align(size as usize, 1) {
        Ok(l) => l,
        Err(_) => return,
    };
    unsafe {
        std::alloc::dealloc(ptr as *mut u8, layout);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Read a UTF-8 string from WASM linear memory at (ptr, len).
unsafe fn read_str(ptr: u32, len: u32) -> &'static str {
    let slice = std::slice::from_raw_parts(ptr as *const u8, len as usize);
    std::str::from_utf8_unchecked(slice)
}

/// Write a string into newly allocated WASM memory and return packed u64.
/// The caller (host) is responsible for freeing via `wasm_free`.
fn write_result(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let len = bytes.len() as u32;
    let ptr = wasm_alloc(len);
    if ptr == 0 {
        return 0;
    }
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr as *mut u8, len as usize);
    }
    ((ptr as u64) << 32) | (len as u64)
}

/// Write an error JSON response.
fn write_error(msg: &str) -> u64 {
    let json = format!(r#"{{"error":"{}"}}"#, msg.replace('"', "\\\""));
    write_result(&json)
}

// ============================================================================
// Version info
// ============================================================================

/// Get the qntx-core version. Returns a packed u64 (ptr << 32 | len) pointing
/// to a string containing the version (e.g., "0.1.0").
#[no_mangle]
pub extern "C" fn qntx_core_version() -> u64 {
    write_result(env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// Parser
// ============================================================================

/// Parse an AX query string. Takes (ptr, len) pointing to a UTF-8 query
/// string in WASM memory. Returns a packed u64 (ptr << 32 | len) pointing
/// to a JSON-serialized AxQuery result.
///
/// On success: `{"subjects":["ALICE"],"predicates":["author"],...}`
/// On error: `{"error":"description"}`
#[no_mangle]
pub extern "C" fn parse_ax_query(ptr: u32, len: u32) -> u64 {
    let input = unsafe { read_str(ptr, len) };

    match Parser::parse(input) {
        Ok(query) => {
            // Duration unit is optional in the grammar but required for an
            // `over` clause to mean anything; reject "over 5q" here.
            if let Some(qntx_core::parser::TemporalClause::Over(ref dur)) = query.temporal {
                if dur.value.is_some() && dur.unit.is_none() {
                    // Has a number but invalid unit (like "5q")
                    return write_error(&format!("missing unit in '{}'", dur.raw));
                }
            }

            match serde_json::to_string(&query) {
                Ok(json) => write_result(&json),
                Err(e) => write_error(&format!("serialization failed: {}", e)),
            }
        }
        Err(e) => write_error(&format!("{}", e)),
    }
}

// ============================================================================
// Cartesian expansion, grouping, and source dedup (C1)
// ============================================================================

/// Expand attestations into individual claims. Takes (ptr, len) pointing to
/// a JSON `{"attestations":[...]}` payload. Returns `{"claims":[...],"total":n}`.
#[no_mangle]
pub extern "C" fn expand_cartesian_claims(ptr: u32, len: u32) -> u64 {
    let input = unsafe { read_str(ptr, len) };
    write_result(&qntx_core::expand::expand_claims_json(input))
}

/// Group claims by `ClaimKey`. Takes `{"claims":[...]}`, returns
/// `{"groups":[...],"total_groups":n}`.
#[no_mangle]
pub extern "C" fn group_claims(ptr: u32, len: u32) -> u64 {
    let input = unsafe { read_str(ptr, len) };
    write_result(&qntx_core::expand::group_claims_json(input))
}

/// Dedup the source attestation IDs referenced by a claim list. Takes
/// `{"claims":[...]}`, returns `{"ids":[...],"total":n}`.
#[no_mangle]
pub extern "C" fn dedup_source_ids(ptr: u32, len: u32) -> u64 {
    let input = unsafe { read_str(ptr, len) };
    write_result(&qntx_core::expand::dedup_source_ids_json(input))
}

// ============================================================================
// Classification (C5)
// ============================================================================

/// Classify grouped claims into conflicts with resolution strategies. Takes
/// `ClassifyInput` JSON, returns `ClassifyOutput` JSON.
#[no_mangle]
pub extern "C" fn classify_claims(ptr: u32, len: u32) -> u64 {
    let input = unsafe { read_str(ptr, len) };
    write_result(&qntx_core::classify::classify_claims(input))
}

// ============================================================================
// Fuzzy matcher (C3)
// ============================================================================
//
// The WASM module instance holds the live `FuzzyEngine` between calls, since
// rebuilding the index on every lookup would defeat the point of the
// change-detected reindex the engine implements. `fuzzy_rebuild_index` must
// be called at least once before `fuzzy_find_matches` returns anything.

static FUZZY_ENGINE: OnceLock<Mutex<FuzzyEngine>> = OnceLock::new();

fn fuzzy_engine() -> &'static Mutex<FuzzyEngine> {
    FUZZY_ENGINE.get_or_init(|| Mutex::new(FuzzyEngine::new()))
}

#[derive(Debug, Deserialize)]
struct RebuildIndexInput {
    predicates: Vec<String>,
    contexts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RebuildIndexOutput {
    predicate_count: usize,
    context_count: usize,
    hash: String,
}

/// Rebuild the fuzzy matcher's vocabulary index. Takes
/// `{"predicates":[...],"contexts":[...]}`, returns
/// `{"predicate_count":n,"context_count":n,"hash":"..."}`.
#[no_mangle]
pub extern "C" fn fuzzy_rebuild_index(ptr: u32, len: u32) -> u64 {
    let input = unsafe { read_str(ptr, len) };

    let parsed: RebuildIndexInput = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(e) => return write_error(&format!("invalid rebuild_index input: {}", e)),
    };

    let mut engine = match fuzzy_engine().lock() {
        Ok(g) => g,
        Err(e) => return write_error(&format!("engine lock poisoned: {}", e)),
    };
    let (predicate_count, context_count, hash) =
        engine.rebuild_index(parsed.predicates, parsed.contexts);

    match serde_json::to_string(&RebuildIndexOutput {
        predicate_count,
        context_count,
        hash,
    }) {
        Ok(json) => write_result(&json),
        Err(e) => write_error(&format!("serialization failed: {}", e)),
    }
}

#[derive(Debug, Deserialize)]
struct FindMatchesInput {
    query: String,
    vocabulary: FuzzyVocabulary,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default = "default_min_score")]
    min_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FuzzyVocabulary {
    Predicates,
    Contexts,
}

fn default_limit() -> usize {
    20
}

fn default_min_score() -> f64 {
    0.6
}

#[derive(Debug, Serialize)]
struct FindMatchesOutput {
    matches: Vec<qntx_core::fuzzy::FuzzyMatch>,
}

/// Find fuzzy matches against the last-built index. Takes
/// `{"query":"...","vocabulary":"predicates"|"contexts","limit":20,"min_score":0.6}`,
/// returns `{"matches":[...]}`.
#[no_mangle]
pub extern "C" fn fuzzy_find_matches(ptr: u32, len: u32) -> u64 {
    let input = unsafe { read_str(ptr, len) };

    let parsed: FindMatchesInput = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(e) => return write_error(&format!("invalid find_matches input: {}", e)),
    };

    let engine = match fuzzy_engine().lock() {
        Ok(g) => g,
        Err(e) => return write_error(&format!("engine lock poisoned: {}", e)),
    };

    let vocab_type = match parsed.vocabulary {
        FuzzyVocabulary::Predicates => qntx_core::fuzzy::VocabularyType::Predicates,
        FuzzyVocabulary::Contexts => qntx_core::fuzzy::VocabularyType::Contexts,
    };
    let matches = engine.find_matches(&parsed.query, vocab_type, parsed.limit, parsed.min_score);

    match serde_json::to_string(&FindMatchesOutput { matches }) {
        Ok(json) => write_result(&json),
        Err(e) => write_error(&format!("serialization failed: {}", e)),
    }
}
