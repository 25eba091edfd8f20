//! Hygiene — enforces coding standards at test time
//!
//! Scans the crate's production sources for antipatterns. Every budget is
//! zero; if a counted pattern ever becomes genuinely necessary, raise the
//! budget in the same change that adds it and say why.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`, excluding `_test.rs` siblings.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    assert!(!files.is_empty(), "no sources found; is the test running from the crate root?");
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn assert_absent(pattern: &str, reason: &str) {
    let mut hits = Vec::new();
    for file in source_files() {
        for (index, line) in file.content.lines().enumerate() {
            if line.contains(pattern) {
                hits.push(format!("  {}:{}: {}", file.path, index + 1, line.trim()));
            }
        }
    }
    assert!(
        hits.is_empty(),
        "`{pattern}` is banned in production code ({reason}):\n{}",
        hits.join("\n")
    );
}

// --- Panics ---

#[test]
fn no_unwrap() {
    assert_absent(".unwrap()", "crashes the whole wasm instance");
}

#[test]
fn no_expect() {
    assert_absent(".expect(", "crashes the whole wasm instance");
}

#[test]
fn no_panic_macro() {
    assert_absent("panic!(", "engine errors must log and degrade, not abort");
}

#[test]
fn no_unreachable() {
    assert_absent("unreachable!(", "engine errors must log and degrade, not abort");
}

#[test]
fn no_todo_stubs() {
    assert_absent("todo!(", "stubs must not ship");
}

#[test]
fn no_unimplemented_stubs() {
    assert_absent("unimplemented!(", "stubs must not ship");
}

// --- Silent loss ---

#[test]
fn no_silent_discard() {
    assert_absent("let _ =", "discarded results hide failures; handle or log them");
}

#[test]
fn no_dot_ok_discard() {
    assert_absent(".ok()", "converting errors to Option discards the cause");
}

// --- Structure ---

#[test]
fn no_allow_dead_code() {
    assert_absent("#[allow(dead_code)]", "delete unused code instead of silencing the lint");
}

/// The 2d rendering context stays confined to the render module; everything
/// else works on scene/viewport state and stays testable natively.
#[test]
fn canvas_context_is_confined_to_render() {
    let offenders: Vec<String> = source_files()
        .into_iter()
        .filter(|file| {
            let name = Path::new(&file.path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            name != "render.rs"
                && name != "engine.rs"
                && file.content.contains("CanvasRenderingContext2d")
        })
        .map(|file| file.path)
        .collect();
    assert!(
        offenders.is_empty(),
        "CanvasRenderingContext2d referenced outside render/engine:\n  {}",
        offenders.join("\n  ")
    );
}
