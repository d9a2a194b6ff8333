//! Fault traces for panics raised inside invocation workers.
//!
//! A process-wide panic hook (installed once, chained to the previous hook) records a backtrace for panics on worker
//! threads and keeps them off stderr; panics anywhere else go to the previous hook unchanged. The raw backtrace is
//! then cut down to the frames of the tested code: panic machinery above it and harness frames below it are removed.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;

struct WorkerSlot {
    capture: bool,
    trace: Option<Backtrace>,
}

thread_local! {
    static WORKER: RefCell<Option<WorkerSlot>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

pub(crate) fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let handled = WORKER
                .try_with(|slot| {
                    let Ok(mut slot) = slot.try_borrow_mut() else {
                        return false;
                    };
                    let Some(worker) = slot.as_mut() else {
                        return false;
                    };
                    if worker.capture {
                        worker.trace = Some(Backtrace::force_capture());
                    }
                    true
                })
                .unwrap_or(false);
            if !handled {
                previous(info);
            }
        }));
    });
}

/// Mark the current thread as a worker.
pub(crate) fn enter_worker(capture: bool) {
    WORKER.with(|slot| *slot.borrow_mut() = Some(WorkerSlot { capture, trace: None }));
}

/// Take the backtrace recorded for the last panic on this worker.
///
/// Symbols are not resolved yet; rendering it is left to the caller, outside the poll budget.
pub(crate) fn take() -> Option<Backtrace> {
    WORKER.with(|slot| slot.borrow_mut().as_mut().and_then(|worker| worker.trace.take()))
}

/// Harness frames that raise or record a panic.
const MACHINERY: &[&str] = &[
    "rust_begin_unwind",
    "__rustc::",
    "__rust_start_panic",
    "gauntlet::trace::",
    "gauntlet::cancel::checkpoint",
    "gauntlet_core::faults::raise",
];

/// Standard library frames above the tested code: panic machinery, the hook's `Box<dyn Fn>` call, indexing.
const LIBRARY: &[&str] = &["std::", "core::", "alloc::", "usize as ", "[T] as ", "str as "];

/// Frames that call into the tested code.
const HARNESS: &[&str] = &[
    "gauntlet::operation::",
    "gauntlet::invoker::",
    "std::panicking::",
    "std::panic::",
    "std::thread::",
    "std::sys::backtrace::__rust_begin_short_backtrace",
    "__rust_try",
];

struct Frame<'a> {
    symbol: &'a str,
    location: Option<&'a str>,
}

fn parse_frames(raw: &str) -> Vec<Frame<'_>> {
    let mut frames: Vec<Frame<'_>> = Vec::new();
    for line in raw.lines().map(str::trim) {
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.location.get_or_insert(location);
            }
        } else if let Some((index, symbol)) = line.split_once(": ") {
            if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
                frames.push(Frame {
                    symbol,
                    location: None,
                });
            }
        }
    }
    frames
}

/// The symbol's path with any leading `<` of a qualified path removed.
fn path(symbol: &str) -> &str {
    symbol.trim_start_matches('<')
}

fn has_prefix(symbol: &str, prefixes: &[&str]) -> bool {
    let path = path(symbol);
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}

fn is_machinery(symbol: &str) -> bool {
    has_prefix(symbol, MACHINERY)
}

fn is_library(symbol: &str) -> bool {
    has_prefix(symbol, LIBRARY)
}

fn is_harness(symbol: &str) -> bool {
    has_prefix(symbol, HARNESS) || symbol.contains(" as gauntlet::operation::Subject>")
}

/// Frames of tested code: below the panic machinery and the library frames it was raised from, above the first
/// harness frame.
fn tested_frames<'a>(frames: &'a [Frame<'a>]) -> &'a [Frame<'a>] {
    let start = frames
        .iter()
        .position(|f| !is_machinery(f.symbol) && !is_library(f.symbol))
        .unwrap_or(frames.len());
    let len = frames[start..].iter().take_while(|f| !is_harness(f.symbol)).count();
    &frames[start..start + len]
}

/// Reduce a rendered backtrace to at most `depth` frames of tested code.
///
/// Returns `None` when no such frames remain (for example when symbols are unavailable).
pub fn strip(raw: &str, depth: usize) -> Option<String> {
    let parsed = parse_frames(raw);
    let frames = tested_frames(&parsed);
    if frames.is_empty() || depth == 0 {
        return None;
    }

    let mut out = String::new();
    for frame in frames.iter().take(depth) {
        out.push_str("at ");
        out.push_str(frame.symbol);
        if let Some(location) = frame.location {
            out.push_str(" (");
            out.push_str(location);
            out.push(')');
        }
        out.push('\n');
    }
    if frames.len() > depth {
        out.push_str(&format!("... {} more\n", frames.len() - depth));
    }
    Some(out)
}
