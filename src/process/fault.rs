/*!
 * Fault Containment
 *
 * Runs spawned work so that a panic raised inside it never crosses the task
 * boundary. A contained fault is logged as its panic message followed by a
 * bounded excerpt of the faulting stack, each line prefixed with the
 * caller's tag, and then swallowed.
 *
 * The faulting stack is captured by a process-wide panic hook that only
 * records panics raised while a containment scope is being polled on the
 * current thread; every other panic is passed to the previously installed
 * hook unchanged.
 */

use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};
use tracing::error;

thread_local! {
    static SCOPE_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_FAULT: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if SCOPE_DEPTH.with(Cell::get) > 0 {
                let backtrace = Backtrace::force_capture();
                LAST_FAULT.with(|slot| *slot.borrow_mut() = Some(backtrace));
            } else {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as inside a containment scope while alive
struct ScopeGuard;

impl ScopeGuard {
    fn enter() -> Self {
        SCOPE_DEPTH.with(|depth| depth.set(depth.get() + 1));
        ScopeGuard
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// A panic intercepted inside a containment scope
#[derive(Debug, Clone)]
pub struct Fault {
    pub message: String,
    pub frames: Vec<String>,
}

impl Fault {
    fn from_payload(payload: Box<dyn Any + Send>, backtrace: Option<Backtrace>, limit: usize) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };

        let frames = backtrace
            .map(|bt| excerpt(&bt, limit))
            .unwrap_or_default();

        Self { message, frames }
    }

    /// Write the fault to the log, every line prefixed with `tag`
    pub fn log(&self, tag: &str) {
        error!(tag = tag, "{}: runtime fault: {}", tag, self.message);
        for frame in &self.frames {
            error!(tag = tag, "{}: {}", tag, frame);
        }
    }
}

/// Frames of the panic machinery and of this module are skipped
fn is_machinery(symbol: &str) -> bool {
    const PREFIXES: [&str; 9] = [
        "std::",
        "core::",
        "alloc::",
        "<std::",
        "<core::",
        "<alloc::",
        "rust_begin_unwind",
        "__rust",
        "<unknown>",
    ];
    PREFIXES.iter().any(|p| symbol.starts_with(p)) || symbol.contains("process::fault::")
}

/// Take up to `limit` frame descriptions from the faulting stack
fn excerpt(backtrace: &Backtrace, limit: usize) -> Vec<String> {
    let rendered = backtrace.to_string();
    rendered
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let (index, symbol) = line.split_once(": ")?;
            index.chars().all(|c| c.is_ascii_digit()).then_some(symbol)
        })
        .filter(|symbol| !is_machinery(symbol))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Future adapter that polls its inner work inside a containment scope
struct FaultScope<'a> {
    inner: BoxFuture<'a, Result<(), Box<dyn Any + Send>>>,
    frames: usize,
}

impl<'a> FaultScope<'a> {
    fn new<F>(work: F, frames: usize) -> Self
    where
        F: Future<Output = ()> + Send + 'a,
    {
        Self {
            inner: AssertUnwindSafe(work).catch_unwind().boxed(),
            frames,
        }
    }
}

impl Future for FaultScope<'_> {
    type Output = Result<(), Fault>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _scope = ScopeGuard::enter();
        match self.inner.as_mut().poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(())) => Poll::Ready(Ok(())),
            Poll::Ready(Err(payload)) => {
                let backtrace = LAST_FAULT.with(|slot| slot.borrow_mut().take());
                Poll::Ready(Err(Fault::from_payload(payload, backtrace, self.frames)))
            }
        }
    }
}

/// Run `work`, containing and logging any fault it raises
///
/// Returns normally whether the work completed or faulted.
pub async fn contain<F>(tag: &str, frames: usize, work: F)
where
    F: Future<Output = ()> + Send,
{
    if let Err(fault) = contain_fault(frames, work).await {
        fault.log(tag);
    }
}

/// Run `work` inside a containment scope and hand back the fault, if any
pub async fn contain_fault<F>(frames: usize, work: F) -> Result<(), Fault>
where
    F: Future<Output = ()> + Send,
{
    install_hook();
    FaultScope::new(work, frames).await
}
