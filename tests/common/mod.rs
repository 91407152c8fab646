/*!
 * Shared Test Utilities
 * Log capture through a tracing-subscriber writer
 */

#![allow(dead_code)]

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatted log output for assertions
///
/// The subscriber is installed as the thread default, so it sees events from
/// tasks spawned on a current-thread runtime.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, level: Level) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(level)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Lines containing `needle`
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

// =============================================================================
// Script helpers
// =============================================================================

use script_proc::{
    register_concurrency_primitives, Expr, NativeFunction, PrimitiveRegistry, RuntimeConfig,
    Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Registry with the concurrency primitives installed
pub fn registry() -> PrimitiveRegistry {
    let registry = PrimitiveRegistry::new(RuntimeConfig::default());
    register_concurrency_primitives(&registry);
    registry
}

pub fn int(n: i64) -> Expr {
    Expr::Literal(Value::integer(n))
}

pub fn lit(value: &Value) -> Expr {
    Expr::Literal(value.clone())
}

/// One-argument callback that counts its invocations
pub fn counting_callback(calls: &Arc<AtomicUsize>) -> Value {
    let counter = Arc::clone(calls);
    NativeFunction::new("counter", 1, move |_args, _env| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(Value::Nil) }
    })
    .into_value()
}

pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}
