//! Per-record execution context.
//!
//! Every decoded record is wrapped in its own `RecordContext` before it reaches
//! the dispatcher. The context owns the record's tracing span and any
//! correlation metadata written while the record is handled; nothing in it is
//! shared with other records. Teardown happens through a drop guard so it runs
//! exactly once whichever way the dispatcher returns.

use crate::domain::RawRecord;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::Span;
use uuid::Uuid;

/// State scoped to a single record.
#[derive(Debug)]
pub struct RecordContext {
    sequence: u64,
    id: Uuid,
    span: Span,
    metadata: Map<String, Value>,
}

impl RecordContext {
    fn new(sequence: u64) -> Self {
        let id = Uuid::new_v4();
        let span = tracing::debug_span!("record", sequence, id = %id);
        Self {
            sequence,
            id,
            span,
            metadata: Map::new(),
        }
    }

    /// Position of the record in its stream, starting at 0.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

#[derive(Debug, Default)]
struct CarrierCounters {
    entered: AtomicU64,
    torn_down: AtomicU64,
}

/// Hands out one isolated context per record.
#[derive(Debug, Default)]
pub struct ContextCarrier {
    next_sequence: u64,
    counters: Arc<CarrierCounters>,
}

impl ContextCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, record: RawRecord) -> ScopedRecord {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.counters.entered.fetch_add(1, Ordering::Relaxed);

        ScopedRecord {
            context: RecordContext::new(sequence),
            record,
            guard: ContextGuard {
                counters: Arc::clone(&self.counters),
            },
        }
    }

    /// Contexts entered but not yet torn down.
    pub fn live(&self) -> u64 {
        self.entered() - self.torn_down()
    }

    pub fn entered(&self) -> u64 {
        self.counters.entered.load(Ordering::Relaxed)
    }

    pub fn torn_down(&self) -> u64 {
        self.counters.torn_down.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct ContextGuard {
    counters: Arc<CarrierCounters>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.counters.torn_down.fetch_add(1, Ordering::Relaxed);
    }
}

/// A record bound to its context, waiting to be processed.
#[derive(Debug)]
pub struct ScopedRecord {
    context: RecordContext,
    record: RawRecord,
    guard: ContextGuard,
}

impl ScopedRecord {
    pub fn context(&self) -> &RecordContext {
        &self.context
    }

    /// Run `f` inside the record's span, then tear the context down.
    pub fn run<F, R>(self, f: F) -> R
    where
        F: FnOnce(&mut RecordContext, RawRecord) -> R,
    {
        let ScopedRecord {
            mut context,
            record,
            guard,
        } = self;

        let span = context.span.clone();
        let result = span.in_scope(|| f(&mut context, record));

        tracing::trace!(parent: &span, metadata = ?context.metadata, "record context closed");
        drop(context);
        drop(guard);
        result
    }
}
