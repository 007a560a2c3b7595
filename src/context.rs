//! Invocation context and the field carrier attached to it.
//!
//! [`InvocationContext`] is an immutable value: every `with_*` method
//! returns a new context and leaves the receiver untouched, so a context can
//! be shared freely between tasks handling the same invocation.

use crate::env::TRACE_ID_ENV;
use crate::record::Attr;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Header name under which the Lambda runtime delivers the X-Ray trace header.
pub const TRACE_HEADER_NAME: &str = "x-amzn-trace-id";

/// Immutable, append-only list of caller-supplied attributes.
///
/// Cloning is cheap; entries are shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCarrier {
    entries: Arc<[Attr]>,
}

impl Default for FieldCarrier {
    fn default() -> Self {
        FieldCarrier {
            entries: Arc::from(Vec::new()),
        }
    }
}

impl FieldCarrier {
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        FieldCarrier {
            entries: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Return a new carrier holding these entries followed by `fields`.
    pub fn append<I, K, V>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let entries = self
            .entries
            .iter()
            .cloned()
            .chain(fields.into_iter().map(|(k, v)| (k.into(), v.into())))
            .collect();
        FieldCarrier { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-invocation data the host hands to a handler.
///
/// Holds the Lambda request id, an optional trace header and at most one
/// [`FieldCarrier`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationContext {
    request_id: Option<Arc<str>>,
    trace_header: Option<Arc<str>>,
    fields: Option<FieldCarrier>,
}

impl InvocationContext {
    /// An empty context: no request id, no trace header, no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for the current invocation as seen through the process
    /// environment. The Lambda runtime exports the trace header as
    /// `_X_AMZN_TRACE_ID`; the request id is only known to the runtime
    /// client and has to be supplied with [`with_request_id`](Self::with_request_id).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(TRACE_ID_ENV) {
            Some(header) if !header.is_empty() => Self::new().with_trace_header(header),
            _ => Self::new(),
        }
    }

    pub fn with_request_id(&self, request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(Arc::from(request_id.into())),
            ..self.clone()
        }
    }

    pub fn with_trace_header(&self, header: impl Into<String>) -> Self {
        Self {
            trace_header: Some(Arc::from(header.into())),
            ..self.clone()
        }
    }

    /// Attach caller fields, returning the derived context.
    ///
    /// A previously attached carrier is replaced in the derived context, not
    /// merged. Use [`FieldCarrier::append`] to build on existing fields.
    pub fn with_fields<I, K, V>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.with_carrier(FieldCarrier::new(fields))
    }

    pub fn with_carrier(&self, carrier: FieldCarrier) -> Self {
        Self {
            fields: Some(carrier),
            ..self.clone()
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Look up a header by name. Only [`TRACE_HEADER_NAME`] is carried.
    pub fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case(TRACE_HEADER_NAME) {
            self.trace_header.as_deref()
        } else {
            None
        }
    }

    pub fn trace_header(&self) -> Option<&str> {
        self.header(TRACE_HEADER_NAME)
    }

    pub fn fields(&self) -> Option<&FieldCarrier> {
        self.fields.as_ref()
    }
}

tokio::task_local! {
    static CURRENT: InvocationContext;
}

/// Run `future` with `ctx` as the ambient context for bridged `tracing`
/// events (see [`crate::layer::LambdaLogLayer`]).
pub async fn scope<F>(ctx: InvocationContext, future: F) -> F::Output
where
    F: Future,
{
    CURRENT.scope(ctx, future).await
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<F, R>(ctx: InvocationContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT.sync_scope(ctx, f)
}

/// The ambient context, or an empty one outside any scope.
pub fn current() -> InvocationContext {
    CURRENT.try_with(Clone::clone).unwrap_or_default()
}
