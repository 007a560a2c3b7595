//! Derivation of context attributes for a log call.

use crate::context::InvocationContext;
use crate::record::Attr;
use serde_json::Value;

pub const REQUEST_ID_KEY: &str = "requestId";
pub const TRACE_ID_KEY: &str = "traceId";

const ROOT_PREFIX: &str = "Root=";

/// Extract the root trace id from an X-Ray trace header such as
/// `Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1`.
///
/// Returns `None` when no segment starts with `Root=`.
pub fn trace_id(header: &str) -> Option<&str> {
    header
        .split(';')
        .find_map(|segment| segment.strip_prefix(ROOT_PREFIX))
}

/// Attributes contributed by `ctx`, in order: `requestId`, `traceId`, then the
/// attached fields in insertion order.
pub fn derive_attributes(ctx: &InvocationContext) -> Vec<Attr> {
    let carried = ctx.fields().map_or(0, |f| f.len());
    let mut attrs = Vec::with_capacity(2 + carried);

    if let Some(request_id) = ctx.request_id() {
        attrs.push((REQUEST_ID_KEY.to_string(), Value::from(request_id)));
    }

    if let Some(trace_id) = ctx.trace_header().and_then(trace_id) {
        attrs.push((TRACE_ID_KEY.to_string(), Value::from(trace_id)));
    }

    if let Some(fields) = ctx.fields() {
        attrs.extend(fields.iter().cloned());
    }

    attrs
}
