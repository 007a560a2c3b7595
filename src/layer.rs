use crate::context;
use crate::logger::Logger;
use crate::record::{Attr, Level};
use serde_json::Value;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that writes `tracing` events through a
/// [`Logger`].
///
/// Event fields become call-site attributes and the `message` field becomes
/// the record message. The invocation context is the one installed with
/// [`context::scope`] or [`context::sync_scope`]; events outside a scope
/// carry no request id. Level filtering is left to the logger.
pub struct LambdaLogLayer {
    logger: Arc<Logger>,
}

impl LambdaLogLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LambdaLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        let level = Level::from(*event.metadata().level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut fields = Vec::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let ctx = context::current();
        let message = message.unwrap_or_default();
        if let Err(e) = self.logger.log(&ctx, level, &message, fields) {
            eprintln!("failed to write log record: {}", e);
        }
    }
}

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Vec<Attr>,
    pub message: &'a mut Option<String>,
}

impl FieldVisitor<'_> {
    fn push(&mut self, field: &Field, value: Value) {
        self.fields.push((field.name().to_string(), value));
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, Value::String(format!("{:?}", value)));
        }
    }
}
