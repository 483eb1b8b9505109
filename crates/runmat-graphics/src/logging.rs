//! Diagnostics plumbing for the graphics engine.
//!
//! Library code logs through the `log` facade. [`init_logging`] routes those
//! records into a `tracing` registry, optionally prints them to stderr and
//! forwards each one as a [`DiagnosticRecord`] to the hook installed with
//! [`set_diagnostics_hook`] (the user-visible error/diary channel).

use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing::Subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    pub ts: String,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<JsonValue>,
}

type DiagnosticsHook = Arc<dyn Fn(&DiagnosticRecord) + Send + Sync>;

static DIAGNOSTICS_HOOK: OnceCell<DiagnosticsHook> = OnceCell::new();

pub struct LoggingGuard {
    _guard: Option<DefaultGuard>,
}

#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter directive used when neither `RUNMAT_GRAPHICS_LOG` nor
    /// `RUST_LOG` is set.
    pub default_level: String,
    /// Print formatted records to stderr.
    pub stderr: bool,
    /// Forward records to the diagnostics hook.
    pub diagnostics: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        LoggingOptions {
            default_level: "info".to_string(),
            stderr: true,
            diagnostics: true,
        }
    }
}

impl From<&LoggingConfig> for LoggingOptions {
    fn from(config: &LoggingConfig) -> Self {
        LoggingOptions {
            default_level: config.level.clone(),
            stderr: true,
            diagnostics: config.diagnostics,
        }
    }
}

/// Install the diagnostics hook. Only the first installation takes effect.
pub fn set_diagnostics_hook<F>(hook: F)
where
    F: Fn(&DiagnosticRecord) + Send + Sync + 'static,
{
    let _ = DIAGNOSTICS_HOOK.set(Arc::new(hook));
}

pub fn init_logging(opts: LoggingOptions) -> LoggingGuard {
    // Route log:: macros into tracing
    let _ = LogTracer::init();

    let env_filter = EnvFilter::try_from_env("RUNMAT_GRAPHICS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(&opts.default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let build_subscriber = || {
        let fmt_layer = opts.stderr.then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
        });
        let bridge_layer = opts.diagnostics.then_some(DiagnosticsBridgeLayer);
        tracing_subscriber::registry()
            .with(env_filter.clone())
            .with(fmt_layer)
            .with(bridge_layer)
    };

    let guard = match tracing::subscriber::set_global_default(build_subscriber()) {
        Ok(()) => None,
        Err(_) => Some(tracing::subscriber::set_default(build_subscriber())),
    };

    LoggingGuard { _guard: guard }
}

#[derive(Clone, Copy)]
struct DiagnosticsBridgeLayer;

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

impl<S> Layer<S> for DiagnosticsBridgeLayer
where
    S: Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let Some(hook) = DIAGNOSTICS_HOOK.get() else {
            return;
        };
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        // Records bridged from `log` carry their origin in `log.*` fields.
        let mut target = event.metadata().target().to_string();
        if let Some(JsonValue::Object(map)) = visitor.fields.as_mut() {
            if let Some(JsonValue::String(t)) = map.remove("log.target") {
                target = t;
            }
            map.retain(|k, _| !k.starts_with("log."));
        }

        let record = DiagnosticRecord {
            ts: now_rfc3339(),
            level: event.metadata().level().to_string(),
            target,
            message: visitor
                .message
                .unwrap_or_else(|| event.metadata().name().to_string()),
            fields: visitor
                .fields
                .filter(|obj| obj.as_object().map(|m| !m.is_empty()).unwrap_or(false)),
        };

        hook(&record);
    }
}

#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: Option<JsonValue>,
}

impl JsonVisitor {
    fn insert(&mut self, name: &str, entry: JsonValue) {
        let obj = self
            .fields
            .get_or_insert_with(|| JsonValue::Object(Default::default()));
        if let JsonValue::Object(map) = obj {
            map.insert(name.to_string(), entry);
        }
    }
}

impl tracing::field::Visit for JsonVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let text = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.insert(field.name(), JsonValue::String(text));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field.name(), JsonValue::String(value.to_string()));
        }
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.insert(field.name(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field.name(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field.name(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field.name(), JsonValue::Bool(value));
    }
}
