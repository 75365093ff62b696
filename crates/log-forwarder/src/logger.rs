// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log output of the forwarder itself.
//!
//! ```text
//! LOG_FORWARDER | LEVEL | [span_name{span_fields}:] message {event_fields}
//! ```
//!
//! The prefix keeps the forwarder's own lines apart from the records it
//! forwards when both end up in the same host output.

use std::fmt;

use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::error::ForwarderError;

#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(&mut writer, "LOG_FORWARDER | {} | ", metadata.level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                // Stored by the fmt layer when the span was created.
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Directive passed to [`EnvFilter`]. HTTP internals are silenced.
#[must_use]
pub fn filter_directive(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("h2=off,hyper=off,rustls=off,{level}")
}

/// Installs the global subscriber. Fails when one is already installed.
pub fn init(debug: bool) -> Result<(), ForwarderError> {
    let filter = EnvFilter::try_new(filter_directive(debug))
        .map_err(|e| ForwarderError::Logger(e.to_string()))?;

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .event_format(Formatter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ForwarderError::Logger(e.to_string()))?;

    tracing::debug!("Logging subsystem enabled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::{info, info_span, warn};

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .event_format(Formatter)
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_formats_prefix_and_level() {
        let output = capture(|| info!("forwarder started"));
        assert_eq!(output, "LOG_FORWARDER | INFO | forwarder started\n");
    }

    #[test]
    fn test_formats_span_context_and_fields() {
        let output = capture(|| {
            let span = info_span!("flush", batch = 3);
            let _guard = span.enter();
            warn!(skipped = 1, "record dropped");
        });
        assert_eq!(
            output,
            "LOG_FORWARDER | WARN | flush{batch=3}: record dropped skipped=1\n"
        );
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(true), "h2=off,hyper=off,rustls=off,debug");
        assert_eq!(filter_directive(false), "h2=off,hyper=off,rustls=off,info");
        assert!(EnvFilter::try_new(filter_directive(false)).is_ok());
    }
}
