// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup for the `promptdrop` binary.

use std::{
    env,
    fs::{File, OpenOptions},
    path::Path,
    sync::Arc,
};

use anyhow::{bail, Context as _};
use is_terminal::IsTerminal as _;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Format, Full},
        time::FormatTime,
        FormatFields, MakeWriter,
    },
    layer::{Layer, SubscriberExt as _},
    registry::LookupSpan,
    util::SubscriberInitExt as _,
};

/// Initializes tracing.
///
/// `RUST_LOG`, `RUST_LOG_SPAN_EVENTS` and `RUST_LOG_FORMAT` control the verbosity, the
/// span events and the output format. When `PROMPTDROP_LOG_DIR` is set, logs are also
/// appended to `<PROMPTDROP_LOG_DIR>/<log_name>.log`.
pub fn init(log_name: &str) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        .from_env_lossy();

    let span_events = match env::var("RUST_LOG_SPAN_EVENTS") {
        Ok(events) => parse_span_events(&events)?,
        Err(_) => FmtSpan::NONE,
    };

    let format = env::var("RUST_LOG_FORMAT").ok();
    let color_output =
        !env::var("NO_COLOR").is_ok_and(|value| !value.is_empty()) && std::io::stderr().is_terminal();

    let stderr_layer = prepare_formatted_layer(
        format.as_deref(),
        fmt::layer()
            .with_span_events(span_events.clone())
            .with_writer(std::io::stderr)
            .with_ansi(color_output),
    )?;

    let log_file_layer = match open_log_file(log_name)? {
        Some(file) => Some(prepare_formatted_layer(
            format.as_deref(),
            fmt::layer()
                .with_span_events(span_events)
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_file_layer)
        .with(stderr_layer)
        .try_init()
        .context("a tracing subscriber is already installed")
}

fn open_log_file(log_name: &str) -> anyhow::Result<Option<File>> {
    let Some(log_directory) = env::var_os("PROMPTDROP_LOG_DIR") else {
        return Ok(None);
    };
    let mut log_file_path = Path::new(&log_directory).join(log_name);
    log_file_path.set_extension("log");
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&log_file_path)
        .with_context(|| format!("failed to open log file {}", log_file_path.display()))?;
    Ok(Some(file))
}

fn prepare_formatted_layer<S, N, W, T>(
    formatting: Option<&str>,
    layer: fmt::Layer<S, N, Format<Full, T>, W>,
) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + Send + Sync + 'static,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    T: FormatTime + Send + Sync + 'static,
{
    Ok(match formatting.unwrap_or("plain") {
        "json" => layer.json().boxed(),
        "pretty" => layer.pretty().boxed(),
        "plain" => layer.boxed(),
        format => {
            bail!("invalid RUST_LOG_FORMAT `{format}`: valid values are `plain`, `json` and `pretty`")
        }
    })
}

/// The span events accepted in `RUST_LOG_SPAN_EVENTS`.
const SPAN_EVENTS: [(&str, FmtSpan); 6] = [
    ("new", FmtSpan::NEW),
    ("enter", FmtSpan::ENTER),
    ("exit", FmtSpan::EXIT),
    ("close", FmtSpan::CLOSE),
    ("active", FmtSpan::ACTIVE),
    ("full", FmtSpan::FULL),
];

/// Parses a comma-separated list of span events, such as `new,close`.
fn parse_span_events(events: &str) -> anyhow::Result<FmtSpan> {
    events
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .try_fold(FmtSpan::NONE, |span_events, name| {
            let Some((_, event)) = SPAN_EVENTS.iter().find(|(known, _)| *known == name) else {
                bail!("unknown span event `{name}` in RUST_LOG_SPAN_EVENTS");
            };
            Ok(span_events | event.clone())
        })
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::parse_span_events;

    #[test]
    fn test_parse_span_events() {
        assert_eq!(parse_span_events("").unwrap(), FmtSpan::NONE);
        assert_eq!(
            parse_span_events("new, close").unwrap(),
            FmtSpan::NEW | FmtSpan::CLOSE
        );
        assert_eq!(parse_span_events("full").unwrap(), FmtSpan::FULL);
        assert!(parse_span_events("new,sometimes").is_err());
    }
}
