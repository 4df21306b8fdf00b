//! `monitor` subcommand: live issue stream as NDJSON
//!
//! Log lines arrive on an input stream (stdin for the binary, typically piped
//! from `flutter run`). Each line goes through the runtime monitor and every
//! issue it yields is written as one JSON object per line:
//!
//! ```json
//! {"event":"started","timestamp":1704700001000}
//! {"event":"issue","issue":{"pluginName":"camera",...},"timestamp":1704700002000}
//! {"event":"stopped","issues":1,"reason":"input closed","timestamp":1704700003000}
//! ```

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use detective_app::{Detective, DetectiveConfig};
use detective_core::prelude::*;
use detective_core::Issue;
use detective_scan::{IssueSubscription, RuntimeMonitor, StaticProbe};

use super::signals::spawn_signal_handler;

#[derive(Debug, Clone, Default)]
pub struct MonitorOptions {
    /// Stop after this long; `None` runs until input ends or a signal
    pub duration: Option<Duration>,
    /// Exclusions come from `exclude_plugins`
    pub config: DetectiveConfig,
    /// Listen for SIGINT/SIGTERM
    pub handle_signals: bool,
}

/// Events written in monitor mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    Started {
        timestamp: i64,
    },
    Issue {
        issue: Issue,
        timestamp: i64,
    },
    Stopped {
        issues: usize,
        reason: String,
        timestamp: i64,
    },
}

impl MonitorEvent {
    pub fn started() -> Self {
        Self::Started {
            timestamp: Self::now(),
        }
    }

    pub fn issue(issue: Issue) -> Self {
        Self::Issue {
            issue,
            timestamp: Self::now(),
        }
    }

    pub fn stopped(issues: usize, reason: impl Into<String>) -> Self {
        Self::Stopped {
            issues,
            reason: reason.into(),
            timestamp: Self::now(),
        }
    }

    /// Serialize and write one line, flushing immediately
    pub fn emit<W: Write>(&self, out: &mut W) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize monitor event: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(out, "{}", json) {
            error!("Failed to write monitor event: {}", e);
            return;
        }

        if let Err(e) = out.flush() {
            error!("Failed to flush monitor output: {}", e);
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Stream issues from `input` to `out` until the input ends, the duration
/// expires, or a signal arrives. Returns the number of issues emitted.
pub async fn run_monitor<R, W>(options: MonitorOptions, input: R, out: &mut W) -> Result<usize>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: Write,
{
    // Toolchain versions are never reported in monitor mode
    let detective = Detective::with_probe(options.config, StaticProbe::unknown());
    let monitor = detective.monitor();

    // Subscribe before anything is fed so no early issue is missed
    let mut subscription = match options.duration {
        Some(duration) => detective.monitor_runtime_for(duration),
        None => detective.monitor_runtime(),
    };

    let signals = options
        .handle_signals
        .then(|| spawn_signal_handler(subscription.cancel_handle()));
    let reader = tokio::spawn(feed_lines(Arc::clone(&monitor), input));

    MonitorEvent::started().emit(out);
    let emitted = drain(&mut subscription, out).await;

    let reason = if monitor.is_closed() {
        "input closed"
    } else if signals.as_ref().is_some_and(|task| task.is_finished()) {
        "interrupted"
    } else {
        "duration elapsed"
    };
    MonitorEvent::stopped(emitted, reason).emit(out);
    info!("Monitor stopped ({}), {} issue(s) reported", reason, emitted);

    reader.abort();
    if let Some(signals) = signals {
        signals.abort();
    }
    Ok(emitted)
}

async fn drain<W: Write>(subscription: &mut IssueSubscription, out: &mut W) -> usize {
    let mut emitted = 0;
    while let Some(issue) = subscription.recv().await {
        debug!("Monitor issue: {} ({})", issue.plugin_name, issue.issue_type);
        MonitorEvent::issue(issue).emit(out);
        emitted += 1;
    }
    emitted
}

/// Feed every line into the monitor, closing it at end of input
async fn feed_lines<R: AsyncBufRead + Unpin>(monitor: Arc<RuntimeMonitor>, input: R) {
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                monitor.feed_line(&line);
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read monitor input: {}", e);
                break;
            }
        }
    }
    monitor.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    fn events(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_issues_streamed_until_input_ends() {
        let input: &'static [u8] = b"I/flutter ( 1): starting\n\
            MissingPluginException(No implementation found for method read on channel battery/methods)\n";
        let mut out = Vec::new();

        let emitted = timeout(WAIT, run_monitor(MonitorOptions::default(), input, &mut out))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(emitted, 2);
        let events = events(&out);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0]["event"], "started");
        assert_eq!(events[1]["event"], "issue");
        assert_eq!(events[1]["issue"]["pluginName"], "battery");
        assert_eq!(events[3]["event"], "stopped");
        assert_eq!(events[3]["issues"], 2);
        assert_eq!(events[3]["reason"], "input closed");
    }

    #[tokio::test]
    async fn test_excluded_plugins_not_streamed() {
        let input: &'static [u8] =
            b"MissingPluginException(No implementation found for method read on channel battery/methods)\n";
        let options = MonitorOptions {
            config: DetectiveConfig::default().excluding(["battery".to_string()]),
            ..Default::default()
        };
        let mut out = Vec::new();

        let emitted = timeout(WAIT, run_monitor(options, input, &mut out))
            .await
            .unwrap()
            .unwrap();

        // Only the method-channel-not-found issue, which is not keyed by channel
        assert_eq!(emitted, 1);
        let events = events(&out);
        assert_eq!(events[1]["issue"]["issueType"], "method-channel-not-found");
        assert_ne!(events[1]["issue"]["pluginName"], "battery");
    }

    #[tokio::test]
    async fn test_duration_bounds_an_open_input() {
        let (_writer, reader) = tokio::io::duplex(64);
        let input = tokio::io::BufReader::new(reader);
        let options = MonitorOptions {
            duration: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let mut out = Vec::new();

        let emitted = timeout(WAIT, run_monitor(options, input, &mut out))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(emitted, 0);
        let events = events(&out);
        assert_eq!(events.last().unwrap()["reason"], "duration elapsed");
    }
}
