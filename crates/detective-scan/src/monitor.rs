//! Runtime monitor: a broadcast stream of issues observed while the app runs
//!
//! Every subscriber sees every issue published after it subscribed. Each
//! subscription cancels independently, optionally on a timer. The live hooks
//! into a running app are not wired up; producers call the `report_*` and
//! [`RuntimeMonitor::feed_line`] entry points instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use detective_core::prelude::*;
use detective_core::{Issue, IssueType, Platform, Severity};

use crate::signatures::{
    channel_failure_issue, extract_plugin_name, platforms_in, SignatureScanner, UNKNOWN_PLUGIN,
};

/// Issues buffered per subscriber before the oldest are overwritten
pub const MONITOR_CAPACITY: usize = 256;

#[derive(Debug)]
pub struct RuntimeMonitor {
    sender: broadcast::Sender<Issue>,
    closed_tx: watch::Sender<bool>,
    exclude_plugins: Vec<String>,
    scanner: SignatureScanner,
}

impl Default for RuntimeMonitor {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RuntimeMonitor {
    pub fn new(exclude_plugins: Vec<String>) -> Self {
        Self::with_capacity(exclude_plugins, MONITOR_CAPACITY)
    }

    pub fn with_capacity(exclude_plugins: Vec<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        let (closed_tx, _) = watch::channel(false);
        Self {
            sender,
            closed_tx,
            exclude_plugins,
            // One line at a time, so there is never a trace to follow
            scanner: SignatureScanner::new(false),
        }
    }

    /// Subscribe until cancelled or the monitor closes
    pub fn subscribe(&self) -> IssueSubscription {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        IssueSubscription {
            receiver: self.sender.subscribe(),
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
            closed_rx: self.closed_tx.subscribe(),
            timer: None,
        }
    }

    /// Subscribe for a bounded time. Only this subscription ends when the
    /// timer fires. Must be called from within a tokio runtime.
    pub fn subscribe_for(&self, duration: Duration) -> IssueSubscription {
        let mut subscription = self.subscribe();
        let cancel = subscription.cancel_handle();
        subscription.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            debug!("Monitor subscription expired after {:?}", duration);
            cancel.cancel();
        }));
        subscription
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed_tx.borrow()
    }

    /// Publish an issue to every subscriber. Returns how many received it.
    ///
    /// Excluded plugins and publishes after [`close`](Self::close) are dropped.
    pub fn publish(&self, issue: Issue) -> usize {
        if self.is_closed() {
            trace!("Monitor closed, dropping issue for {}", issue.plugin_name);
            return 0;
        }
        if self.exclude_plugins.contains(&issue.plugin_name) {
            trace!("Plugin {} excluded from monitoring", issue.plugin_name);
            return 0;
        }
        // Err only means nobody is listening
        self.sender.send(issue).unwrap_or(0)
    }

    /// A method-channel invocation that found no native implementation
    pub fn report_channel_failure(
        &self,
        method: &str,
        channel: &str,
        platforms: &[Platform],
    ) -> usize {
        let platforms = if platforms.is_empty() {
            vec![Platform::Unknown]
        } else {
            platforms.to_vec()
        };
        self.publish(channel_failure_issue(method, channel, platforms))
    }

    /// An uncaught exception surfaced by the framework
    pub fn report_uncaught(&self, message: &str, stack: Option<&str>) -> usize {
        let headline = message.lines().next().unwrap_or(message).trim();

        let mut issue = Issue::new(
            extract_plugin_name(message).unwrap_or_else(|| UNKNOWN_PLUGIN.to_string()),
            IssueType::InitializationFailure,
            Severity::High,
            format!("Uncaught exception at runtime: {}", headline),
        )
        .with_platforms(platforms_in(message))
        .detected_now();

        if let Some(stack) = stack.filter(|s| !s.trim().is_empty()) {
            issue = issue.with_stack_trace(stack);
        }
        self.publish(issue)
    }

    /// Run the batch line signatures over one live log line
    pub fn feed_line(&self, line: &str) -> usize {
        self.scanner
            .scan_text(line)
            .into_iter()
            .map(|issue| self.publish(issue))
            .sum()
    }

    /// Stop the stream. Subscribers drain what is buffered, then end.
    pub fn close(&self) {
        if !self.closed_tx.send_replace(true) {
            info!("Runtime monitor closed");
        }
    }
}

/// Cancels one subscription from another task
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// One consumer's view of the monitor stream
#[derive(Debug)]
pub struct IssueSubscription {
    receiver: broadcast::Receiver<Issue>,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
    closed_rx: watch::Receiver<bool>,
    timer: Option<JoinHandle<()>>,
}

impl IssueSubscription {
    /// Next issue, or `None` once cancelled, expired or closed.
    ///
    /// A subscriber that falls more than the channel capacity behind skips the
    /// overwritten issues and carries on.
    pub async fn recv(&mut self) -> Option<Issue> {
        loop {
            if self.is_cancelled() {
                return None;
            }

            tokio::select! {
                biased;

                _ = self.cancel_rx.changed() => return None,

                result = self.receiver.recv() => match result {
                    Ok(issue) => return Some(issue),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Monitor subscriber lagged, skipped {} issue(s)", skipped);
                    }
                    Err(RecvError::Closed) => return None,
                },

                _ = self.closed_rx.wait_for(|closed| *closed) => return None,
            }
        }
    }

    /// Cancel this subscription only
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel_tx))
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Collect issues until the subscription ends
    pub async fn collect(mut self) -> Vec<Issue> {
        let mut issues = Vec::new();
        while let Some(issue) = self.recv().await {
            issues.push(issue);
        }
        issues
    }
}

impl Drop for IssueSubscription {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
