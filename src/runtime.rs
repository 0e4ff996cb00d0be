//! Runtime - executes commands on tokio
//!
//! The entry itself is synchronous. The driver owns it together with a
//! contact source, runs timers and queries as spawned tasks and feeds their
//! outcome back through a channel as messages, so every update happens on
//! the driver's task.
//!
//! Each query gets a cancellation token; `Cmd::CancelQueries` cancels every
//! outstanding one and dropping the driver cancels everything it started.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::commands::{Cmd, TimerKind};
use crate::destination::DestinationId;
use crate::entry::DestinationEntry;
use crate::messages::{CompletionMsg, EditMsg, Msg};
use crate::source::ContactSource;
use crate::store::DestinationStore;
use crate::update::update;

pub struct EntryDriver<S> {
    entry: DestinationEntry,
    source: S,
    msg_tx: mpsc::UnboundedSender<Msg>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    timers: HashMap<TimerKind, JoinHandle<()>>,
    /// Tokens of queries not yet cancelled, oldest first
    queries: VecDeque<CancellationToken>,
    tasks: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
    clipboard: Option<String>,
    updated: Vec<Option<DestinationId>>,
}

impl<S: ContactSource> EntryDriver<S> {
    pub fn new(entry: DestinationEntry, source: S) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            entry,
            source,
            msg_tx,
            msg_rx,
            timers: HashMap::new(),
            queries: VecDeque::new(),
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
            clipboard: None,
            updated: Vec::new(),
        }
    }

    pub fn entry(&self) -> &DestinationEntry {
        &self.entry
    }

    /// Sender for messages from outside (input layer, popup)
    pub fn sender(&self) -> mpsc::UnboundedSender<Msg> {
        self.msg_tx.clone()
    }

    pub fn dispatch(&mut self, msg: impl Into<Msg>) {
        if let Some(cmd) = update(&mut self.entry, msg.into()) {
            self.process_cmd(cmd);
        }
    }

    /// Type `text` one character at a time
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.dispatch(EditMsg::InsertChar(c));
        }
    }

    /// Edit the store directly; the entry text follows
    pub fn edit_store<R>(&mut self, f: impl FnOnce(&mut DestinationStore) -> R) -> R {
        let result = self.entry.edit_store(f);
        let cmd = self.entry.take_commands();
        self.process_cmd(cmd);
        result
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::StartTimer {
                kind,
                generation,
                delay_ms,
            } => {
                let tx = self.msg_tx.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    let _ = tx.send(CompletionMsg::TimerFired { kind, generation }.into());
                });
                if let Some(previous) = self.timers.insert(kind, handle) {
                    previous.abort();
                }
            }
            Cmd::CancelTimer { kind } => {
                if let Some(handle) = self.timers.remove(&kind) {
                    handle.abort();
                }
            }
            Cmd::QueryContacts { generation, cue } => {
                let token = self.shutdown.child_token();
                self.queries.push_back(token.clone());
                let mut stream = self.source.query(&cue);
                let tx = self.msg_tx.clone();

                self.tasks.push(tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            biased;
                            _ = token.cancelled() => {
                                tracing::trace!(generation, "query cancelled");
                                break;
                            }
                            item = stream.next() => match item {
                                Some(Ok(hit)) => {
                                    let _ = tx.send(CompletionMsg::QueryResult { generation, hit }.into());
                                }
                                Some(Err(e)) => {
                                    let _ = tx.send(
                                        CompletionMsg::QueryFailed {
                                            generation,
                                            error: e.to_string(),
                                        }
                                        .into(),
                                    );
                                }
                                None => {
                                    let _ = tx.send(CompletionMsg::QueryFinished { generation }.into());
                                    break;
                                }
                            }
                        }
                    }
                }));
            }
            Cmd::CancelQueries => {
                while let Some(token) = self.queries.pop_front() {
                    token.cancel();
                }
            }
            Cmd::ResolveContact {
                destination,
                contact_id,
                book,
            } => {
                let token = self.shutdown.child_token();
                let resolve = self.source.resolve(&contact_id, &book);
                let tx = self.msg_tx.clone();

                self.tasks.push(tokio::spawn(async move {
                    let result = tokio::select! {
                        biased;
                        _ = token.cancelled() => return,
                        result = resolve => result,
                    };
                    match result {
                        Ok(hit) => {
                            let _ = tx.send(CompletionMsg::ContactResolved { destination, hit }.into());
                        }
                        Err(e) => {
                            tracing::warn!("Failed to resolve contact {} in {}: {}", contact_id, book, e);
                        }
                    }
                }));
            }
            Cmd::SetClipboard { text } => {
                tracing::debug!(len = text.len(), "clipboard set");
                self.clipboard = Some(text);
            }
            Cmd::NotifyUpdated { destination } => {
                tracing::debug!(?destination, "destination updated");
                self.updated.push(destination);
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
        }
    }

    /// Wait for the next message and apply it. Waits forever when nothing
    /// is pending.
    pub async fn process_next(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    /// Apply messages until no timer, query or resolution is outstanding
    pub async fn settle(&mut self) {
        loop {
            while let Ok(msg) = self.msg_rx.try_recv() {
                self.dispatch(msg);
            }

            self.timers.retain(|_, handle| !handle.is_finished());
            self.tasks.retain(|handle| !handle.is_finished());

            if self.timers.is_empty() && self.tasks.is_empty() {
                match self.msg_rx.try_recv() {
                    Ok(msg) => {
                        self.dispatch(msg);
                        continue;
                    }
                    Err(_) => break,
                }
            }

            let msg = tokio::select! {
                msg = self.msg_rx.recv() => msg,
                _ = tokio::time::sleep(Duration::from_millis(1)) => None,
            };
            if let Some(msg) = msg {
                self.dispatch(msg);
            }
        }
    }
}

impl<S> EntryDriver<S> {
    /// Last text put on the clipboard
    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    /// Destinations committed since the last call
    pub fn take_updated(&mut self) -> Vec<Option<DestinationId>> {
        std::mem::take(&mut self.updated)
    }

    /// Timers armed and tasks still running
    pub fn pending(&self) -> usize {
        self.timers.values().filter(|h| !h.is_finished()).count()
            + self.tasks.iter().filter(|h| !h.is_finished()).count()
    }

    /// Cancel every outstanding query and drop all timers
    pub fn shutdown(&mut self) {
        self.shutdown.cancel();
        while let Some(token) = self.queries.pop_front() {
            token.cancel();
        }
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
    }
}

impl<S> Drop for EntryDriver<S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
