//! # Test Utilities
//!
//! Scripted collaborators for exercising the content script and the popup
//! without a browser or network:
//!
//! - [`ScriptedFetcher`] - queued rate responses, optionally held back until
//!   the test releases them
//! - [`RecordingNotifier`] - collects every notice
//! - [`ScriptedConsent`] - answers every prompt the same way

use crate::error::{AppError, Result};
use crate::notify::{Consent, Notice, Notifier};
use crate::rates::{RateFetcher, RateTable};
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

enum Scripted {
    Ready(Result<RateTable>),
    Gated(Receiver<Result<RateTable>>),
}

/// Rate fetcher answering from a queue.
///
/// When the queue is empty the `always` table is returned, or a transport
/// error if there is none.
#[derive(Default)]
pub struct ScriptedFetcher {
    queue: Mutex<VecDeque<Scripted>>,
    always: Option<RateTable>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher returning `table` for every request.
    pub fn always(table: RateTable) -> Self {
        Self {
            always: Some(table),
            ..Self::default()
        }
    }

    pub fn push_ok(&self, table: RateTable) {
        self.queue.lock().push_back(Scripted::Ready(Ok(table)));
    }

    pub fn push_err(&self, err: AppError) {
        self.queue.lock().push_back(Scripted::Ready(Err(err)));
    }

    /// Queue a response that stays pending until a result is sent on the
    /// returned sender.
    pub fn push_gated(&self) -> Sender<Result<RateTable>> {
        let (sender, receiver) = async_channel::bounded(1);
        self.queue.lock().push_back(Scripted::Gated(receiver));
        sender
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Base currencies requested, in order.
    pub fn requested_bases(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait(?Send)]
impl RateFetcher for ScriptedFetcher {
    async fn fetch(&self, base: &str) -> Result<RateTable> {
        self.calls.lock().push(base.to_string());

        let next = self.queue.lock().pop_front();
        match next {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(receiver)) => receiver
                .recv()
                .await
                .unwrap_or_else(|_| Err(AppError::Transport("gate dropped".to_string()))),
            None => self
                .always
                .clone()
                .ok_or_else(|| AppError::Transport("no scripted response".to_string())),
        }
    }
}

/// Notifier keeping every notice.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Consent with a fixed answer.
#[derive(Debug, Default)]
pub struct ScriptedConsent {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConsent {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait(?Send)]
impl Consent for ScriptedConsent {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}
