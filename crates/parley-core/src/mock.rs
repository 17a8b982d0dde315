//! Scripted page used by the unit tests.
//!
//! Every script is a queue; the last entry repeats forever once the others
//! have been consumed.

use crate::config::DEFAULT_INPUT_SELECTOR;
use crate::error::AccessError;
use crate::page::{Key, PageAccessor};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockHandle {
    Input,
    Reply(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Clear,
    Text(String),
    Key(Key),
}

struct Script<T: Clone>(Mutex<VecDeque<T>>);

impl<T: Clone> Script<T> {
    fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self(Mutex::new(items.into_iter().collect()))
    }

    fn next(&self) -> Option<T> {
        let mut queue = self.0.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

pub struct MockPage {
    input_presence: Script<bool>,
    input_clickable: bool,
    counts: Script<Result<usize, AccessError>>,
    contents: Script<Result<String, AccessError>>,
    count_queries: Mutex<usize>,
    reads: Mutex<Vec<usize>>,
    actions: Mutex<Vec<Action>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self {
            input_presence: Script::new([true]),
            input_clickable: true,
            counts: Script::new([Ok(0)]),
            contents: Script::new([Ok(String::new())]),
            count_queries: Mutex::new(0),
            reads: Mutex::new(Vec::new()),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Successive answers to "how many replies are on the page"
    pub fn with_counts(mut self, counts: impl IntoIterator<Item = Result<usize, AccessError>>) -> Self {
        self.counts = Script::new(counts);
        self
    }

    /// Successive reads of the tracked reply's markup
    pub fn with_contents(
        mut self,
        contents: impl IntoIterator<Item = Result<String, AccessError>>,
    ) -> Self {
        self.contents = Script::new(contents);
        self
    }

    /// Successive answers to "is the chat input present"
    pub fn with_input_presence(mut self, presence: impl IntoIterator<Item = bool>) -> Self {
        self.input_presence = Script::new(presence);
        self
    }

    pub fn with_unclickable_input(mut self) -> Self {
        self.input_clickable = false;
        self
    }

    pub fn count_queries(&self) -> usize {
        *self.count_queries.lock().unwrap()
    }

    /// Indexes of the reply handles whose content was read, in order
    pub fn reads(&self) -> Vec<usize> {
        self.reads.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }
}

/// Shorthand for a scripted markup read
pub fn html(content: &str) -> Result<String, AccessError> {
    Ok(content.to_string())
}

#[async_trait]
impl PageAccessor for MockPage {
    type Handle = MockHandle;

    async fn find_elements(&self, selector: &str) -> Result<Vec<MockHandle>, AccessError> {
        if selector == DEFAULT_INPUT_SELECTOR {
            let present = self.input_presence.next().unwrap_or(false);
            return Ok(if present { vec![MockHandle::Input] } else { vec![] });
        }

        *self.count_queries.lock().unwrap() += 1;
        let count = self.counts.next().unwrap_or(Ok(0))?;
        Ok((0..count).map(MockHandle::Reply).collect())
    }

    async fn find_first_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<MockHandle, AccessError> {
        if self.input_clickable {
            Ok(MockHandle::Input)
        } else {
            Err(AccessError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn rendered_content(&self, handle: &MockHandle) -> Result<String, AccessError> {
        match handle {
            MockHandle::Reply(idx) => {
                self.reads.lock().unwrap().push(*idx);
                self.contents.next().unwrap_or_else(|| Ok(String::new()))
            }
            MockHandle::Input => Err(AccessError::Backend("input has no reply content".to_string())),
        }
    }

    async fn clear(&self, _handle: &MockHandle) -> Result<(), AccessError> {
        self.actions.lock().unwrap().push(Action::Clear);
        Ok(())
    }

    async fn send_text(&self, _handle: &MockHandle, text: &str) -> Result<(), AccessError> {
        self.actions.lock().unwrap().push(Action::Text(text.to_string()));
        Ok(())
    }

    async fn send_key(&self, _handle: &MockHandle, key: Key) -> Result<(), AccessError> {
        self.actions.lock().unwrap().push(Action::Key(key));
        Ok(())
    }
}
