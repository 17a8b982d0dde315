use crate::error::AccessError;
use async_trait::async_trait;
use std::time::Duration;

/// Keys the tracker presses on the input control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Plain Enter, submits the message
    Enter,
    /// Shift+Enter, a line break inside the message
    SoftNewline,
}

/// One unit of input sent to the prompt control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    Text(String),
    Key(Key),
}

/// Capabilities the reply tracker needs from a rendered page.
///
/// Handles are owned by the implementation and may go stale at any time
/// when the page re-renders; callers treat every error as retryable while
/// polling.
#[async_trait]
pub trait PageAccessor: Send + Sync {
    type Handle: Send + Sync;

    /// All elements currently matching `selector`, in document order.
    async fn find_elements(&self, selector: &str) -> Result<Vec<Self::Handle>, AccessError>;

    /// First element matching `selector` that can receive input, waiting up
    /// to `timeout` for one to show up.
    async fn find_first_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Handle, AccessError>;

    /// Current rendered markup (inner HTML) of the element.
    async fn rendered_content(&self, handle: &Self::Handle) -> Result<String, AccessError>;

    /// Remove any text already present in an input control.
    async fn clear(&self, handle: &Self::Handle) -> Result<(), AccessError>;

    /// Type `text` into the element. `text` never contains line breaks.
    async fn send_text(&self, handle: &Self::Handle, text: &str) -> Result<(), AccessError>;

    async fn send_key(&self, handle: &Self::Handle, key: Key) -> Result<(), AccessError>;
}

/// Split a prompt into text chunks and soft newlines so a multi-line prompt
/// is entered as one message instead of being submitted at the first line
/// break. `\r\n` and lone `\r` count as line breaks.
///
/// The returned sequence never contains a raw newline inside a text chunk
/// and does not include the final submit key.
pub fn encode_prompt(prompt: &str) -> Vec<Keystroke> {
    let unified = prompt.replace("\r\n", "\n").replace('\r', "\n");
    let mut keystrokes = Vec::new();

    for (idx, line) in unified.split('\n').enumerate() {
        if idx > 0 {
            keystrokes.push(Keystroke::Key(Key::SoftNewline));
        }
        if !line.is_empty() {
            keystrokes.push(Keystroke::Text(line.to_string()));
        }
    }

    keystrokes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_chunks(keystrokes: &[Keystroke]) -> Vec<&str> {
        keystrokes
            .iter()
            .filter_map(|k| match k {
                Keystroke::Text(t) => Some(t.as_str()),
                Keystroke::Key(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_single_line_prompt_is_one_chunk() {
        let keystrokes = encode_prompt("hello there");
        assert_eq!(keystrokes, vec![Keystroke::Text("hello there".to_string())]);
    }

    #[test]
    fn test_newlines_become_soft_newlines() {
        let keystrokes = encode_prompt("first\nsecond\n\nfourth");

        assert_eq!(
            keystrokes,
            vec![
                Keystroke::Text("first".to_string()),
                Keystroke::Key(Key::SoftNewline),
                Keystroke::Text("second".to_string()),
                Keystroke::Key(Key::SoftNewline),
                Keystroke::Key(Key::SoftNewline),
                Keystroke::Text("fourth".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_text_chunk_contains_a_line_break() {
        let prompts = [
            "a\nb",
            "windows\r\nline\r\nendings",
            "old mac\rendings",
            "\nleading and trailing\n",
            "\n\n\n",
        ];

        for prompt in prompts {
            let keystrokes = encode_prompt(prompt);
            for chunk in text_chunks(&keystrokes) {
                assert!(
                    !chunk.contains('\n') && !chunk.contains('\r'),
                    "chunk {:?} from {:?} contains a line break",
                    chunk,
                    prompt
                );
            }
        }
    }

    #[test]
    fn test_crlf_counts_as_one_line_break() {
        let keystrokes = encode_prompt("a\r\nb");
        let soft = keystrokes
            .iter()
            .filter(|k| **k == Keystroke::Key(Key::SoftNewline))
            .count();
        assert_eq!(soft, 1);
        assert_eq!(text_chunks(&keystrokes), vec!["a", "b"]);
    }
}
