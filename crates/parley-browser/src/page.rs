use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Element, Page};
use parley_core::{AccessError, Key, PageAccessor};
use std::time::Duration;
use tokio::time::Instant;

/// CDP modifier bit for Shift
const SHIFT_MODIFIER: i64 = 8;

/// How often `find_first_clickable` re-checks the page
const CLICKABLE_POLL: Duration = Duration::from_millis(250);

/// True when the element is rendered with a size and is not disabled
const CLICKABLE_JS: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0 && !this.disabled;
}"#;

/// Empties a text control through the native value setter so frameworks
/// that track the value (React and friends) see the change
const CLEAR_JS: &str = r#"function() {
    this.focus();
    if ('value' in this) {
        const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(this), 'value');
        if (desc && desc.set) { desc.set.call(this, ''); } else { this.value = ''; }
    } else {
        this.textContent = '';
    }
    this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

/// [`PageAccessor`] backed by a chromiumoxide page
#[derive(Clone)]
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn is_clickable(element: &Element) -> bool {
        match element.call_js_fn(CLICKABLE_JS, false).await {
            Ok(ret) => ret
                .result
                .value
                .as_ref()
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            Err(e) => {
                tracing::debug!("Clickable check failed: {}", e);
                false
            }
        }
    }

    /// Press Enter on the focused element with the given modifier bits
    async fn press_enter(&self, modifiers: i64) -> Result<(), AccessError> {
        let events = [
            (DispatchKeyEventType::KeyDown, Some("\r")),
            (DispatchKeyEventType::KeyUp, None),
        ];

        for (kind, text) in events {
            let mut builder = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key("Enter")
                .code("Enter")
                .windows_virtual_key_code(13)
                .native_virtual_key_code(13)
                .modifiers(modifiers);
            if let Some(text) = text {
                builder = builder.text(text);
            }

            let params = builder.build().map_err(AccessError::Backend)?;
            self.page.execute(params).await.map_err(access_error)?;
        }

        Ok(())
    }
}

#[async_trait]
impl PageAccessor for ChromePage {
    type Handle = Element;

    async fn find_elements(&self, selector: &str) -> Result<Vec<Element>, AccessError> {
        self.page.find_elements(selector).await.map_err(access_error)
    }

    async fn find_first_clickable(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, AccessError> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.page.find_elements(selector).await {
                Ok(elements) => {
                    for element in elements {
                        if Self::is_clickable(&element).await {
                            return Ok(element);
                        }
                    }
                }
                Err(e) => tracing::debug!("Lookup of '{}' failed (retrying): {}", selector, e),
            }

            if Instant::now() >= deadline {
                return Err(AccessError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(CLICKABLE_POLL).await;
        }
    }

    async fn rendered_content(&self, handle: &Element) -> Result<String, AccessError> {
        handle
            .inner_html()
            .await
            .map_err(access_error)?
            .ok_or_else(|| AccessError::Stale("element has no inner HTML".to_string()))
    }

    async fn clear(&self, handle: &Element) -> Result<(), AccessError> {
        handle
            .call_js_fn(CLEAR_JS, false)
            .await
            .map_err(access_error)?;
        Ok(())
    }

    async fn send_text(&self, handle: &Element, text: &str) -> Result<(), AccessError> {
        handle.focus().await.map_err(access_error)?;
        // insertText handles any script, unlike per-character key events
        self.page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(access_error)?;
        Ok(())
    }

    async fn send_key(&self, handle: &Element, key: Key) -> Result<(), AccessError> {
        handle.focus().await.map_err(access_error)?;
        match key {
            Key::Enter => self.press_enter(0).await,
            Key::SoftNewline => self.press_enter(SHIFT_MODIFIER).await,
        }
    }
}

fn access_error(err: CdpError) -> AccessError {
    classify(err.to_string())
}

/// Errors mentioning a node mean the element was detached or re-rendered
fn classify(message: String) -> AccessError {
    if message.to_lowercase().contains("node") {
        AccessError::Stale(message)
    } else {
        AccessError::Backend(message)
    }
}
