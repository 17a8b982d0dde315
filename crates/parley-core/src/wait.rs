use crate::error::AccessError;
use crate::page::PageAccessor;
use std::time::Duration;
use tokio::time::Instant;

/// Poll until at least one element matches `selector`, returning how many
/// matched. Lookup failures are logged and retried until `timeout` runs out.
pub async fn wait_for_presence<P: PageAccessor>(
    page: &P,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<usize, AccessError> {
    let deadline = Instant::now() + timeout;

    loop {
        match page.find_elements(selector).await {
            Ok(found) if !found.is_empty() => {
                tracing::debug!("Found {} element(s) for '{}'", found.len(), selector);
                return Ok(found.len());
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Lookup of '{}' failed (retrying): {}", selector, e),
        }

        if Instant::now() >= deadline {
            return Err(AccessError::Timeout {
                selector: selector.to_string(),
                timeout,
            });
        }

        tokio::time::sleep(interval).await;
    }
}
