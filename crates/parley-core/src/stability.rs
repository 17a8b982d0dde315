/// Result of feeding one content read into a [`StabilitySnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Content differs from the previous read; the counter restarted
    Changed,
    /// Content matches the previous read this many times in a row
    Repeated(u32),
    /// Content matched the previous read `threshold` times in a row
    Stable,
}

/// Last observed content of a reply element plus the number of consecutive
/// reads that returned exactly the same bytes.
///
/// The first read is never compared against anything, so an element that
/// starts out empty is not mistaken for a finished one.
#[derive(Debug, Clone)]
pub struct StabilitySnapshot {
    previous: Option<String>,
    repeats: u32,
    threshold: u32,
}

impl StabilitySnapshot {
    pub fn new(threshold: u32) -> Self {
        Self {
            previous: None,
            repeats: 0,
            threshold: threshold.max(1),
        }
    }

    /// Record one read of the element's content
    pub fn observe(&mut self, content: String) -> Observation {
        if self.previous.as_deref() == Some(content.as_str()) {
            self.repeats += 1;
            if self.repeats >= self.threshold {
                Observation::Stable
            } else {
                Observation::Repeated(self.repeats)
            }
        } else {
            self.previous = Some(content);
            self.repeats = 0;
            Observation::Changed
        }
    }

    /// Forget the repeat count but keep the last content
    pub fn reset(&mut self) {
        self.repeats = 0;
    }

    /// Most recently observed content
    pub fn content(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn repeats(&self) -> u32 {
        self.repeats
    }
}
