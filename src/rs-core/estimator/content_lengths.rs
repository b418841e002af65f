use std::collections::{HashMap, VecDeque};

/// Maximum number of URLs a `ContentLengthRegistry` remembers.
pub(crate) const MAX_CONTENT_LENGTH_ENTRIES: usize = 1000;

/// Allows to obtain the size in bytes of a resource, when the resource timing facility of the
/// host did not report it.
pub trait ContentLengthLookup {
    /// Returns the last known size, in bytes, of the resource behind `url`.
    fn content_length(&self, url: &str) -> Option<u64>;
}

impl<F> ContentLengthLookup for F
where
    F: Fn(&str) -> Option<u64>,
{
    fn content_length(&self, url: &str) -> Option<u64> {
        self(url)
    }
}

/// Keeps track of the `Content-Length` announced in responses, as reported by the host when it
/// intercepts requests.
///
/// When the same URL is recorded multiple times, the last recorded size wins. Once
/// `MAX_CONTENT_LENGTH_ENTRIES` URLs are known, recording a new one forgets the least recently
/// recorded.
#[derive(Clone, Debug, Default)]
pub struct ContentLengthRegistry {
    sizes: HashMap<String, u64>,

    /// URLs of `sizes`, from the least to the most recently recorded.
    order: VecDeque<String>,
}

impl ContentLengthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the size, in bytes, of the resource behind `url`.
    ///
    /// A size of `0` is not recorded, as it would not allow to estimate anything.
    pub fn add(&mut self, url: &str, size: u64) {
        if size == 0 {
            return;
        }
        if self.sizes.insert(url.to_owned(), size).is_some() {
            self.order.retain(|u| u != url);
        }
        self.order.push_back(url.to_owned());
        while self.order.len() > MAX_CONTENT_LENGTH_ENTRIES {
            if let Some(oldest) = self.order.pop_front() {
                self.sizes.remove(&oldest);
            }
        }
    }

    /// Record the size behind `url` from the raw value of a `Content-Length` header.
    ///
    /// Returns `false` and records nothing if that value could not be parsed.
    pub fn add_header_value(&mut self, url: &str, header_value: &str) -> bool {
        match header_value.trim().parse::<u64>() {
            Ok(size) if size > 0 => {
                self.add(url, size);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
        self.order.clear();
    }
}

impl ContentLengthLookup for ContentLengthRegistry {
    fn content_length(&self, url: &str) -> Option<u64> {
        self.sizes.get(url).copied()
    }
}
