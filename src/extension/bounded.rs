use core::fmt;
use core::ops::Deref;

use heapless::String;
use serde::{Deserialize, Serialize};

/// String of at most `N` bytes.
///
/// Input that does not fit is cut at the last UTF-8 boundary that fits, and the value remembers
/// that it was cut. Writing through [`fmt::Write`] follows the same policy and never fails, so a
/// formatted name behaves like a C `snprintf` into a fixed buffer.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct BoundedString<const N: usize> {
    value: String<N>,
    #[serde(skip)]
    truncated: bool,
}

impl<const N: usize> BoundedString<N> {
    pub const fn new() -> Self {
        Self {
            value: String::new(),
            truncated: false,
        }
    }

    pub fn truncating(s: &str) -> Self {
        let mut out = Self::new();
        out.append(s);
        out
    }

    /// Whether any input was dropped to stay within `N` bytes.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_str(&self) -> &str {
        self.value.as_str()
    }

    fn append(&mut self, s: &str) {
        let room = N - self.value.len();
        let mut end = s.len().min(room);
        while !s.is_char_boundary(end) {
            end -= 1;
        }

        if end < s.len() {
            self.truncated = true;
        }
        // Fits: `end` never exceeds the remaining room.
        let _ = self.value.push_str(&s[..end]);
    }
}

impl<const N: usize> fmt::Write for BoundedString<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s);
        Ok(())
    }
}

impl<const N: usize> Deref for BoundedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
