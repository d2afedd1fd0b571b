//! HTTP headers handling
//!
//! This module provides the header map used by both requests and responses.

use std::fmt;

/// HTTP headers collection
///
/// Headers are stored in insertion order and:
/// - Names are compared exactly as received (case-sensitive)
/// - Inserting an existing name replaces its value in place
/// - Iteration yields headers in first-insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Create a new empty headers collection
    pub fn new() -> Self {
        Headers {
            headers: Vec::new(),
        }
    }

    /// Insert a header
    ///
    /// If a header with the same name already exists its value is replaced,
    /// so the last write wins. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        match self.headers.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.headers.push((name, value));
                None
            }
        }
    }

    /// Get the value for a header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header exists
    pub fn contains(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n == name)
    }

    /// Remove a header, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.headers.iter().position(|(n, _)| n == name)?;
        Some(self.headers.remove(pos).1)
    }

    /// Get the number of headers
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Check if there are no headers
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Clear all headers
    pub fn clear(&mut self) {
        self.headers.clear();
    }

    /// Iterate over all headers
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parse a header line into name and value
    ///
    /// The line is split on its first colon and both halves are trimmed.
    /// Returns `None` for a line without a colon, which ends the header block.
    pub fn parse_header_line(line: &str) -> Option<(String, String)> {
        let colon_pos = line.find(':')?;
        let name = line[..colon_pos].trim().to_string();
        let value = line[colon_pos + 1..].trim().to_string();
        Some((name, value))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.headers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str("}")
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut headers = Headers::new();
        headers.insert("Host", "localhost");
        headers.insert("Accept", "*/*");

        assert_eq!(headers.get("Host"), Some("localhost"));
        assert_eq!(headers.get("Accept"), Some("*/*"));
        assert_eq!(headers.get("Missing"), None);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut headers = Headers::new();
        headers.insert("X-Token", "a");
        headers.insert("x-token", "b");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-Token"), Some("a"));
        assert_eq!(headers.get("x-token"), Some("b"));
        assert_eq!(headers.get("X-TOKEN"), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut headers = Headers::new();
        assert_eq!(headers.insert("X-Custom", "first"), None);
        headers.insert("X-Other", "other");
        assert_eq!(headers.insert("X-Custom", "second"), Some("first".to_string()));

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-Custom"), Some("second"));

        // Replacing keeps the original position
        let collected: Vec<_> = headers.iter().collect();
        assert_eq!(collected, vec![("X-Custom", "second"), ("X-Other", "other")]);
    }

    #[test]
    fn test_remove() {
        let mut headers = Headers::new();
        headers.insert("X-Remove", "value1");
        headers.insert("X-Keep", "value2");

        assert_eq!(headers.remove("X-Remove"), Some("value1".to_string()));
        assert_eq!(headers.remove("X-Remove"), None);
        assert!(!headers.contains("X-Remove"));
        assert!(headers.contains("X-Keep"));
    }

    #[test]
    fn test_iter_insertion_order() {
        let mut headers = Headers::new();
        headers.insert("C", "3");
        headers.insert("A", "1");
        headers.insert("B", "2");

        let collected: Vec<_> = headers.iter().collect();
        assert_eq!(collected, vec![("C", "3"), ("A", "1"), ("B", "2")]);
    }

    #[test]
    fn test_parse_header_line() {
        let (name, value) = Headers::parse_header_line("Content-Type: text/html").unwrap();
        assert_eq!(name, "Content-Type");
        assert_eq!(value, "text/html");

        let (name, value) = Headers::parse_header_line("  X-Custom :  value  ").unwrap();
        assert_eq!(name, "X-Custom");
        assert_eq!(value, "value");

        // Only the first colon splits
        let (name, value) = Headers::parse_header_line("Host: example.com:8080").unwrap();
        assert_eq!(name, "Host");
        assert_eq!(value, "example.com:8080");

        assert!(Headers::parse_header_line("Invalid").is_none());
    }

    #[test]
    fn test_display() {
        let headers: Headers = vec![
            ("Host".to_string(), "localhost".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(headers.to_string(), "{Host=localhost, Accept=*/*}");
    }
}
