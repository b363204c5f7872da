//! Submitted form data.
//!
//! [`FormData`] wraps [`MultiValueDict`](tally_rs_core::utils::MultiValueDict)
//! to provide an immutable-by-default dictionary for POST parameters. Keys may
//! carry multiple values (multi-selects and formset rows submit repeated keys).

use tally_rs_core::utils::MultiValueDict;
use tally_rs_core::{TallyError, TallyResult};

/// An immutable-by-default dictionary of submitted form data.
///
/// Immutability guards against handlers accidentally rewriting a request
/// body mid-validation. The [`copy`](FormData::copy) method returns a
/// mutable clone.
///
/// # Examples
///
/// ```
/// use tally_rs_forms::data::FormData;
///
/// let data = FormData::parse("members=3&members=7&display_name=Acme");
/// assert_eq!(data.get("members"), Some("7"));
/// assert_eq!(
///     data.get_list("members"),
///     Some(&vec!["3".to_string(), "7".to_string()])
/// );
///
/// let mut mutable = data.copy();
/// mutable.set("display_name", "Acme Ltd").unwrap();
/// assert_eq!(mutable.get("display_name"), Some("Acme Ltd"));
/// ```
#[derive(Debug, Clone)]
pub struct FormData {
    data: MultiValueDict<String, String>,
    mutable: bool,
    encoding: String,
}

impl Default for FormData {
    fn default() -> Self {
        Self::new()
    }
}

impl FormData {
    /// Creates a new, empty, immutable `FormData`.
    pub fn new() -> Self {
        Self {
            data: MultiValueDict::new(),
            mutable: false,
            encoding: "utf-8".to_string(),
        }
    }

    /// Creates a new, empty, mutable `FormData`.
    pub fn new_mutable() -> Self {
        Self {
            data: MultiValueDict::new(),
            mutable: true,
            encoding: "utf-8".to_string(),
        }
    }

    /// Parses a URL-encoded body (e.g., `"number=INV-001&draft=on"`) into an
    /// immutable `FormData`.
    ///
    /// Handles percent-encoding and supports multiple values per key.
    pub fn parse(body: &str) -> Self {
        let mut data = MultiValueDict::new();

        if !body.is_empty() {
            for pair in body.split('&') {
                if pair.is_empty() {
                    continue;
                }

                let (key, value) = pair
                    .find('=')
                    .map_or((pair, ""), |eq_pos| (&pair[..eq_pos], &pair[eq_pos + 1..]));

                let decoded_key = percent_decode(key);
                let decoded_value = percent_decode(value);
                data.append(decoded_key, decoded_value);
            }
        }

        Self {
            data,
            mutable: false,
            encoding: "utf-8".to_string(),
        }
    }

    /// Returns the last value for the given key, or `None` if not present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(&key.to_string()).map(String::as_str)
    }

    /// Returns all values for the given key, or `None` if not present.
    pub fn get_list(&self, key: &str) -> Option<&Vec<String>> {
        self.data.get_list(&key.to_string())
    }

    /// Sets a single value for the given key, replacing any existing values.
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::SuspiciousOperation`] if this `FormData` is immutable.
    pub fn set(&mut self, key: &str, value: &str) -> TallyResult<()> {
        if !self.mutable {
            return Err(TallyError::SuspiciousOperation(
                "This FormData instance is immutable".to_string(),
            ));
        }
        self.data.set(key.to_string(), value.to_string());
        Ok(())
    }

    /// Appends a value to the list for the given key.
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::SuspiciousOperation`] if this `FormData` is immutable.
    pub fn append(&mut self, key: &str, value: &str) -> TallyResult<()> {
        if !self.mutable {
            return Err(TallyError::SuspiciousOperation(
                "This FormData instance is immutable".to_string(),
            ));
        }
        self.data.append(key.to_string(), value.to_string());
        Ok(())
    }

    /// Returns a mutable copy of this `FormData`.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            data: self.data.clone(),
            mutable: true,
            encoding: self.encoding.clone(),
        }
    }

    /// Encodes this `FormData` as a URL-encoded string.
    ///
    /// All keys and values are percent-encoded; pairs are sorted for
    /// deterministic output.
    pub fn urlencode(&self) -> String {
        let mut parts = Vec::new();

        for (key, values) in &self.data {
            for value in values {
                let encoded_key = percent_encode(key);
                let encoded_value = percent_encode(value);
                parts.push(format!("{encoded_key}={encoded_value}"));
            }
        }

        parts.sort();
        parts.join("&")
    }

    /// Returns `true` if this `FormData` is mutable.
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Returns the encoding used for this `FormData`.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the `FormData` contains no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the specified key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(&key.to_string())
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Returns a reference to the underlying `MultiValueDict`.
    pub const fn data(&self) -> &MultiValueDict<String, String> {
        &self.data
    }
}

/// Decodes a percent-encoded string.
fn percent_decode(input: &str) -> String {
    // + means space in form encoding
    let plus_decoded = input.replace('+', " ");
    percent_encoding::percent_decode_str(&plus_decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Percent-encodes a string for use in a URL-encoded body.
fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, percent_encoding::NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let data = FormData::new();
        assert!(data.is_empty());
        assert_eq!(data.len(), 0);
    }

    #[test]
    fn test_parse_simple() {
        let data = FormData::parse("number=INV-001");
        assert_eq!(data.get("number"), Some("INV-001"));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_parse_multiple_keys() {
        let data = FormData::parse("number=INV-001&client=3&draft=on");
        assert_eq!(data.get("number"), Some("INV-001"));
        assert_eq!(data.get("client"), Some("3"));
        assert_eq!(data.get("draft"), Some("on"));
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_parse_repeated_keys() {
        let data = FormData::parse("members=1&members=2&members=5");
        // get() returns the last value
        assert_eq!(data.get("members"), Some("5"));
        assert_eq!(
            data.get_list("members"),
            Some(&vec!["1".to_string(), "2".to_string(), "5".to_string()])
        );
    }

    #[test]
    fn test_parse_empty_string() {
        let data = FormData::parse("");
        assert!(data.is_empty());
    }

    #[test]
    fn test_parse_no_value() {
        let data = FormData::parse("draft");
        assert_eq!(data.get("draft"), Some(""));
    }

    #[test]
    fn test_parse_percent_encoded() {
        let data = FormData::parse("label=Consulting%20services&detail=wire%20ref%3A%2042");
        assert_eq!(data.get("label"), Some("Consulting services"));
        assert_eq!(data.get("detail"), Some("wire ref: 42"));
    }

    #[test]
    fn test_parse_plus_as_space() {
        let data = FormData::parse("legal_name=Acme+Holdings");
        assert_eq!(data.get("legal_name"), Some("Acme Holdings"));
    }

    #[test]
    fn test_immutable_set_fails() {
        let mut data = FormData::parse("number=INV-001");
        assert!(!data.is_mutable());
        assert!(data.set("number", "INV-002").is_err());
    }

    #[test]
    fn test_immutable_append_fails() {
        let mut data = FormData::parse("members=1");
        assert!(data.append("members", "2").is_err());
    }

    #[test]
    fn test_copy_returns_mutable() {
        let data = FormData::parse("number=INV-001");
        let mut mutable = data.copy();
        assert!(mutable.is_mutable());
        assert!(mutable.set("number", "INV-002").is_ok());
        assert_eq!(mutable.get("number"), Some("INV-002"));
        // Original is unchanged
        assert_eq!(data.get("number"), Some("INV-001"));
    }

    #[test]
    fn test_mutable_append() {
        let mut data = FormData::new_mutable();
        data.append("members", "1").unwrap();
        data.append("members", "2").unwrap();
        assert_eq!(data.get("members"), Some("2"));
        assert_eq!(
            data.get_list("members"),
            Some(&vec!["1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn test_mutable_set_replaces() {
        let mut data = FormData::new_mutable();
        data.append("members", "1").unwrap();
        data.append("members", "2").unwrap();
        data.set("members", "9").unwrap();
        assert_eq!(data.get_list("members"), Some(&vec!["9".to_string()]));
    }

    #[test]
    fn test_urlencode_special_chars() {
        let mut data = FormData::new_mutable();
        data.set("label", "janitorial service").unwrap();
        let encoded = data.urlencode();
        assert!(encoded.contains("janitorial%20service"));
    }

    #[test]
    fn test_urlencode_repeated_keys() {
        let data = FormData::parse("members=1&members=2");
        let encoded = data.urlencode();
        assert!(encoded.contains("members=1"));
        assert!(encoded.contains("members=2"));
    }

    #[test]
    fn test_contains_key() {
        let data = FormData::parse("rate=0.2");
        assert!(data.contains_key("rate"));
        assert!(!data.contains_key("missing"));
    }

    #[test]
    fn test_get_missing_key() {
        let data = FormData::new();
        assert_eq!(data.get("missing"), None);
        assert_eq!(data.get_list("missing"), None);
    }

    #[test]
    fn test_parse_skips_empty_pairs() {
        let data = FormData::parse("a=1&&b=2&");
        assert_eq!(data.get("a"), Some("1"));
        assert_eq!(data.get("b"), Some("2"));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_formset_style_keys() {
        let data = FormData::parse("lines-0-label=Audit&lines-1-label=Payroll");
        assert_eq!(data.get("lines-0-label"), Some("Audit"));
        assert_eq!(data.get("lines-1-label"), Some("Payroll"));
    }
}
