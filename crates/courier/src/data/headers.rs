/// Ordered header multimap.
///
/// Lookups are case-insensitive. Repeated keys are kept and emitted in
/// insertion order, so a header added twice goes on the wire twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, keeping any existing values for the same key.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Replace every value for `key` with a single `value`.
    ///
    /// The new entry takes the position of the first existing one, or is
    /// appended if the key was absent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(first) => {
                let mut index = 0;
                self.0.retain(|(k, _)| {
                    let keep = index <= first || !k.eq_ignore_ascii_case(&key);
                    index += 1;
                    keep
                });
                self.0[first] = (key, value);
            }
            None => self.0.push((key, value)),
        }
    }

    /// First value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Remove every value for `key`, returning how many were dropped.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        before - self.0.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(key))
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> Extend<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for Headers {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keys_keep_insertion_order() {
        let mut headers = Headers::new();
        headers.add("Accept", "text/plain");
        headers.add("X-Trace", "1");
        headers.add("accept", "application/json");

        let accepts: Vec<_> = headers.get_all("ACCEPT").collect();
        assert_eq!(accepts, vec!["text/plain", "application/json"]);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn set_replaces_all_values_in_place() {
        let mut headers = Headers::new();
        headers.add("Authorization", "Basic a");
        headers.add("Accept", "*/*");
        headers.add("authorization", "Basic b");
        headers.set("Authorization", "Bearer c");

        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(
            pairs,
            vec![("Authorization", "Bearer c"), ("Accept", "*/*")]
        );
    }

    #[test]
    fn remove_is_case_insensitive() {
        let mut headers: Headers = [("If-Match", "abc"), ("if-match", "def")]
            .into_iter()
            .collect();
        assert_eq!(headers.remove("IF-MATCH"), 2);
        assert!(headers.is_empty());
        assert!(!headers.contains("If-Match"));
    }
}
