use std::collections::BTreeMap;

use log::warn;

/// Command line arguments as `--key value` pairs. Keys are lower-cased, values are kept as given.
/// Flag-only keys map to an empty value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: BTreeMap<String, String>,
}

impl OptionMap {
    /// Collect `--key value` tokens. Several tokens following one key are joined by a space, and
    /// `--key=value` works too. When a key repeats, the last one wins.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: BTreeMap<String, String> = BTreeMap::new();
        let mut current: Option<String> = None;

        for arg in args {
            let arg = arg.as_ref();
            if let Some(key) = arg.strip_prefix("--") {
                let (key, value) = match key.split_once('=') {
                    Some((key, value)) => (key, value),
                    None => (key, ""),
                };
                let key = key.to_lowercase();
                entries.insert(key.clone(), value.to_string());
                current = Some(key);
                continue;
            }

            match &current {
                Some(key) => {
                    let value = entries.entry(key.clone()).or_default();
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(arg);
                }
                None => warn!("Ignoring {arg}, arguments must follow a --key"),
            }
        }

        Self { entries }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The raw value, which might be blank
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|x| x.as_str())
    }

    /// The trimmed value, treating a blank value the same as a missing key
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(|x| x.trim()).filter(|x| !x.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
        }
    }
}
