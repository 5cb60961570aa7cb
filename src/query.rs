use std::collections::BTreeMap;

use crate::record::Record;

/// Client-side `key:value,key:value` narrowing applied after the provider's exact-match fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    filters: BTreeMap<String, String>,
}

impl FilterQuery {
    /// Parts without a colon are dropped. Keys are lower-cased, later duplicates win.
    pub fn parse(query: &str) -> Self {
        let mut filters = BTreeMap::new();
        if query.is_empty() {
            return FilterQuery { filters };
        }

        for part in query.split(',') {
            if let Some((key, value)) = part.split_once(':') {
                filters.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }
        FilterQuery { filters }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.filters
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.filters.insert(key.to_lowercase(), value.to_string());
    }

    pub fn to_query_string(&self) -> String {
        self.filters
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|(key, value)| match key.as_str() {
            "type" => record.record_type.as_str().eq_ignore_ascii_case(value),
            "name" => contains_ignore_case(&record.name, value),
            "content" => contains_ignore_case(&record.content, value),
            _ => true,
        })
    }

    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
