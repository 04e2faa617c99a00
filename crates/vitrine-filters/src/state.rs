//! Filter state and its query-string encoding.
//!
//! The state lives in a single query parameter:
//! `field1:value1|field1:value2|field2:value3`. Segments are split on `|`,
//! then on the first `:`, so values may contain `:` but neither fields nor
//! values may contain `|`.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{FilterError, FilterResult};

/// Default name of the query parameter holding the filters.
pub const DEFAULT_FILTER_PARAM: &str = "filters";

const PAIR_SEPARATOR: char = '|';
const FIELD_SEPARATOR: char = ':';

/// One or more filter values.
///
/// Filters are always lists; the conversions let callers pass a single
/// value or a list interchangeably.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterValues(Vec<String>);

impl FilterValues {
    /// The values.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consume into the underlying list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for FilterValues {
    fn from(value: &str) -> Self {
        Self(vec![value.to_owned()])
    }
}

impl From<String> for FilterValues {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for FilterValues {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<Vec<&str>> for FilterValues {
    fn from(values: Vec<&str>) -> Self {
        Self(values.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl From<&[&str]> for FilterValues {
    fn from(values: &[&str]) -> Self {
        Self(values.iter().map(|v| (*v).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterValues {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| (*v).to_owned()).collect())
    }
}

/// Ordered mapping of filter field to its list of values.
///
/// Fields keep their first-appearance order; values keep their order
/// within a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    fields: Vec<(String, Vec<String>)>,
}

impl FilterState {
    /// An empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the state from a query string (with or without the leading
    /// `?`) using the default `filters` parameter.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        Self::parse_param(query, DEFAULT_FILTER_PARAM)
    }

    /// Read the state from the `param` parameter of a query string. An
    /// absent parameter gives an empty state.
    #[must_use]
    pub fn parse_param(query: &str, param: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes())
            .find(|(name, _)| name == param)
            .map(|(_, encoded)| Self::decode(&encoded))
            .unwrap_or_default()
    }

    /// Decode a raw parameter value. Empty segments and segments without a
    /// `:` are skipped.
    #[must_use]
    pub fn decode(encoded: &str) -> Self {
        let mut state = Self::new();
        for segment in encoded.split(PAIR_SEPARATOR) {
            let Some((field, value)) = segment.split_once(FIELD_SEPARATOR) else {
                continue;
            };
            if field.is_empty() {
                continue;
            }
            state.values_mut(field).push(value.to_owned());
        }
        state
    }

    /// Encode as `field:value|...`, in field order.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (field, values) in &self.fields {
            for value in values {
                if !out.is_empty() {
                    out.push(PAIR_SEPARATOR);
                }
                out.push_str(field);
                out.push(FIELD_SEPARATOR);
                out.push_str(value);
            }
        }
        out
    }

    /// Values of `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, values)| values.as_slice())
    }

    /// Iterate over `(field, values)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, values)| (field.as_str(), values.as_slice()))
    }

    /// Field names in order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.fields.iter().map(|(field, _)| field.as_str()).collect()
    }

    /// Whether `field` has values.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replace the values of `field`. An empty list removes the field.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyField`] or
    /// [`FilterError::ReservedSeparator`] if the field or a value cannot be
    /// encoded unambiguously. The state is unchanged on error.
    pub fn set(&mut self, field: &str, values: impl Into<FilterValues>) -> FilterResult<()> {
        let values = values.into().into_vec();
        check_field(field)?;
        for value in &values {
            check_value(value)?;
        }

        if values.is_empty() {
            self.remove(field);
        } else if let Some(slot) = self.fields.iter_mut().find(|(name, _)| name == field) {
            slot.1 = values;
        } else {
            self.fields.push((field.to_owned(), values));
        }
        Ok(())
    }

    /// Remove `field`, or with `Some(values)` only the exactly matching
    /// values; the field disappears once it has no values left.
    pub fn unset(&mut self, field: &str, values: Option<FilterValues>) {
        match values {
            None => self.remove(field),
            Some(values) => {
                let drop = values.into_vec();
                let now_empty = match self.fields.iter_mut().find(|(name, _)| name == field) {
                    Some((_, current)) => {
                        current.retain(|v| !drop.contains(v));
                        current.is_empty()
                    },
                    None => false,
                };
                if now_empty {
                    self.remove(field);
                }
            },
        }
    }

    fn remove(&mut self, field: &str) {
        self.fields.retain(|(name, _)| name != field);
    }

    fn values_mut(&mut self, field: &str) -> &mut Vec<String> {
        let pos = match self.fields.iter().position(|(name, _)| name == field) {
            Some(pos) => pos,
            None => {
                self.fields.push((field.to_owned(), Vec::new()));
                self.fields.len().saturating_sub(1)
            },
        };
        &mut self.fields[pos].1
    }
}

fn check_field(field: &str) -> FilterResult<()> {
    if field.is_empty() {
        return Err(FilterError::EmptyField);
    }
    for separator in [PAIR_SEPARATOR, FIELD_SEPARATOR] {
        if field.contains(separator) {
            return Err(FilterError::ReservedSeparator {
                what: "field",
                text: field.to_owned(),
                separator,
            });
        }
    }
    Ok(())
}

fn check_value(value: &str) -> FilterResult<()> {
    if value.contains(PAIR_SEPARATOR) {
        return Err(FilterError::ReservedSeparator {
            what: "value",
            text: value.to_owned(),
            separator: PAIR_SEPARATOR,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_groups_values_in_order() {
        let state = FilterState::parse("?q=water&filters=country:Brazil|tags:rivers|country:Chile");
        assert_eq!(state.fields(), vec!["country", "tags"]);
        assert_eq!(state.get("country").unwrap(), ["Brazil", "Chile"]);
        assert_eq!(state.get("tags").unwrap(), ["rivers"]);
        assert!(state.get("license").is_none());
    }

    #[test]
    fn test_parse_absent_param_is_empty() {
        assert!(FilterState::parse("q=water&page=2").is_empty());
        assert!(FilterState::parse("").is_empty());
    }

    #[test]
    fn test_parse_percent_encoded_param() {
        let state = FilterState::parse("filters=country%3ABrazil%7Ctags%3Awater+quality");
        assert_eq!(state.get("country").unwrap(), ["Brazil"]);
        assert_eq!(state.get("tags").unwrap(), ["water quality"]);
    }

    #[test]
    fn test_value_may_contain_colon() {
        let state = FilterState::parse("filters=url:http://example.org/a|time:12:30");
        assert_eq!(state.get("url").unwrap(), ["http://example.org/a"]);
        assert_eq!(state.get("time").unwrap(), ["12:30"]);
    }

    #[test]
    fn test_malformed_segments_are_skipped() {
        let state = FilterState::decode("|country:Brazil||orphan|:nofield|tags:");
        assert_eq!(state.fields(), vec!["country", "tags"]);
        assert_eq!(state.get("tags").unwrap(), [""]);
    }

    #[test]
    fn test_custom_param_name() {
        let state = FilterState::parse_param("f=tags:x&filters=tags:y", "f");
        assert_eq!(state.get("tags").unwrap(), ["x"]);
    }

    #[test]
    fn test_encode_round_trip() {
        let mut state = FilterState::new();
        state.set("country", vec!["Brazil", "Chile"]).unwrap();
        state.set("time", "12:30").unwrap();
        let encoded = state.encode();
        assert_eq!(encoded, "country:Brazil|country:Chile|time:12:30");
        assert_eq!(FilterState::decode(&encoded), state);
    }

    fn arb_state() -> impl Strategy<Value = FilterState> {
        prop::collection::btree_map(
            "[^|:]{1,8}",
            prop::collection::vec("[^|]{0,12}", 1..4),
            0..5,
        )
        .prop_map(|fields| {
            let mut state = FilterState::new();
            for (field, values) in fields {
                state.set(&field, values).unwrap();
            }
            state
        })
    }

    proptest! {
        #[test]
        fn test_decode_inverts_encode(state in arb_state()) {
            prop_assert_eq!(FilterState::decode(&state.encode()), state);
        }

        #[test]
        fn test_parse_inverts_query_encoding(state in arb_state()) {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("q", "water")
                .append_pair(DEFAULT_FILTER_PARAM, &state.encode())
                .finish();
            prop_assert_eq!(FilterState::parse(&query), state);
        }
    }

    #[test]
    fn test_set_scalar_and_list_are_equivalent() {
        let mut scalar = FilterState::new();
        scalar.set("country", "Brazil").unwrap();
        let mut list = FilterState::new();
        list.set("country", ["Brazil"]).unwrap();
        assert_eq!(scalar, list);
        assert_eq!(scalar.get("country").unwrap(), ["Brazil"]);
    }

    #[test]
    fn test_set_replaces_in_place_and_empty_removes() {
        let mut state = FilterState::decode("a:1|b:2");
        state.set("a", "3").unwrap();
        assert_eq!(state.encode(), "a:3|b:2");
        state.set("a", Vec::<String>::new()).unwrap();
        assert_eq!(state.fields(), vec!["b"]);
    }

    #[test]
    fn test_unset_values_and_field() {
        let mut state = FilterState::new();
        state.set("country", ["Brazil", "Argentina", "Uruguay"]).unwrap();
        state.unset("country", Some(["Brazil", "Uruguay"].into()));
        assert_eq!(state.get("country").unwrap(), ["Argentina"]);

        state.unset("country", Some("Argentina".into()));
        assert!(!state.contains("country"));

        state.set("tags", "x").unwrap();
        state.unset("tags", None);
        state.unset("missing", Some("x".into()));
        assert!(state.is_empty());
    }

    #[test]
    fn test_reserved_separators_rejected() {
        let mut state = FilterState::new();
        assert!(matches!(
            state.set("tags", "a|b"),
            Err(FilterError::ReservedSeparator { what: "value", separator: '|', .. })
        ));
        assert!(matches!(
            state.set("res:format", "csv"),
            Err(FilterError::ReservedSeparator { what: "field", separator: ':', .. })
        ));
        assert_eq!(state.set("", "x"), Err(FilterError::EmptyField));
        assert!(state.is_empty());
    }
}
