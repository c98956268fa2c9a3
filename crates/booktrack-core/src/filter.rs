//! Smart-collection filter evaluation.
//!
//! A [`FilterPredicate`] is a single `{field, operator, value, negate}`
//! comparison against one attribute of a record. A [`FilterSet`] combines
//! predicates with a [`MatchMode`] and optionally sorts and limits the
//! records it admits. Filter sets are persisted as JSON on smart collections
//! and evaluated fresh on every read.
//!
//! Records expose their attributes through the [`Filterable`] trait, which
//! keeps evaluation generic over every entity kind.
//!
//! # Leniency
//!
//! - A predicate naming a field the record does not have evaluates to `true`
//!   whatever its `negate` flag. Smart collections authored against one
//!   entity kind therefore stay usable against another.
//! - An unknown operator evaluates to `false` whatever its `negate` flag.
//! - Ordering operators against values that cannot be ordered (text, null,
//!   mismatched types) evaluate to `false` before negation.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

// =============================================================================
// FIELD VALUES
// =============================================================================

/// The native semantic type of one record attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    /// Token list such as `tags` or `genres`.
    List(Vec<String>),
}

impl FieldValue {
    /// True for `Null` and for an empty token list.
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Equality against a JSON value using this field's native type.
    ///
    /// A JSON `null` tests for null. Numbers compare numerically across
    /// integer and float. Dates accept `YYYY-MM-DD` or RFC 3339 strings.
    pub fn equals(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.is_null();
        }
        match (self, value) {
            (FieldValue::Null, _) => false,
            (FieldValue::Bool(b), Value::Bool(v)) => b == v,
            (FieldValue::Int(_) | FieldValue::Float(_), Value::Number(_)) => {
                self.compare(value) == Some(Ordering::Equal)
            }
            (FieldValue::Text(s), Value::String(v)) => s == v,
            (FieldValue::Date(_) | FieldValue::Timestamp(_), Value::String(_)) => {
                self.compare(value) == Some(Ordering::Equal)
            }
            (FieldValue::List(items), Value::Array(values)) => {
                items.len() == values.len()
                    && items
                        .iter()
                        .zip(values)
                        .all(|(item, v)| v.as_str() == Some(item.as_str()))
            }
            _ => false,
        }
    }

    /// Ordering against a JSON value.
    ///
    /// Only numeric and date-like fields are orderable. Anything else,
    /// including null on either side, yields `None`.
    pub fn compare(&self, value: &Value) -> Option<Ordering> {
        match self {
            FieldValue::Int(_) | FieldValue::Float(_) => {
                let lhs = self.as_f64()?;
                let rhs = value.as_f64()?;
                lhs.partial_cmp(&rhs)
            }
            FieldValue::Date(d) => {
                let rhs = parse_date(value.as_str()?)?;
                Some(d.cmp(&rhs))
            }
            FieldValue::Timestamp(ts) => {
                let rhs = parse_timestamp(value.as_str()?)?;
                Some(ts.cmp(&rhs))
            }
            _ => None,
        }
    }

    /// Case-insensitive containment.
    ///
    /// Text fields test for a substring. Token lists test for one whole
    /// token, so "fantasy" never matches a "fantastical" tag.
    pub fn contains(&self, value: &Value) -> bool {
        let Some(needle) = value.as_str() else {
            return false;
        };
        let needle = needle.to_lowercase();
        match self {
            FieldValue::Text(s) => s.to_lowercase().contains(&needle),
            FieldValue::List(items) => items.iter().any(|item| item.to_lowercase() == needle),
            _ => false,
        }
    }

    /// Total ordering used when a filter set sorts its results.
    ///
    /// Nulls sort first. Values of different kinds fall back to a fixed
    /// kind order so sorting never panics.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Less,
            (_, Null) => Ordering::Greater,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(_) | Float(_), Int(_) | Float(_)) => {
                let a = self.as_f64().unwrap_or_default();
                let b = other.as_f64().unwrap_or_default();
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            (Text(a), Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Date(a), Date(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (List(a), List(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::Float(_) => 2,
            FieldValue::Text(_) => 3,
            FieldValue::Date(_) => 4,
            FieldValue::Timestamp(_) => 5,
            FieldValue::List(_) => 6,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map(FieldValue::Int).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map(FieldValue::Float).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(FieldValue::Date).unwrap_or(FieldValue::Null)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_rfc3339(s).map(|ts| ts.date_naive()))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    parse_rfc3339(s).or_else(|| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    })
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Attribute lookup on a record.
///
/// Returns `None` when the record has no attribute with that name, which
/// makes any predicate on it a no-op.
pub trait Filterable {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

// =============================================================================
// PREDICATES
// =============================================================================

/// Comparison operator of a [`FilterPredicate`].
///
/// Serialized as its lower-case name. Unrecognized names are kept as
/// [`FilterOperator::Unknown`] so a stored filter set always loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    In,
    Between,
    IsNull,
    IsNotNull,
    Unknown(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::In => "in",
            FilterOperator::Between => "between",
            FilterOperator::IsNull => "is_null",
            FilterOperator::IsNotNull => "is_not_null",
            FilterOperator::Unknown(name) => name,
        }
    }
}

impl From<String> for FilterOperator {
    fn from(s: String) -> Self {
        match s.as_str() {
            "eq" => FilterOperator::Eq,
            "ne" => FilterOperator::Ne,
            "gt" => FilterOperator::Gt,
            "lt" => FilterOperator::Lt,
            "gte" => FilterOperator::Gte,
            "lte" => FilterOperator::Lte,
            "contains" => FilterOperator::Contains,
            "in" => FilterOperator::In,
            "between" => FilterOperator::Between,
            "is_null" => FilterOperator::IsNull,
            "is_not_null" => FilterOperator::IsNotNull,
            _ => FilterOperator::Unknown(s),
        }
    }
}

impl From<&str> for FilterOperator {
    fn from(s: &str) -> Self {
        FilterOperator::from(s.to_string())
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{field, operator, value, negate}` comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub negate: bool,
}

impl FilterPredicate {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<FilterOperator>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
            negate: false,
        }
    }

    /// Invert the final answer of this predicate.
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub fn status_is(status: &str) -> Self {
        Self::new("status", FilterOperator::Eq, status)
    }

    pub fn status_in(statuses: &[&str]) -> Self {
        Self::new("status", FilterOperator::In, statuses.to_vec())
    }

    pub fn rating_gte(rating: i64) -> Self {
        Self::new("rating", FilterOperator::Gte, rating)
    }

    pub fn author_is(author: &str) -> Self {
        Self::new("author", FilterOperator::Eq, author)
    }

    pub fn author_contains(text: &str) -> Self {
        Self::new("author", FilterOperator::Contains, text)
    }

    pub fn tag_has(tag: &str) -> Self {
        Self::new("tags", FilterOperator::Contains, tag)
    }

    pub fn series_is(series: &str) -> Self {
        Self::new("series", FilterOperator::Eq, series)
    }

    pub fn year_between(start: i64, end: i64) -> Self {
        Self::new("publication_year", FilterOperator::Between, vec![start, end])
    }

    pub fn added_after(date: NaiveDate) -> Self {
        Self::new("date_added", FilterOperator::Gt, date.to_string())
    }

    /// Books finished between January 1st and December 31st of `year`.
    pub fn finished_in_year(year: i32) -> Self {
        Self::new(
            "date_finished",
            FilterOperator::Between,
            vec![format!("{year:04}-01-01"), format!("{year:04}-12-31")],
        )
    }

    pub fn has_rating() -> Self {
        Self::new("rating", FilterOperator::Ne, Value::Null)
    }

    pub fn no_rating() -> Self {
        Self::new("rating", FilterOperator::Eq, Value::Null)
    }

    /// Evaluate against one record. See [`evaluate`].
    pub fn evaluate<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        evaluate(record, self)
    }
}

/// Decide whether `record` satisfies `predicate`.
///
/// Returns `true` when the record has no such field and `false` for an
/// unknown operator. Otherwise `negate` inverts the operator's answer.
pub fn evaluate<R: Filterable + ?Sized>(record: &R, predicate: &FilterPredicate) -> bool {
    let Some(field) = record.field(&predicate.field) else {
        trace!(
            subsystem = "filter",
            field = %predicate.field,
            "Unknown filter field, predicate ignored"
        );
        return true;
    };

    let value = &predicate.value;
    let matched = match &predicate.operator {
        FilterOperator::Eq => field.equals(value),
        FilterOperator::Ne => !field.equals(value),
        FilterOperator::Gt => field.compare(value) == Some(Ordering::Greater),
        FilterOperator::Lt => field.compare(value) == Some(Ordering::Less),
        FilterOperator::Gte => matches!(
            field.compare(value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Lte => matches!(
            field.compare(value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::Contains => field.contains(value),
        FilterOperator::In => match value {
            Value::Array(candidates) => candidates.iter().any(|c| field.equals(c)),
            _ => false,
        },
        FilterOperator::Between => match value.as_array().map(Vec::as_slice) {
            Some([low, high]) => {
                matches!(
                    field.compare(low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    field.compare(high),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            _ => false,
        },
        FilterOperator::IsNull => field.is_null(),
        FilterOperator::IsNotNull => !field.is_null(),
        FilterOperator::Unknown(name) => {
            trace!(
                subsystem = "filter",
                operator = %name,
                "Unknown filter operator, predicate fails"
            );
            return false;
        }
    };

    matched != predicate.negate
}

// =============================================================================
// FILTER SETS
// =============================================================================

/// How the predicates of a [`FilterSet`] combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every predicate must hold (AND).
    #[default]
    All,
    /// At least one predicate must hold (OR).
    Any,
}

/// Sort direction shared by filter sets and search requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn is_desc(&self) -> bool {
        matches!(self, SortOrder::Desc)
    }
}

/// Ordered predicates plus match mode, optional sort, and optional limit.
///
/// This is the criteria stored on a smart collection:
///
/// ```
/// use booktrack_core::{FilterPredicate, FilterSet, MatchMode};
///
/// let json = r#"{"filters":[{"field":"rating","operator":"gte","value":5}]}"#;
/// let set: FilterSet = serde_json::from_str(json).unwrap();
///
/// assert_eq!(set.match_mode, MatchMode::All);
/// assert_eq!(set.filters[0], FilterPredicate::rating_gte(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub filters: Vec<FilterPredicate>,
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl FilterSet {
    /// Empty `all` set, which admits every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty `any` set, which admits nothing until a predicate is added.
    pub fn any() -> Self {
        Self::new().with_match_mode(MatchMode::Any)
    }

    pub fn with(mut self, predicate: FilterPredicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Evaluate against one record. See [`evaluate_set`].
    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        evaluate_set(record, self)
    }

    /// The stored limit, where `0` means no limit.
    fn cap(&self) -> Option<usize> {
        self.limit.filter(|&n| n > 0)
    }

    /// Number of `records` the set selects, honoring its own limit.
    pub fn count<R: Filterable>(&self, records: &[R]) -> usize {
        let admitted = records.iter().filter(|r| self.matches(*r)).count();
        self.cap().map_or(admitted, |cap| admitted.min(cap))
    }

    /// Filter, sort, and page `records`.
    ///
    /// Records are filtered with [`evaluate_set`], sorted by `sort_by` when
    /// set, then `offset` are skipped and at most `min(limit, self.limit)`
    /// are kept.
    pub fn apply<R: Filterable>(&self, records: Vec<R>, limit: usize, offset: usize) -> Vec<R> {
        let scanned = records.len();
        let mut admitted: Vec<R> = records.into_iter().filter(|r| self.matches(r)).collect();

        if let Some(sort_by) = &self.sort_by {
            admitted.sort_by(|a, b| {
                let lhs = a.field(sort_by).unwrap_or(FieldValue::Null);
                let rhs = b.field(sort_by).unwrap_or(FieldValue::Null);
                let ordering = lhs.sort_cmp(&rhs);
                if self.sort_order.is_desc() {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let take = self.cap().map_or(limit, |cap| cap.min(limit));
        let page: Vec<R> = admitted.into_iter().skip(offset).take(take).collect();

        trace!(
            subsystem = "filter",
            filter_count = self.filters.len(),
            scanned,
            result_count = page.len(),
            "Filter set applied"
        );
        page
    }
}

/// Decide whether `record` satisfies every (`all`) or some (`any`) predicate.
///
/// An empty `all` set is `true`; an empty `any` set is `false`.
pub fn evaluate_set<R: Filterable + ?Sized>(record: &R, set: &FilterSet) -> bool {
    match set.match_mode {
        MatchMode::All => set.filters.iter().all(|p| evaluate(record, p)),
        MatchMode::Any => set.filters.iter().any(|p| evaluate(record, p)),
    }
}
