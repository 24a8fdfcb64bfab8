//! Filter expression tree
//!
//! Query criteria are parsed into a tree of `(field, operator, value)`
//! conditions instead of being rewritten as raw JSON. The `$`-prefixed
//! operator form used by document databases is only a rendering of the
//! tree (see [`Filter::to_document`]).

use crate::error::QueryError;
use crate::store::Document;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Comparison operators accepted in `field[op]=value` criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    /// Look up an operator by its bare keyword
    ///
    /// Only whole keywords match: `gte` is an operator, `gtex` is not.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    /// Bare keyword form
    pub fn keyword(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
        }
    }

    /// Database operator form (`$gte`, `$in`, ...)
    pub fn operator_form(&self) -> String {
        format!("${}", self.keyword())
    }
}

/// A single `(field, operator, value)` criterion
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Check a document against this condition
    ///
    /// Query values arrive as strings; they are cast to the type of the
    /// stored value before comparing. Array fields match when any element
    /// matches.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(stored) = lookup(doc, &self.field) else {
            return false;
        };

        match stored {
            Value::Array(items) => {
                if self.op == FilterOp::Eq && self.value.is_array() {
                    return stored == &self.value;
                }
                items.iter().any(|item| self.matches_value(item))
            }
            _ => self.matches_value(stored),
        }
    }

    fn matches_value(&self, stored: &Value) -> bool {
        match self.op {
            FilterOp::Eq => values_equal(stored, &self.value),
            FilterOp::In => match &self.value {
                Value::Array(candidates) => candidates.iter().any(|c| values_equal(stored, c)),
                other => values_equal(stored, other),
            },
            FilterOp::Gt => compare_values(stored, &self.value) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                compare_values(stored, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => compare_values(stored, &self.value) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                compare_values(stored, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Filter expression tree; an empty `And` matches everything
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Condition(Condition),
    And(Vec<Filter>),
}

impl Default for Filter {
    fn default() -> Self {
        Filter::all()
    }
}

impl Filter {
    /// Filter matching every document
    pub fn all() -> Self {
        Filter::And(Vec::new())
    }

    /// Equality filter
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Condition(Condition::new(field, FilterOp::Eq, value.into()))
    }

    /// Membership filter
    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::Condition(Condition::new(field, FilterOp::In, Value::Array(values)))
    }

    /// Combine two filters with AND, flattening nested conjunctions
    pub fn and(self, other: Filter) -> Self {
        let mut parts = self.into_conjuncts();
        parts.extend(other.into_conjuncts());
        match parts.len() {
            1 => parts.remove(0),
            _ => Filter::And(parts),
        }
    }

    fn into_conjuncts(self) -> Vec<Filter> {
        match self {
            Filter::And(parts) => parts.into_iter().flat_map(Filter::into_conjuncts).collect(),
            condition => vec![condition],
        }
    }

    /// Whether this filter matches every document
    pub fn is_empty(&self) -> bool {
        match self {
            Filter::Condition(_) => false,
            Filter::And(parts) => parts.iter().all(Filter::is_empty),
        }
    }

    /// Check whether a document satisfies the filter
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Condition(condition) => condition.matches(doc),
            Filter::And(parts) => parts.iter().all(|part| part.matches(doc)),
        }
    }

    /// All conditions in the tree, in order
    pub fn conditions(&self) -> Vec<&Condition> {
        match self {
            Filter::Condition(condition) => vec![condition],
            Filter::And(parts) => parts.iter().flat_map(Filter::conditions).collect(),
        }
    }

    /// Render the filter in document-database operator syntax
    ///
    /// `price[gte]=10&price[lte]=20` renders as
    /// `{"price": {"$gte": 10, "$lte": 20}}`.
    pub fn to_document(&self) -> Value {
        let mut rendered = Map::new();
        for condition in self.conditions() {
            let value = render_value(&condition.value);
            let slot = rendered
                .entry(condition.field.clone())
                .or_insert(Value::Null);

            let op = condition.op;
            if slot.is_null() {
                *slot = match op {
                    FilterOp::Eq => value,
                    _ => operator_object([(op, value)]),
                };
            } else if let Some(ops) = slot.as_object_mut().filter(|m| is_operator_object(m)) {
                ops.insert(op.operator_form(), value);
            } else {
                let existing = slot.take();
                *slot = operator_object([(FilterOp::Eq, existing), (op, value)]);
            }
        }
        Value::Object(rendered)
    }
}

fn operator_object<const N: usize>(entries: [(FilterOp, Value); N]) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(op, value)| (op.operator_form(), value))
            .collect(),
    )
}

fn is_operator_object(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

fn render_value(value: &Value) -> Value {
    match value {
        Value::String(raw) => coerce_scalar(raw),
        Value::Array(items) => Value::Array(items.iter().map(render_value).collect()),
        other => other.clone(),
    }
}

/// Interpret a raw query string value as the most specific JSON scalar
pub fn coerce_scalar(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Build a filter from the non-reserved `key=value` criteria of a query
///
/// Keys are either `field` (equality) or `field[op]`. Repeated keys keep
/// the last value, except `in` which accumulates (and splits on commas).
pub(crate) fn build_filter<'a>(
    criteria: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<Filter, QueryError> {
    let mut conditions: Vec<Condition> = Vec::new();

    for (key, raw) in criteria {
        let (field, op) = parse_key(key)?;

        let existing = conditions
            .iter_mut()
            .find(|c| c.field == field && c.op == op);

        match (op, existing) {
            (FilterOp::In, Some(condition)) => {
                if let Value::Array(values) = &mut condition.value {
                    values.extend(split_list(raw));
                }
            }
            (FilterOp::In, None) => {
                conditions.push(Condition::new(field, op, Value::Array(split_list(raw))));
            }
            (_, Some(condition)) => condition.value = Value::String(raw.to_string()),
            (_, None) => conditions.push(Condition::new(field, op, Value::String(raw.to_string()))),
        }
    }

    Ok(match conditions.len() {
        1 => Filter::Condition(conditions.remove(0)),
        _ => Filter::And(conditions.into_iter().map(Filter::Condition).collect()),
    })
}

fn split_list(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Value::String(s.to_string()))
        .collect()
}

/// Split `field[op]` into its field and operator
fn parse_key(key: &str) -> Result<(String, FilterOp), QueryError> {
    let (field, op) = match key.find('[') {
        None => (key, FilterOp::Eq),
        Some(open) => {
            let rest = &key[open + 1..];
            let keyword = rest
                .strip_suffix(']')
                .filter(|kw| !kw.contains('[') && !kw.contains(']'))
                .ok_or_else(|| QueryError::MalformedKey(key.to_string()))?;
            let field = &key[..open];
            let op = FilterOp::from_keyword(keyword).ok_or_else(|| {
                QueryError::UnknownOperator {
                    field: field.to_string(),
                    operator: keyword.to_string(),
                }
            })?;
            (field, op)
        }
    };

    validate_field(field)?;
    Ok((field.to_string(), op))
}

fn validate_field(field: &str) -> Result<(), QueryError> {
    let valid = !field.is_empty()
        && !field.starts_with('.')
        && !field.ends_with('.')
        && !field.contains("..")
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if valid {
        Ok(())
    } else {
        Err(QueryError::InvalidField(field.to_string()))
    }
}

/// Resolve a dotted path (`publisher.name`) inside a document
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Cast a query operand to the JSON type of a stored value
fn cast_like(stored: &Value, operand: &Value) -> Option<Value> {
    match (stored, operand) {
        (Value::Number(_), Value::String(raw)) => {
            raw.trim().parse::<f64>().ok().map(Value::from)
        }
        (Value::Bool(_), Value::String(raw)) => match raw.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (Value::String(_), Value::Number(n)) => Some(Value::String(n.to_string())),
        (Value::String(_), Value::Bool(b)) => Some(Value::String(b.to_string())),
        _ => Some(operand.clone()),
    }
}

fn values_equal(stored: &Value, operand: &Value) -> bool {
    match cast_like(stored, operand) {
        Some(cast) => compare_values(stored, &cast) == Some(Ordering::Equal) || stored == &cast,
        None => false,
    }
}

/// Order two values of the same kind; `None` when they are not comparable
///
/// Strings that both parse as RFC 3339 timestamps compare chronologically.
pub fn compare_values(stored: &Value, operand: &Value) -> Option<Ordering> {
    let operand = cast_like(stored, operand)?;
    match (stored, &operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(compare_strings(a, b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn compare_strings(a: &str, b: &str) -> Ordering {
    match (
        chrono::DateTime::parse_from_rfc3339(a),
        chrono::DateTime::parse_from_rfc3339(b),
    ) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_operator_keywords_are_whole_words() {
        assert_eq!(FilterOp::from_keyword("gte"), Some(FilterOp::Gte));
        assert_eq!(FilterOp::from_keyword("in"), Some(FilterOp::In));
        assert_eq!(FilterOp::from_keyword("gtex"), None);
        assert_eq!(FilterOp::from_keyword("xlt"), None);
        assert_eq!(FilterOp::from_keyword("GT"), None);
        assert_eq!(FilterOp::Lte.operator_form(), "$lte");
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("price").unwrap(), ("price".to_string(), FilterOp::Eq));
        assert_eq!(
            parse_key("price[gte]").unwrap(),
            ("price".to_string(), FilterOp::Gte)
        );
        assert!(matches!(
            parse_key("price[gtx]"),
            Err(QueryError::UnknownOperator { .. })
        ));
        assert!(matches!(parse_key("price[gte"), Err(QueryError::MalformedKey(_))));
        assert!(matches!(
            parse_key("price[gte][lt]"),
            Err(QueryError::MalformedKey(_))
        ));
        assert!(matches!(parse_key("[gt]"), Err(QueryError::InvalidField(_))));
        assert!(matches!(parse_key("$where"), Err(QueryError::InvalidField(_))));
    }

    #[test]
    fn test_keyword_in_value_is_not_an_operator() {
        let filter = build_filter([("writer", "gt")]).unwrap();
        assert_eq!(filter, Filter::eq("writer", "gt"));
        assert!(filter.matches(&doc(json!({"writer": "gt"}))));
    }

    #[test]
    fn test_range_filter_casts_to_stored_type() {
        let filter = build_filter([("price[gte]", "100"), ("price[lte]", "200")]).unwrap();

        assert!(filter.matches(&doc(json!({"price": 100}))));
        assert!(filter.matches(&doc(json!({"price": 150.5}))));
        assert!(filter.matches(&doc(json!({"price": 200}))));
        assert!(!filter.matches(&doc(json!({"price": 99.99}))));
        assert!(!filter.matches(&doc(json!({"price": 201}))));
        assert!(!filter.matches(&doc(json!({"title": "no price"}))));
    }

    #[test]
    fn test_equality_against_numbers_and_strings() {
        let rating = build_filter([("rating", "7")]).unwrap();
        assert!(rating.matches(&doc(json!({"rating": 7}))));
        assert!(!rating.matches(&doc(json!({"rating": 8}))));

        let phone = build_filter([("phone", "555")]).unwrap();
        assert!(phone.matches(&doc(json!({"phone": "555"}))));
    }

    #[test]
    fn test_in_filter_accumulates_and_matches_arrays() {
        let filter =
            build_filter([("genres[in]", "DRAMA,MYTH"), ("genres[in]", "HISTORY")]).unwrap();
        let Filter::Condition(condition) = &filter else {
            panic!("expected a single condition");
        };
        assert_eq!(condition.value, json!(["DRAMA", "MYTH", "HISTORY"]));

        assert!(filter.matches(&doc(json!({"genres": ["NOVEL", "HISTORY"]}))));
        assert!(!filter.matches(&doc(json!({"genres": ["NOVEL"]}))));
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let filter = build_filter([("writer", "A"), ("writer", "B")]).unwrap();
        assert_eq!(filter, Filter::eq("writer", "B"));
    }

    #[test]
    fn test_dotted_lookup() {
        let d = doc(json!({"publisher": {"name": "Acme"}}));
        assert_eq!(lookup(&d, "publisher.name"), Some(&json!("Acme")));
        assert_eq!(lookup(&d, "publisher.missing"), None);
    }

    #[test]
    fn test_timestamps_compare_chronologically() {
        let a = json!("2024-01-01T00:00:00Z");
        let b = json!("2024-01-01T00:00:00.500Z");
        assert_eq!(compare_values(&a, &b), Some(Ordering::Less));
    }

    #[test]
    fn test_and_flattens() {
        let filter = Filter::all()
            .and(Filter::eq("a", 1))
            .and(Filter::all().and(Filter::eq("b", 2)));
        assert_eq!(filter.conditions().len(), 2);
        assert!(Filter::all().and(Filter::all()).is_empty());
    }

    #[test]
    fn test_rendered_operator_document() {
        let filter = build_filter([
            ("price[gte]", "100"),
            ("price[lte]", "200"),
            ("writer", "Jane"),
            ("genres[in]", "DRAMA,MYTH"),
        ])
        .unwrap();

        insta::assert_json_snapshot!(filter.to_document(), @r###"
        {
          "genres": {
            "$in": [
              "DRAMA",
              "MYTH"
            ]
          },
          "price": {
            "$gte": 100,
            "$lte": 200
          },
          "writer": "Jane"
        }
        "###);
    }
}
