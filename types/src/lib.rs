use std::cmp::Ordering;
use std::fmt;

// ── Typed value ──────────────────────────────────────────────────────────

/// A field value after normalization, tagged with its kind.
///
/// The kind decides how two values compare:
///   - `Absent` is below every present value and never wins a row.
///   - `Integer`, `Decimal` and `Magnitude` compare numerically with each other.
///   - `Text` only equals identical text; it has no ordering against anything
///     present, so a text row is won by whoever is seen first.
#[derive(Debug, Clone)]
pub enum TypedValue {
    /// The field was not found in the document.
    Absent,
    Integer(i64),
    Decimal(f64),
    /// Free text, ranks, change indicators.
    Text(String),
    /// Currency-like amount such as "1.2 trillion": displayed as written,
    /// compared by the resolved `amount`.
    Magnitude { text: String, amount: f64 },
}

impl TypedValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Numeric view used for cross-kind comparison.
    fn amount(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Decimal(x) => Some(*x),
            Self::Magnitude { amount, .. } => Some(*amount),
            Self::Absent | Self::Text(_) => None,
        }
    }
}

impl PartialOrd for TypedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Absent, Self::Absent) => Some(Ordering::Equal),
            (Self::Absent, _) => Some(Ordering::Less),
            (_, Self::Absent) => Some(Ordering::Greater),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => (a == b).then_some(Ordering::Equal),
            _ => match (self.amount(), other.amount()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

// Equality follows the ordering so that `Integer(2) == Decimal(2.0)`.
impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::Integer(n) => write!(f, "{n}"),
            // Debug keeps the point on whole values: 30.0, not 30.
            Self::Decimal(x) => write!(f, "{x:?}"),
            Self::Text(s) | Self::Magnitude { text: s, .. } => f.write_str(s),
        }
    }
}

// ── Entity record ────────────────────────────────────────────────────────

/// All extracted fields of one entity, in descriptor-table order.
///
/// Built once from a document and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRecord {
    fields: Vec<(String, TypedValue)>,
}

impl EntityRecord {
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keys whose value is `Absent`.
    pub fn absent_keys(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, v)| v.is_absent())
            .map(|(k, _)| k)
            .collect()
    }
}

/// A repeated key keeps its first position and takes the latest value.
impl<K: Into<String>> FromIterator<(K, TypedValue)> for EntityRecord {
    fn from_iter<I: IntoIterator<Item = (K, TypedValue)>>(iter: I) -> Self {
        let mut fields: Vec<(String, TypedValue)> = Vec::new();
        for (key, value) in iter {
            let key = key.into();
            match fields.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => fields.push((key, value)),
            }
        }
        EntityRecord { fields }
    }
}
