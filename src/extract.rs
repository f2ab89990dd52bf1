use polity_types::TypedValue;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ExtractError;
use crate::sanitize::sanitize;

// ── Value patterns ──────────────────────────────────────────────────
//
// Each pattern follows `key = ` and puts the raw value in group 1.
// Real data examples:
//   | area_km2 = 9,984,670
//   | percent_water = 8.92
//   | population_estimate_rank = 37th
//   | HDI_change = increase
//   | drives_on = right
//   | GDP_PPP = {{increase}} $2.472 trillion<ref name="IMFWEOCA" />

/// How a field's raw value is located and normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Digits and thousands separators after any non-digit prefix.
    Integer,
    /// Digits, separators and a decimal point.
    Decimal,
    /// Leading word token; the rest of the line is ignored.
    Rank,
    /// Non-blank token running to the end of the line.
    ChangeIndicator,
    /// Everything up to the end of the line.
    Text,
    /// Currency amount with an optional million/billion/trillion suffix,
    /// after any currency symbol or other non-digit prefix.
    Dollar,
}

impl FieldKind {
    fn value_pattern(self) -> &'static str {
        match self {
            Self::Integer => r"[^0-9]*([,0-9]+)",
            Self::Decimal => r"([.,0-9]+)",
            Self::Rank => r"(\w+).*\n",
            Self::ChangeIndicator => r"(\S+)\n",
            Self::Text => r"([^\n]+)\n",
            Self::Dollar => concat!(
                r"[^0-9]*",
                r"([.,0-9]+",
                r"(?:&nbsp;)?",
                r"(?:\{\{nbsp\}\})?",
                r"\s*",
                r"(?:trillion)?(?:billion)?(?:million)?)",
            ),
        }
    }

    pub fn format(self) -> ValueFormat {
        match self {
            Self::Integer | Self::Decimal => ValueFormat::Number,
            Self::Rank | Self::ChangeIndicator | Self::Text => ValueFormat::Identity,
            Self::Dollar => ValueFormat::Magnitude,
        }
    }
}

/// Turns sanitized text into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Identity,
    /// Integer without a decimal point, decimal with one.
    Number,
    /// Text kept for display, amount resolved for comparison.
    Magnitude,
}

impl ValueFormat {
    pub fn apply(self, field: &str, text: &str) -> Result<TypedValue, ExtractError> {
        let text = text.trim();
        match self {
            Self::Identity => Ok(TypedValue::Text(text.to_string())),
            Self::Number => parse_number(field, text),
            Self::Magnitude => parse_magnitude(field, text),
        }
    }
}

// ── Field descriptor ────────────────────────────────────────────────

/// One extractable infobox attribute.
#[derive(Debug, Clone)]
pub struct Field {
    pub key: &'static str,
    pub kind: FieldKind,
    regex: Regex,
}

impl Field {
    pub fn new(key: &'static str, kind: FieldKind) -> Self {
        // Greedy dot-all prefix: the last `key =` in the document that
        // satisfies the value pattern wins.
        let pattern = format!(
            r"(?s)\A.*{}\s*=\s*{}",
            regex::escape(key),
            kind.value_pattern()
        );
        Field {
            key,
            kind,
            regex: Regex::new(&pattern).unwrap(),
        }
    }

    /// Find this field in `document` and normalize it.
    ///
    /// A field that does not occur yields `TypedValue::Absent`; only
    /// unparseable numeric text is an error.
    pub fn extract(&self, document: &str) -> Result<TypedValue, ExtractError> {
        let Some(raw) = self
            .regex
            .captures(document)
            .and_then(|caps| caps.get(1))
        else {
            return Ok(TypedValue::Absent);
        };
        self.kind.format().apply(self.key, &sanitize(raw.as_str()))
    }
}

// ── Number parsing ──────────────────────────────────────────────────

fn malformed(field: &str, text: &str) -> ExtractError {
    ExtractError::MalformedNumber {
        field: field.to_string(),
        text: text.to_string(),
    }
}

/// "1,234" → 1234, "12.5" → 12.5, "1,234.5" → 1234.5
pub fn parse_number(field: &str, text: &str) -> Result<TypedValue, ExtractError> {
    let cleaned = text.replace(',', "");
    if cleaned.contains('.') {
        cleaned
            .parse::<f64>()
            .map(TypedValue::Decimal)
            .map_err(|_| malformed(field, text))
    } else {
        cleaned
            .parse::<i64>()
            .map(TypedValue::Integer)
            .map_err(|_| malformed(field, text))
    }
}

static RE_MAGNITUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([.,0-9]+)\s*(trillion|billion|million)?").unwrap());

/// "1.2 trillion" → Magnitude { text: "1.2 trillion", amount: 1.2e12 }
pub fn parse_magnitude(field: &str, text: &str) -> Result<TypedValue, ExtractError> {
    let caps = RE_MAGNITUDE
        .captures(text)
        .ok_or_else(|| malformed(field, text))?;
    let amount: f64 = caps[1]
        .replace(',', "")
        .parse()
        .map_err(|_| malformed(field, text))?;
    let scale = match caps.get(2).map(|m| m.as_str()) {
        Some("trillion") => 1e12,
        Some("billion") => 1e9,
        Some("million") => 1e6,
        _ => 1.0,
    };
    Ok(TypedValue::Magnitude {
        text: text.to_string(),
        amount: amount * scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANADA: &str = "\
{{Infobox country
| conventional_long_name = Canada
| area_km2 = 9,984,670
| area_rank = 2nd
| percent_water = 8.92
| population_estimate = {{increase}} 38,929,902<ref name=\"popclock\" />
| population_estimate_rank = 37th
| GDP_PPP = {{increase}} $2.472 trillion<ref name=\"IMFWEOCA\" />
| GDP_PPP_rank = 16th
| GDP_PPP_per_capita = {{increase}} $62,446
| Gini = 30.3 <!--number only-->
| HDI_change = increase
| currency = [[Canadian dollar]] ($) ([[ISO 4217|CAD]])
| drives_on = right
}}
";

    fn extract(key: &'static str, kind: FieldKind) -> TypedValue {
        Field::new(key, kind).extract(CANADA).unwrap()
    }

    fn text(s: &str) -> TypedValue {
        TypedValue::Text(s.to_string())
    }

    // ── per kind ─────────────────────────────────────────────────────

    #[test]
    fn test_integer_field() {
        assert_eq!(extract("area_km2", FieldKind::Integer), TypedValue::Integer(9984670));
        assert_eq!(
            extract("population_estimate", FieldKind::Integer),
            TypedValue::Integer(38929902)
        );
    }

    #[test]
    fn test_decimal_field() {
        assert_eq!(extract("percent_water", FieldKind::Decimal), TypedValue::Decimal(8.92));
        assert_eq!(extract("Gini", FieldKind::Decimal), TypedValue::Decimal(30.3));
    }

    #[test]
    fn test_rank_and_text_fields() {
        assert_eq!(extract("area_rank", FieldKind::Rank), text("2nd"));
        assert_eq!(extract("GDP_PPP_rank", FieldKind::Rank), text("16th"));
        assert_eq!(extract("HDI_change", FieldKind::ChangeIndicator), text("increase"));
        assert_eq!(extract("drives_on", FieldKind::Text), text("right"));
        assert_eq!(
            extract("currency", FieldKind::Text),
            text("Canadian dollar ($) (CAD)")
        );
    }

    #[test]
    fn test_dollar_field_keeps_text_and_resolves_amount() {
        match extract("GDP_PPP", FieldKind::Dollar) {
            TypedValue::Magnitude { text, amount } => {
                assert_eq!(text, "2.472 trillion");
                assert!((amount - 2.472e12).abs() < 1.0);
            }
            other => panic!("expected magnitude, got {other:?}"),
        }
        match extract("GDP_PPP_per_capita", FieldKind::Dollar) {
            TypedValue::Magnitude { text, amount } => {
                assert_eq!(text, "62,446");
                assert_eq!(amount, 62446.0);
            }
            other => panic!("expected magnitude, got {other:?}"),
        }
    }

    // ── matching rules ───────────────────────────────────────────────

    #[test]
    fn test_absent_field() {
        assert_eq!(extract("HDI", FieldKind::Decimal), TypedValue::Absent);
        assert_eq!(extract("calling_code", FieldKind::Text), TypedValue::Absent);
    }

    #[test]
    fn test_key_does_not_match_longer_key() {
        // Only `GDP_PPP_rank =` and `GDP_PPP_per_capita =` would be near misses.
        let doc = "| GDP_PPP_rank = 16th\n| GDP_PPP_per_capita = $62,446\n";
        assert_eq!(
            Field::new("GDP_PPP", FieldKind::Dollar).extract(doc).unwrap(),
            TypedValue::Absent
        );
    }

    #[test]
    fn test_last_occurrence_wins() {
        let doc = "| area_km2 = 100\n| area_km2 = 200\n";
        assert_eq!(
            Field::new("area_km2", FieldKind::Integer).extract(doc).unwrap(),
            TypedValue::Integer(200)
        );
    }

    // ── number parsing ───────────────────────────────────────────────

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("f", "1,234").unwrap(), TypedValue::Integer(1234));
        assert_eq!(parse_number("f", "12.5").unwrap(), TypedValue::Decimal(12.5));
        assert_eq!(parse_number("f", "1,234.5").unwrap(), TypedValue::Decimal(1234.5));
    }

    #[test]
    fn test_parse_number_malformed() {
        for bad in [",", "1.2.3", "", "."] {
            let err = parse_number("HDI", bad).unwrap_err();
            assert!(matches!(err, ExtractError::MalformedNumber { ref field, .. } if field == "HDI"));
        }
    }

    #[test]
    fn test_parse_magnitude_scales() {
        let amount = |s| match parse_magnitude("f", s).unwrap() {
            TypedValue::Magnitude { amount, .. } => amount,
            other => panic!("expected magnitude, got {other:?}"),
        };
        assert_eq!(amount("3 million"), 3e6);
        assert_eq!(amount("2 billion"), 2e9);
        assert_eq!(amount("1,000"), 1000.0);
        assert!(amount("1 trillion") > amount("999 billion"));
        assert!(parse_magnitude("f", "n/a").is_err());
    }

    #[test]
    fn test_decimal_kind_without_point_is_integer() {
        let doc = "| percent_water = 0\n";
        assert_eq!(
            Field::new("percent_water", FieldKind::Decimal).extract(doc).unwrap(),
            TypedValue::Integer(0)
        );
    }
}
