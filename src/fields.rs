use polity_types::EntityRecord;
use std::sync::LazyLock;

use crate::error::ExtractError;
use crate::extract::{Field, FieldKind};

use FieldKind::*;

/// Every tracked infobox attribute, in display order for the flat layout.
/// Keys are unique.
pub const FIELD_TABLE: &[(&str, FieldKind)] = &[
    // Area
    ("area_km2", Integer),
    ("area_rank", Rank),
    ("percent_water", Decimal),
    // Population
    ("population_estimate", Integer),
    ("population_estimate_year", Integer),
    ("population_estimate_rank", Rank),
    ("population_census", Integer),
    ("population_census_year", Integer),
    ("population_density_km2", Decimal),
    ("population_density_rank", Rank),
    // GDP at purchasing power parity
    ("GDP_PPP", Dollar),
    ("GDP_PPP_year", Integer),
    ("GDP_PPP_rank", Rank),
    ("GDP_PPP_per_capita", Dollar),
    ("GDP_PPP_per_capita_rank", Rank),
    // Nominal GDP
    ("GDP_nominal", Dollar),
    ("GDP_nominal_year", Integer),
    ("GDP_nominal_rank", Rank),
    ("GDP_nominal_per_capita", Dollar),
    ("GDP_nominal_per_capita_rank", Rank),
    // Inequality
    ("Gini", Decimal),
    ("Gini_year", Integer),
    ("Gini_change", ChangeIndicator),
    ("Gini_rank", Rank),
    // Human Development Index
    ("HDI", Decimal),
    ("HDI_year", Integer),
    ("HDI_change", ChangeIndicator),
    ("HDI_rank", Rank),
    // Locale
    ("currency", Text),
    ("currency_code", Text),
    ("utc_offset", Text),
    ("date_format", Text),
    ("drives_on", Text),
    ("calling_code", Text),
    ("cctld", Text),
];

/// Compiled descriptors, built once.
static FIELDS: LazyLock<Vec<Field>> = LazyLock::new(|| {
    FIELD_TABLE
        .iter()
        .map(|&(key, kind)| Field::new(key, kind))
        .collect()
});

pub fn fields() -> &'static [Field] {
    &FIELDS
}

/// Extract every descriptor from one entity's document.
///
/// Missing fields become `Absent` entries and never stop the build.
pub fn build_record(document: &str) -> Result<EntityRecord, ExtractError> {
    fields()
        .iter()
        .map(|field| field.extract(document).map(|value| (field.key, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polity_types::TypedValue;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<&str> = FIELD_TABLE.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.len(), FIELD_TABLE.len());
    }

    #[test]
    fn test_record_has_every_key_in_table_order() {
        let record = build_record("").unwrap();
        let expected: Vec<&str> = FIELD_TABLE.iter().map(|(k, _)| *k).collect();
        assert_eq!(record.keys().collect::<Vec<_>>(), expected);
        assert!(record.iter().all(|(_, v)| v.is_absent()));
    }

    #[test]
    fn test_partial_document() {
        let doc = "| area_km2 = 551,695\n| area_rank = 43rd\n| cctld = [[.fr]]\n";
        let record = build_record(doc).unwrap();
        assert_eq!(record.get("area_km2"), Some(&TypedValue::Integer(551695)));
        assert_eq!(record.get("area_rank"), Some(&TypedValue::Text("43rd".into())));
        assert_eq!(record.get("cctld"), Some(&TypedValue::Text(".fr".into())));
        assert_eq!(record.get("HDI"), Some(&TypedValue::Absent));
        assert_eq!(record.absent_keys().len(), FIELD_TABLE.len() - 3);
    }

    #[test]
    fn test_malformed_number_aborts_build() {
        let doc = "| HDI = 0.9.1\n";
        assert!(matches!(
            build_record(doc),
            Err(ExtractError::MalformedNumber { .. })
        ));
    }
}
