//! Country records as served by the REST Countries API (`v3.1`).
//!
//! Only the fields the question generator needs are modelled. Upstream data
//! is patchy: some territories have no capital, no languages or a `null` in
//! place of a list, so every field falls back to an empty value and the
//! accessors report emptiness as `None`. Population is the exception: a
//! missing figure stays `None` rather than reading as zero.

use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: CountryName,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capital: Vec<String>,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Languages,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryName {
    #[serde(default, deserialize_with = "null_as_default")]
    pub common: String,
}

impl CountryRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: CountryName {
                common: name.into(),
            },
            ..Self::default()
        }
    }

    pub fn with_capital(mut self, capital: impl Into<String>) -> Self {
        self.capital.push(capital.into());
        self
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population = Some(population);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_language(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.languages.0.push((code.into(), name.into()));
        self
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name.common)
    }

    /// First listed capital. Countries with several capitals are asked about
    /// the first one only.
    pub fn capital(&self) -> Option<&str> {
        self.capital.first().and_then(|capital| non_empty(capital))
    }

    /// `None` when upstream omitted the figure; zero is a real population.
    pub fn population(&self) -> Option<u64> {
        self.population
    }

    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    pub fn languages(&self) -> &Languages {
        &self.languages
    }

    /// Language names joined with `", "` in upstream order, or `None` when
    /// the record lists no language.
    pub fn language_list(&self) -> Option<String> {
        if self.languages.is_empty() {
            return None;
        }
        Some(self.languages.names().collect::<Vec<_>>().join(", "))
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Language code to language name, in the order upstream listed them.
///
/// Upstream sends a JSON object; a plain `HashMap` would lose the order the
/// joined answer string depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Languages(Vec<(String, String)>);

impl Languages {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, name)| name.as_str())
    }
}

impl Serialize for Languages {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, name) in &self.0 {
            map.serialize_entry(code, name)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Languages {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LanguagesVisitor;

        impl<'de> Visitor<'de> for LanguagesVisitor {
            type Value = Languages;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of language codes to language names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((code, name)) = access.next_entry::<String, String>()? {
                    entries.push((code, name));
                }
                Ok(Languages(entries))
            }
        }

        deserializer.deserialize_map(LanguagesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_record() {
        let json = r#"{
            "name": {"common": "Switzerland", "official": "Swiss Confederation"},
            "capital": ["Bern"],
            "population": 8654622,
            "region": "Europe",
            "languages": {"fra": "French", "gsw": "Swiss German", "ita": "Italian", "roh": "Romansh"}
        }"#;

        let record: CountryRecord = serde_json::from_str(json).expect("parse record");

        assert_eq!(record.name(), Some("Switzerland"));
        assert_eq!(record.capital(), Some("Bern"));
        assert_eq!(record.population(), Some(8_654_622));
        assert_eq!(record.region(), Some("Europe"));
        assert_eq!(
            record.language_list().as_deref(),
            Some("French, Swiss German, Italian, Romansh")
        );
    }

    #[test]
    fn missing_and_null_fields_become_absent() {
        let json = r#"[
            {"name": {"common": "Antarctica"}, "population": 1000, "region": "Antarctic"},
            {"name": {"common": "Macau"}, "capital": null, "languages": null, "region": "Asia"},
            {"name": {"common": "Heard Island"}, "capital": [], "languages": {}, "region": "Antarctic"}
        ]"#;

        let records: Vec<CountryRecord> = serde_json::from_str(json).expect("parse records");

        for record in &records {
            assert_eq!(record.capital(), None);
            assert_eq!(record.language_list(), None);
        }
        assert_eq!(records[0].population(), Some(1000));
        assert_eq!(records[1].population(), None);
    }

    #[test]
    fn null_population_is_absent_but_zero_is_kept() {
        let json = r#"[
            {"name": {"common": "Bouvet Island"}, "population": 0},
            {"name": {"common": "Somewhere"}, "population": null}
        ]"#;

        let records: Vec<CountryRecord> = serde_json::from_str(json).expect("parse records");

        assert_eq!(records[0].population(), Some(0));
        assert_eq!(records[1].population(), None);
    }

    #[test]
    fn empty_capital_string_is_absent() {
        let record = CountryRecord::new("Nowhere").with_capital("");
        assert_eq!(record.capital(), None);
    }

    #[test]
    fn languages_serialize_back_in_order() {
        let record = CountryRecord::new("Belgium")
            .with_language("nld", "Dutch")
            .with_language("fra", "French")
            .with_language("deu", "German");

        let encoded = serde_json::to_string(&record.languages).expect("encode languages");
        assert_eq!(encoded, r#"{"nld":"Dutch","fra":"French","deu":"German"}"#);

        let decoded: Languages = serde_json::from_str(&encoded).expect("decode languages");
        assert_eq!(decoded.names().collect::<Vec<_>>(), ["Dutch", "French", "German"]);
    }
}
