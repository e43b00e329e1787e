// catalog.rs
use crate::error::OracleError;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A named vocabulary list. Only `name` and `keywords` feed the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub keywords: Vec<String>,
    pub description: String,
    pub weight: f64,
}

impl Theme {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Theme {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: String::new(),
            weight: 1.0,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Deserialize)]
struct ThemeEntry {
    keywords: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default = "default_weight")]
    weight: f64,
}

// Theme documents come either as {"keywords": [...], ...} or a bare term list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ThemeDocument {
    Detailed(ThemeEntry),
    Terms(Vec<String>),
}

/// Themes in document order. Order decides which theme wins when a keyword
/// matches several of them, so it must never be reshuffled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
}

impl ThemeCatalog {
    pub fn new(themes: Vec<Theme>) -> Self {
        ThemeCatalog { themes }
    }

    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        let raw: Map<String, Value> = serde_json::from_str(document)?;
        let mut themes = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let theme = match serde_json::from_value::<ThemeDocument>(value)? {
                ThemeDocument::Detailed(entry) => Theme {
                    name,
                    keywords: entry.keywords,
                    description: entry.description,
                    weight: entry.weight,
                },
                ThemeDocument::Terms(keywords) => Theme {
                    name,
                    keywords,
                    description: String::new(),
                    weight: default_weight(),
                },
            };
            themes.push(theme);
        }
        Ok(ThemeCatalog { themes })
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn validate(&self) -> Result<(), OracleError> {
        if self.themes.len() < 2 {
            return Err(OracleError::integrity(format!(
                "catalog needs at least two themes, found {}",
                self.themes.len()
            )));
        }
        let mut seen = HashSet::new();
        for theme in &self.themes {
            if theme.name.is_empty() {
                return Err(OracleError::integrity("theme with empty name"));
            }
            if !seen.insert(theme.name.as_str()) {
                return Err(OracleError::integrity(format!(
                    "duplicate theme '{}'",
                    theme.name
                )));
            }
            if theme.keywords.is_empty() {
                return Err(OracleError::integrity(format!(
                    "theme '{}' has no terms",
                    theme.name
                )));
            }
            if theme.keywords.iter().any(|k| k.is_empty()) {
                return Err(OracleError::integrity(format!(
                    "theme '{}' contains an empty term",
                    theme.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorCategory {
    pub name: String,
    pub phrases: Vec<String>,
}

/// Connector phrases grouped by category. Generation sees the flattened list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectorList {
    categories: Vec<ConnectorCategory>,
    phrases: Vec<String>,
}

impl ConnectorList {
    pub fn new(categories: Vec<ConnectorCategory>) -> Self {
        let phrases = categories
            .iter()
            .flat_map(|c| c.phrases.iter().cloned())
            .collect();
        ConnectorList {
            categories,
            phrases,
        }
    }

    #[cfg(test)]
    pub fn from_phrases(category: &str, phrases: &[&str]) -> Self {
        ConnectorList::new(vec![ConnectorCategory {
            name: category.to_string(),
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }])
    }

    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        let raw: Map<String, Value> = serde_json::from_str(document)?;
        let mut categories = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let phrases: Vec<String> = serde_json::from_value(value)?;
            categories.push(ConnectorCategory { name, phrases });
        }
        Ok(ConnectorList::new(categories))
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn categories(&self) -> &[ConnectorCategory] {
        &self.categories
    }

    pub fn validate(&self) -> Result<(), OracleError> {
        if self.phrases.is_empty() {
            return Err(OracleError::integrity("connector list is empty"));
        }
        if self.phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(OracleError::integrity("connector list contains an empty phrase"));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ThemeStats<'a> {
    keyword_count: usize,
    description: &'a str,
    weight: f64,
}

/// Statistics document served by the `temas` and `stats` endpoints.
pub fn dataset_stats(catalog: &ThemeCatalog, connectors: &ConnectorList) -> Value {
    let mut temas = Map::new();
    for theme in catalog.themes() {
        let stats = ThemeStats {
            keyword_count: theme.keywords.len(),
            description: &theme.description,
            weight: theme.weight,
        };
        temas.insert(
            theme.name.clone(),
            serde_json::to_value(stats).unwrap_or(Value::Null),
        );
    }

    let mut conectores = Map::new();
    for category in connectors.categories() {
        conectores.insert(category.name.clone(), Value::from(category.phrases.len()));
    }

    serde_json::json!({
        "temas": temas,
        "conectores": conectores,
        "total_temas": catalog.len(),
        "total_conectores": connectors.phrases().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_order_follows_document() {
        let doc = r#"{
            "viagem": {"keywords": ["oceano"], "description": "Viagens"},
            "comida": ["umami", "molecular"],
            "arte": {"keywords": ["NFT"], "weight": 0.5}
        }"#;
        let catalog = ThemeCatalog::from_json(doc).unwrap();
        assert_eq!(catalog.names(), vec!["viagem", "comida", "arte"]);
        assert_eq!(catalog.get("viagem").unwrap().description, "Viagens");
        assert_eq!(catalog.get("comida").unwrap().weight, 1.0);
        assert_eq!(catalog.get("arte").unwrap().weight, 0.5);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn single_theme_catalog_is_rejected() {
        let catalog = ThemeCatalog::new(vec![Theme::new("A", &["x"])]);
        assert!(matches!(
            catalog.validate(),
            Err(OracleError::DataIntegrity { .. })
        ));
    }

    #[test]
    fn theme_without_terms_is_rejected() {
        let catalog = ThemeCatalog::new(vec![Theme::new("A", &["x"]), Theme::new("B", &[])]);
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("'B'"));
    }

    #[test]
    fn empty_term_is_rejected() {
        let catalog = ThemeCatalog::new(vec![Theme::new("A", &["x", ""]), Theme::new("B", &["y"])]);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn connectors_flatten_in_category_order() {
        let doc = r#"{"energia": ["alimentado por", "usando"], "misterio": ["escondido em"]}"#;
        let connectors = ConnectorList::from_json(doc).unwrap();
        assert_eq!(
            connectors.phrases(),
            &["alimentado por", "usando", "escondido em"]
        );
        assert!(connectors.validate().is_ok());
        assert!(ConnectorList::default().validate().is_err());
    }

    #[test]
    fn stats_count_terms_and_phrases() {
        let catalog = ThemeCatalog::new(vec![
            Theme::new("A", &["x", "z"]).with_description("letras"),
            Theme::new("B", &["y"]),
        ]);
        let connectors = ConnectorList::from_phrases("base", &["with", "and"]);
        let stats = dataset_stats(&catalog, &connectors);
        assert_eq!(stats["total_temas"], 2);
        assert_eq!(stats["total_conectores"], 2);
        assert_eq!(stats["temas"]["A"]["keyword_count"], 2);
        assert_eq!(stats["temas"]["A"]["description"], "letras");
        assert_eq!(stats["conectores"]["base"], 2);
    }
}
