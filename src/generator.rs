// generator.rs
use crate::catalog::{ConnectorList, Theme, ThemeCatalog};
use crate::error::OracleError;
use crate::randomness::{choose, RandomSource};

use log::debug;
use serde::Serialize;
use std::sync::Arc;

/// One hallucinated idea plus how it was put together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    #[serde(rename = "input_solicitado")]
    pub requested_input: String,
    #[serde(rename = "tema_identificado")]
    pub identified_theme: String,
    #[serde(rename = "ideia_alucinada")]
    pub generated_idea: String,
    #[serde(rename = "fator_distorcao")]
    pub distortion_factor: String,
}

/// Deterministic half of theme resolution. Scans themes in catalog order and
/// returns the first one whose name or terms overlap the keyword.
pub fn find_theme<'a>(keyword: &str, catalog: &'a ThemeCatalog) -> Option<&'a Theme> {
    let keyword_lower = keyword.to_lowercase();
    catalog.themes().iter().find(|theme| {
        let name = theme.name.to_lowercase();
        name.contains(&keyword_lower)
            || keyword_lower.contains(&name)
            // Terms are lowercased as well, so mixed-case vocabulary like
            // "IoT" or "NFT" still matches a lowercased keyword.
            || theme.keywords.iter().any(|term| {
                let term = term.to_lowercase();
                keyword_lower.contains(&term) || term.contains(&keyword_lower)
            })
    })
}

/// Theme for `keyword`, or a uniformly random one when nothing matches.
pub fn resolve_theme<'a, R>(
    keyword: &str,
    catalog: &'a ThemeCatalog,
    rng: &mut R,
) -> Result<&'a Theme, OracleError>
where
    R: RandomSource + ?Sized,
{
    if let Some(theme) = find_theme(keyword, catalog) {
        return Ok(theme);
    }
    debug!("No theme matched '{}', falling back to a random theme", keyword);
    choose(rng, catalog.themes()).ok_or_else(|| OracleError::integrity("catalog has no themes"))
}

fn pick_term<'a, R>(theme: &'a Theme, rng: &mut R) -> Result<&'a str, OracleError>
where
    R: RandomSource + ?Sized,
{
    choose(rng, &theme.keywords)
        .map(String::as_str)
        .ok_or_else(|| OracleError::integrity(format!("theme '{}' has no terms", theme.name)))
}

#[derive(Debug, Clone)]
pub struct IdeaGenerator {
    catalog: Arc<ThemeCatalog>,
    connectors: Arc<ConnectorList>,
}

impl IdeaGenerator {
    pub fn new(catalog: ThemeCatalog, connectors: ConnectorList) -> Self {
        IdeaGenerator {
            catalog: Arc::new(catalog),
            connectors: Arc::new(connectors),
        }
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn connectors(&self) -> &ConnectorList {
        &self.connectors
    }

    /// Cross-pollinates a term of the keyword's theme with a term of a
    /// different theme through a random connector.
    ///
    /// The keyword is expected to be validated already; it is echoed back
    /// untouched in `requested_input`.
    pub fn generate<R>(&self, keyword: &str, rng: &mut R) -> Result<GenerationResult, OracleError>
    where
        R: RandomSource + ?Sized,
    {
        let catalog = self.catalog.as_ref();
        if catalog.len() < 2 {
            return Err(OracleError::integrity(format!(
                "catalog needs at least two themes, found {}",
                catalog.len()
            )));
        }
        if self.connectors.phrases().is_empty() {
            return Err(OracleError::integrity("connector list is empty"));
        }

        let identified = resolve_theme(keyword, catalog, rng)?;
        let base_term = pick_term(identified, rng)?;

        let remaining: Vec<&Theme> = catalog
            .themes()
            .iter()
            .filter(|t| t.name != identified.name)
            .collect();
        let cross = *choose(rng, &remaining).ok_or_else(|| {
            OracleError::integrity(format!("no theme other than '{}'", identified.name))
        })?;
        let cross_term = pick_term(cross, rng)?;

        let connector = choose(rng, self.connectors.phrases())
            .ok_or_else(|| OracleError::integrity("connector list is empty"))?;

        debug!(
            "Combining '{}' ({}) with '{}' ({}) via '{}'",
            base_term, identified.name, cross_term, cross.name, connector
        );

        Ok(GenerationResult {
            requested_input: keyword.to_string(),
            identified_theme: identified.name.clone(),
            generated_idea: format!("{} {} {}", base_term, connector, cross_term),
            distortion_factor: format!(
                "Combinou {} com {} usando \"{}\"",
                identified.name, cross.name, connector
            ),
        })
    }
}
