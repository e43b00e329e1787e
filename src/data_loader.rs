// data_loader.rs
use crate::catalog::{ConnectorCategory, ConnectorList, Theme, ThemeCatalog};

use anyhow::{anyhow, Context};
use lazy_static::lazy_static;
use log::{info, warn};
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const THEMES_FILE: &str = "temas.json";
pub const CONNECTORS_FILE: &str = "conectores.json";

lazy_static! {
    static ref FALLBACK_CATALOG: ThemeCatalog = ThemeCatalog::new(vec![
        Theme::new(
            "tecnologia",
            &["microchip", "blockchain", "metaverso", "computação quântica", "big data"],
        )
        .with_description("Temas relacionados à tecnologia"),
        Theme::new(
            "saúde",
            &["nutrição", "sono", "imunidade", "exercício", "microbioma"],
        )
        .with_description("Temas relacionados à saúde"),
        Theme::new(
            "viagem",
            &["espaço", "oceano", "montanha", "deserto", "floresta tropical"],
        )
        .with_description("Temas relacionados a viagens"),
        Theme::new(
            "comida",
            &["vegetariana", "fermentada", "molecular", "sustentável", "sabor umami"],
        )
        .with_description("Temas relacionados à alimentação"),
    ]);
    static ref FALLBACK_CONNECTORS: ConnectorList = ConnectorList::new(vec![ConnectorCategory {
        name: "conectores_energia".to_string(),
        phrases: vec![
            "alimentado por cristais de".to_string(),
            "usando a energia cinética de".to_string(),
            "escondido no espectro de".to_string(),
            "com a única finalidade de treinar".to_string(),
            "que na verdade é um disfarce para".to_string(),
        ],
    }]);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Directory(PathBuf),
    Remote(String),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Directory(path) => write!(f, "directory {}", path.display()),
            DataSource::Remote(url) => write!(f, "remote {}", url),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataOrigin {
    Primary(String),
    Fallback,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::Primary(source) => write!(f, "{}", source),
            DataOrigin::Fallback => write!(f, "built-in fallback dataset"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub catalog: ThemeCatalog,
    pub connectors: ConnectorList,
    pub origin: DataOrigin,
}

pub fn fallback_dataset() -> LoadedDataset {
    LoadedDataset {
        catalog: FALLBACK_CATALOG.clone(),
        connectors: FALLBACK_CONNECTORS.clone(),
        origin: DataOrigin::Fallback,
    }
}

async fn read_document(dir: &Path, name: &str) -> anyhow::Result<String> {
    let path = dir.join(name);
    fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

async fn fetch_document(client: &Client, base_url: &str, name: &str) -> anyhow::Result<String> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), name);
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("fetching {}", url))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("fetching {} returned {}", url, status));
    }
    Ok(response.text().await?)
}

async fn load_primary(source: &DataSource) -> anyhow::Result<LoadedDataset> {
    let (themes_doc, connectors_doc) = match source {
        DataSource::Directory(dir) => (
            read_document(dir, THEMES_FILE).await?,
            read_document(dir, CONNECTORS_FILE).await?,
        ),
        DataSource::Remote(base_url) => {
            let client = Client::new();
            (
                fetch_document(&client, base_url, THEMES_FILE).await?,
                fetch_document(&client, base_url, CONNECTORS_FILE).await?,
            )
        }
    };

    let catalog = ThemeCatalog::from_json(&themes_doc)
        .with_context(|| format!("parsing {}", THEMES_FILE))?;
    let connectors = ConnectorList::from_json(&connectors_doc)
        .with_context(|| format!("parsing {}", CONNECTORS_FILE))?;
    catalog.validate()?;
    connectors.validate()?;

    Ok(LoadedDataset {
        catalog,
        connectors,
        origin: DataOrigin::Primary(source.to_string()),
    })
}

/// Loads themes and connectors from `source`. Any failure (missing file,
/// bad JSON, unreachable host, invariant violation) is logged and replaced by
/// the built-in dataset; callers only learn about it through `origin`.
pub async fn load_dataset(source: &DataSource) -> LoadedDataset {
    match load_primary(source).await {
        Ok(dataset) => {
            info!(
                "Loaded {} themes and {} connectors from {}",
                dataset.catalog.len(),
                dataset.connectors.phrases().len(),
                source
            );
            dataset
        }
        Err(e) => {
            warn!(
                "Could not load data from {} ({:#}), using fallback data",
                source, e
            );
            fallback_dataset()
        }
    }
}
