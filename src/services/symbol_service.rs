use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read symbol file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to parse symbol list: {0}")]
    Parse(#[from] csv::Error),
}

/// Sorted, de-duplicated list of known ticker symbols.
/// Loaded once and shared read-only between requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolCatalog {
    symbols: Vec<String>,
}

impl SymbolCatalog {
    /// Load symbols from the first column of a CSV file with a header row
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new().flexible(true).from_path(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_csv(reader)?;
        info!("Loaded {} symbols from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    #[cfg(test)]
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::from_csv(csv::ReaderBuilder::new().flexible(true).from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, CatalogError> {
        let mut unique = BTreeSet::new();
        for record in reader.records() {
            let record = record?;
            if let Some(symbol) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) {
                unique.insert(symbol.to_string());
            }
        }
        Ok(Self {
            symbols: unique.into_iter().collect(),
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.binary_search_by(|s| s.as_str().cmp(symbol)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
