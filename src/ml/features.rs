use crate::catalog::FeatureCatalog;
use crate::error::{AppError, Result};
use crate::ml::models::FeatureEncoding;
use crate::models::SymptomSelection;
use serde::{Deserialize, Serialize};

/// Ordered numeric encoding of a selection, one entry per catalog symptom
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    pub fn new(values: Vec<u8>) -> Self {
        Self(values)
    }

    pub fn zeros(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no symptom is set
    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    /// Number of nonzero positions
    pub fn nonzero_count(&self) -> usize {
        self.0.iter().filter(|&&v| v != 0).count()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Model input row
    pub fn to_f64(&self) -> Vec<f64> {
        self.0.iter().map(|&v| v as f64).collect()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for FeatureVector {
    fn from(values: Vec<u8>) -> Self {
        Self(values)
    }
}

/// Turns a symptom selection into a feature vector aligned with the catalog
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    catalog: &'a FeatureCatalog,
    encoding: FeatureEncoding,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(catalog: &'a FeatureCatalog, encoding: FeatureEncoding) -> Self {
        Self { catalog, encoding }
    }

    /// Encode a selection
    ///
    /// Position `i` holds the severity of catalog symptom `i` (or 1 under
    /// presence encoding) when selected, otherwise 0. Unknown symptoms and
    /// symptoms outside the chosen categories are rejected.
    pub fn encode(&self, selection: &SymptomSelection) -> Result<FeatureVector> {
        let offered = match &selection.categories {
            Some(categories) => Some(self.catalog.symptoms_in(categories)?),
            None => None,
        };

        let mut values = vec![0u8; self.catalog.len()];

        for (symptom, severity) in &selection.symptoms {
            let index = self.catalog.index_of(symptom).ok_or_else(|| {
                AppError::Validation(format!("unknown symptom '{}'", symptom))
            })?;

            if let Some(offered) = &offered {
                if !offered.contains(symptom) {
                    return Err(AppError::Validation(format!(
                        "symptom '{}' is not in the selected categories",
                        symptom
                    )));
                }
            }

            values[index] = match self.encoding {
                FeatureEncoding::Severity => severity.value(),
                FeatureEncoding::Presence => u8::from(severity.value() > 0),
            };
        }

        Ok(FeatureVector(values))
    }

    pub fn n_features(&self) -> usize {
        self.catalog.len()
    }
}
