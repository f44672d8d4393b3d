//! Symptom catalog
//!
//! Static mapping from category name to an ordered list of symptom
//! identifiers. Flattening the categories in declaration order yields the
//! canonical feature index shared by training and inference.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const HALLUCINATIONS: &str = "hallucinations";
pub const PARANOIA: &str = "paranoia";

/// Built-in categories in declaration order
const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    ("Mood", &["anxiety", "depressed_mood"]),
    ("Cognitive", &["memory_loss", PARANOIA]),
    ("Perceptual", &[HALLUCINATIONS, "delusions"]),
    ("Behavioral", &["impulsivity", "sleep_disturbance"]),
];

/// A named group of symptoms, used for filtering what the user is offered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category name
    pub name: String,

    /// Symptoms owned by this category, in display order
    pub symptoms: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>, symptoms: Vec<String>) -> Self {
        Self {
            name: name.into(),
            symptoms,
        }
    }
}

/// Ordered symptom catalog
#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    categories: Vec<Category>,

    /// Flattened symptom list (the feature layout)
    features: Vec<String>,

    /// Symptom -> feature position
    index: HashMap<String, usize>,
}

impl FeatureCatalog {
    /// Build a catalog from categories, rejecting ambiguous layouts
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(AppError::Configuration(
                "catalog must declare at least one category".to_string(),
            ));
        }

        let mut seen_categories: Vec<&str> = Vec::with_capacity(categories.len());
        for category in &categories {
            if category.name.trim().is_empty() {
                return Err(AppError::Configuration(
                    "category name must not be empty".to_string(),
                ));
            }
            if seen_categories.contains(&category.name.as_str()) {
                return Err(AppError::Configuration(format!(
                    "category '{}' declared twice",
                    category.name
                )));
            }
            seen_categories.push(&category.name);
        }

        let (features, index) = Self::layout(&categories);

        // A repeated symptom keeps its first position in the index
        if let Some((_, symptom)) = features
            .iter()
            .enumerate()
            .find(|(i, symptom)| index.get(*symptom) != Some(i))
        {
            return Err(AppError::Configuration(format!(
                "symptom '{}' belongs to more than one category",
                symptom
            )));
        }

        if features.is_empty() {
            return Err(AppError::Configuration(
                "catalog must contain at least one symptom".to_string(),
            ));
        }

        Ok(Self {
            categories,
            features,
            index,
        })
    }

    /// The catalog compiled into the program
    pub fn builtin() -> Self {
        let categories = BUILTIN_CATEGORIES
            .iter()
            .map(|(name, symptoms)| {
                Category::new(*name, symptoms.iter().map(|s| s.to_string()).collect())
            })
            .collect::<Vec<_>>();

        let (features, index) = Self::layout(&categories);

        Self {
            categories,
            features,
            index,
        }
    }

    /// Flatten categories into the feature order and a symptom -> position index
    fn layout(categories: &[Category]) -> (Vec<String>, HashMap<String, usize>) {
        let features: Vec<String> = categories
            .iter()
            .flat_map(|c| c.symptoms.iter().cloned())
            .collect();

        let mut index = HashMap::with_capacity(features.len());
        for (position, symptom) in features.iter().enumerate() {
            index.entry(symptom.clone()).or_insert(position);
        }

        (features, index)
    }

    /// Ordered feature list
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Feature position of a symptom
    pub fn index_of(&self, symptom: &str) -> Option<usize> {
        self.index.get(symptom).copied()
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.index.contains_key(symptom)
    }

    /// Symptoms offered for the chosen categories, in the order the
    /// categories were chosen
    pub fn symptoms_in<S: AsRef<str>>(&self, categories: &[S]) -> Result<Vec<String>> {
        let mut symptoms = Vec::new();

        for name in categories {
            let name = name.as_ref();
            let category = self
                .category(name)
                .ok_or_else(|| AppError::Validation(format!("unknown category '{}'", name)))?;

            for symptom in &category.symptoms {
                if !symptoms.contains(symptom) {
                    symptoms.push(symptom.clone());
                }
            }
        }

        Ok(symptoms)
    }
}

impl Default for FeatureCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
