//! Index definition model

use serde::{Deserialize, Serialize};

/// Distance metric for vector indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Cosine,
    Manhattan,
    Chebyshev,
    Hamming,
    Jaccard,
    Pearson,
}

impl DistanceMetric {
    pub fn keyword(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "EUCLIDEAN",
            DistanceMetric::Cosine => "COSINE",
            DistanceMetric::Manhattan => "MANHATTAN",
            DistanceMetric::Chebyshev => "CHEBYSHEV",
            DistanceMetric::Hamming => "HAMMING",
            DistanceMetric::Jaccard => "JACCARD",
            DistanceMetric::Pearson => "PEARSON",
        }
    }
}

/// Vector index structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorAlgorithm {
    #[default]
    Mtree,
    Hnsw,
}

impl VectorAlgorithm {
    pub fn keyword(&self) -> &'static str {
        match self {
            VectorAlgorithm::Mtree => "MTREE",
            VectorAlgorithm::Hnsw => "HNSW",
        }
    }
}

/// Index kind and its kind-specific parameters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IndexKind {
    /// Plain lookup index
    #[default]
    Normal,
    /// Values must be unique across records
    Unique,
    /// Full-text search index
    Search {
        analyzer: String,
        #[serde(default)]
        highlights: bool,
    },
    /// Vector similarity index
    Vector {
        #[serde(default)]
        algorithm: VectorAlgorithm,
        dimension: u32,
        #[serde(default)]
        distance: DistanceMetric,
    },
}

/// Index definition model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    /// Indexed field names, in order
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub kind: IndexKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl IndexDefinition {
    /// Create an index with a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: add a field
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Builder: set as unique
    pub fn unique(mut self) -> Self {
        self.kind = IndexKind::Unique;
        self
    }

    /// Builder: full-text search using `analyzer`
    pub fn search(mut self, analyzer: impl Into<String>) -> Self {
        self.kind = IndexKind::Search {
            analyzer: analyzer.into(),
            highlights: false,
        };
        self
    }

    /// Builder: vector index
    pub fn vector(
        mut self,
        algorithm: VectorAlgorithm,
        dimension: u32,
        distance: DistanceMetric,
    ) -> Self {
        self.kind = IndexKind::Vector {
            algorithm,
            dimension,
            distance,
        };
        self
    }
}
