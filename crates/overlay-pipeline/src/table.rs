//! Category-keyed pipeline table.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, TableError};
use crate::raster::RasterImage;
use crate::stage::{run_stages, Stage};

/// Request parameters and stages for one data category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPipeline {
    /// Extra query parameters sent when downloading files of this category.
    #[serde(default)]
    pub query: BTreeMap<String, String>,

    /// Stages applied in order. Empty means the PNG is re-encoded as is.
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl CategoryPipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            query: BTreeMap::new(),
            stages,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Decode `data`, run the stages and encode the result as PNG.
    pub fn process_png(&self, data: &[u8]) -> Result<Vec<u8>, PipelineError> {
        let image = RasterImage::decode_png(data)?;
        let image = run_stages(&self.stages, image)?;
        image.encode_png()
    }
}

/// Pipelines by category name.
///
/// `Default` is the built-in table; a YAML file replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineTable {
    categories: HashMap<String, CategoryPipeline>,
}

impl PipelineTable {
    pub fn empty() -> Self {
        Self {
            categories: HashMap::new(),
        }
    }

    pub fn get(&self, category: &str) -> Option<&CategoryPipeline> {
        self.categories.get(category)
    }

    pub fn insert(&mut self, category: impl Into<String>, pipeline: CategoryPipeline) {
        self.categories.insert(category.into(), pipeline);
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, TableError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a table from a YAML file.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), categories = table.len(), "Loaded pipeline table");
        Ok(table)
    }
}

impl Default for PipelineTable {
    fn default() -> Self {
        let fade_white = || Stage::ReplaceColor {
            tolerance: 50.0,
            target: [255, 255, 255],
        };
        let blur = || Stage::GaussianBlur { sigma: 1.0 };

        let mut table = Self::empty();
        table.insert(
            "total_precipitation_rate",
            CategoryPipeline::new(vec![fade_white(), blur(), Stage::Resample]),
        );
        table.insert(
            "cloud_amount_total",
            CategoryPipeline::new(vec![fade_white(), Stage::Greyscale, blur(), Stage::Resample])
                .with_query("styleName", "iso_fill_bu_gn_30_100_pc"),
        );
        table.insert("mean_sea_level_pressure", CategoryPipeline::default());
        table.insert("temperature_at_surface", CategoryPipeline::default());
        table
    }
}
