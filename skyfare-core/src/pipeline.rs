//! Prediction pipeline abstraction and the persisted pipeline representation
//!
//! The resolver hands out `Arc<dyn PredictionPipeline>`. The concrete
//! [`Pipeline`] mirrors a fitted "column transformer → regressor" chain:
//! a named `transform` step that one-hot encodes the categorical columns
//! (and scales or passes through the numeric ones), followed by a `model`
//! step holding the fitted regressor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the step holding the fitted column transformer
pub const TRANSFORM_STEP: &str = "transform";

/// Errors raised by a pipeline while predicting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' has the wrong type (expected {expected})")]
    WrongType { column: String, expected: &'static str },

    #[error("unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("feature count mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("malformed pipeline: {0}")]
    Malformed(String),
}

/// Errors raised while reading fitted structure back out of a pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntrospectionError {
    #[error("pipeline does not expose its internal structure")]
    Unsupported,

    #[error("step '{0}' not found")]
    StepMissing(String),

    #[error("unexpected pipeline structure: {0}")]
    UnexpectedStructure(String),
}

/// One value in a feature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Text(String),
}

impl FeatureValue {
    fn as_category_key(&self) -> String {
        match self {
            FeatureValue::Integer(v) => v.to_string(),
            FeatureValue::Text(s) => s.clone(),
        }
    }
}

/// Ordered, named one-row record handed to [`PredictionPipeline::predict`]
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureRecord {
    columns: Vec<(String, FeatureValue)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, keeping insertion order
    pub fn push(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.columns.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Column names in record order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn numeric(&self, name: &str) -> Result<f64, PipelineError> {
        match self.get(name) {
            Some(FeatureValue::Integer(v)) => Ok(*v as f64),
            Some(FeatureValue::Text(_)) => Err(PipelineError::WrongType {
                column: name.to_string(),
                expected: "integer",
            }),
            None => Err(PipelineError::MissingColumn(name.to_string())),
        }
    }
}

/// A fitted category as stored by the encoder
///
/// Encoders fitted on raw tabular data can carry nulls and non-string values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
}

impl CategoryValue {
    /// Display form, or `None` for null/NaN entries
    pub fn display(&self) -> Option<String> {
        match self {
            CategoryValue::Null => None,
            CategoryValue::Text(s) => Some(s.clone()),
            CategoryValue::Integer(v) => Some(v.to_string()),
            CategoryValue::Float(v) if v.is_nan() => None,
            CategoryValue::Float(v) => Some(format!("{:?}", v)),
        }
    }
}

/// Short description of a loaded pipeline for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub steps: Vec<String>,
    pub estimator: String,
}

/// Fitted prediction unit
///
/// Implementations must be safe to share across threads: prediction is a
/// read-only computation over fitted state.
pub trait PredictionPipeline: Send + Sync {
    /// Predict one value per record
    fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, PipelineError>;

    /// Fitted category lists of the categorical encoder, in column order
    fn encoder_categories(&self) -> Result<Vec<Vec<CategoryValue>>, IntrospectionError> {
        Err(IntrospectionError::Unsupported)
    }

    fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            steps: Vec::new(),
            estimator: "opaque".to_string(),
        }
    }
}

/// Persisted pipeline: ordered named steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ColumnTransformer(ColumnTransformer),
    Regressor(Regressor),
}

/// Applies per-column transformers and concatenates their outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub transformers: Vec<ColumnTransform>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransform {
    pub name: String,
    pub transformer: Transformer,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transformer {
    OneHot(OneHotEncoder),
    StandardScaler { mean: Vec<f64>, scale: Vec<f64> },
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    Error,
    Ignore,
}

/// One-hot encoder with one fitted category list per input column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub categories: Vec<Vec<CategoryValue>>,
    pub handle_unknown: HandleUnknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regressor {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// Mean of regression trees (random forest style)
    TreeEnsemble { trees: Vec<RegressionTree> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl OneHotEncoder {
    fn encode(
        &self,
        columns: &[String],
        record: &FeatureRecord,
        out: &mut Vec<f64>,
    ) -> Result<(), PipelineError> {
        if self.categories.len() != columns.len() {
            return Err(PipelineError::Malformed(format!(
                "encoder has {} category lists for {} columns",
                self.categories.len(),
                columns.len()
            )));
        }

        for (column, categories) in columns.iter().zip(&self.categories) {
            let value = record
                .get(column)
                .ok_or_else(|| PipelineError::MissingColumn(column.clone()))?
                .as_category_key();

            let position = categories
                .iter()
                .position(|c| c.display().as_deref() == Some(value.as_str()));

            if position.is_none() && self.handle_unknown == HandleUnknown::Error {
                return Err(PipelineError::UnknownCategory {
                    column: column.clone(),
                    value,
                });
            }

            out.extend((0..categories.len()).map(|i| if Some(i) == position { 1.0 } else { 0.0 }));
        }
        Ok(())
    }
}

impl ColumnTransformer {
    /// Transform one record into the regressor's feature vector
    pub fn transform(&self, record: &FeatureRecord) -> Result<Vec<f64>, PipelineError> {
        let mut out = Vec::new();
        for ct in &self.transformers {
            match &ct.transformer {
                Transformer::OneHot(encoder) => encoder.encode(&ct.columns, record, &mut out)?,
                Transformer::StandardScaler { mean, scale } => {
                    if mean.len() != ct.columns.len() || scale.len() != ct.columns.len() {
                        return Err(PipelineError::Malformed(format!(
                            "scaler '{}' fitted on {} columns, configured for {}",
                            ct.name,
                            mean.len(),
                            ct.columns.len()
                        )));
                    }
                    for (i, column) in ct.columns.iter().enumerate() {
                        let x = record.numeric(column)?;
                        // Constant columns are fitted with zero scale
                        let s = if scale[i] == 0.0 { 1.0 } else { scale[i] };
                        out.push((x - mean[i]) / s);
                    }
                }
                Transformer::Passthrough => {
                    for column in &ct.columns {
                        out.push(record.numeric(column)?);
                    }
                }
            }
        }
        Ok(out)
    }
}

impl RegressionTree {
    fn predict_row(&self, x: &[f64]) -> Result<f64, PipelineError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer hops than it has nodes
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x.get(*feature).ok_or(PipelineError::ShapeMismatch {
                        expected: feature + 1,
                        actual: x.len(),
                    })?;
                    index = if *v <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(PipelineError::Malformed(format!(
                        "tree node {} out of range",
                        index
                    )))
                }
            }
        }
        Err(PipelineError::Malformed("tree contains a cycle".to_string()))
    }
}

impl Regressor {
    pub fn predict_row(&self, x: &[f64]) -> Result<f64, PipelineError> {
        match self {
            Regressor::Linear {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != x.len() {
                    return Err(PipelineError::ShapeMismatch {
                        expected: coefficients.len(),
                        actual: x.len(),
                    });
                }
                Ok(intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>())
            }
            Regressor::TreeEnsemble { trees } => {
                if trees.is_empty() {
                    return Err(PipelineError::Malformed("empty tree ensemble".to_string()));
                }
                let mut total = 0.0;
                for tree in trees {
                    total += tree.predict_row(x)?;
                }
                Ok(total / trees.len() as f64)
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Regressor::Linear { .. } => "linear",
            Regressor::TreeEnsemble { .. } => "tree_ensemble",
        }
    }
}

impl Pipeline {
    /// Check the step layout: an optional column transformer, then a final regressor
    pub fn validate(&self) -> Result<(), PipelineError> {
        match self.steps.last() {
            Some(Step {
                stage: Stage::Regressor(_),
                ..
            }) => {}
            Some(step) => {
                return Err(PipelineError::Malformed(format!(
                    "final step '{}' is not a regressor",
                    step.name
                )))
            }
            None => return Err(PipelineError::Malformed("pipeline has no steps".to_string())),
        }

        let transformers = self
            .steps
            .iter()
            .filter(|s| matches!(s.stage, Stage::ColumnTransformer(_)))
            .count();
        if transformers > 1 || self.steps.len() > transformers + 1 {
            return Err(PipelineError::Malformed(
                "expected at most one column transformer before the regressor".to_string(),
            ));
        }
        Ok(())
    }

    fn column_transformer(&self) -> Option<&ColumnTransformer> {
        self.steps.iter().find_map(|s| match &s.stage {
            Stage::ColumnTransformer(ct) => Some(ct),
            Stage::Regressor(_) => None,
        })
    }

    fn regressor(&self) -> Result<&Regressor, PipelineError> {
        match self.steps.last().map(|s| &s.stage) {
            Some(Stage::Regressor(r)) => Ok(r),
            _ => Err(PipelineError::Malformed("final step is not a regressor".to_string())),
        }
    }

    fn predict_one(&self, record: &FeatureRecord) -> Result<f64, PipelineError> {
        let features = match self.column_transformer() {
            Some(ct) => ct.transform(record)?,
            None => {
                let mut features = Vec::with_capacity(record.len());
                for name in record.names() {
                    features.push(record.numeric(name)?);
                }
                features
            }
        };
        self.regressor()?.predict_row(&features)
    }
}

impl PredictionPipeline for Pipeline {
    fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<f64>, PipelineError> {
        batch.iter().map(|r| self.predict_one(r)).collect()
    }

    fn encoder_categories(&self) -> Result<Vec<Vec<CategoryValue>>, IntrospectionError> {
        let step = self
            .steps
            .iter()
            .find(|s| s.name == TRANSFORM_STEP)
            .ok_or_else(|| IntrospectionError::StepMissing(TRANSFORM_STEP.to_string()))?;

        let ct = match &step.stage {
            Stage::ColumnTransformer(ct) => ct,
            Stage::Regressor(_) => {
                return Err(IntrospectionError::UnexpectedStructure(format!(
                    "step '{}' is a regressor",
                    TRANSFORM_STEP
                )))
            }
        };

        match ct.transformers.first().map(|t| &t.transformer) {
            Some(Transformer::OneHot(encoder)) => Ok(encoder.categories.clone()),
            Some(_) => Err(IntrospectionError::UnexpectedStructure(
                "first transformer is not a one-hot encoder".to_string(),
            )),
            None => Err(IntrospectionError::UnexpectedStructure(
                "column transformer has no transformers".to_string(),
            )),
        }
    }

    fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            steps: self.steps.iter().map(|s| s.name.clone()).collect(),
            estimator: self
                .regressor()
                .map(|r| r.kind().to_string())
                .unwrap_or_else(|_| "unknown".to_string()),
        }
    }
}
