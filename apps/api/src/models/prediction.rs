use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use thiserror::Error;
use tracing::warn;

/// Stored row in the `results` table, written by the inference proxy.
#[derive(Debug, Clone, FromRow)]
pub struct PredictionRow {
    pub prediction_id: String,
    pub user_id: String,
    pub user_snapshot: Option<Json<UserSnapshot>>,
    pub kind: String,
    pub prediction: String,
    pub confidence: f64,
    pub model_metrics: Option<Json<ModelMetrics>>,
    pub gradcam: Option<String>,
    pub input_data: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("unknown analysis type '{0}'")]
    UnknownKind(String),

    #[error("unknown prediction '{0}'")]
    UnknownPrediction(String),

    #[error("confidence {0} outside 0..=100")]
    ConfidenceOutOfRange(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Benign,
    Malignant,
}

impl Prediction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Benign => "benign",
            Prediction::Malignant => "malignant",
        }
    }
}

impl FromStr for Prediction {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "benign" => Ok(Prediction::Benign),
            "malignant" => Ok(Prediction::Malignant),
            other => Err(RecordError::UnknownPrediction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Tabular,
    Image,
}

/// Model performance figures as reported by the inference backend.
/// Any of them may be missing on older records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    pub version: Option<String>,
}

/// Owner details copied onto the record when it was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}

impl UserSnapshot {
    /// Name printed on the report and used in the download filename.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Patient")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageAnalysis {
    /// Base64 Grad-CAM heatmap, raw or as a `data:` URL.
    pub gradcam: Option<String>,
    pub input: Value,
}

impl ImageAnalysis {
    pub fn source_file(&self) -> Option<&str> {
        self.input.get("fileName").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularAnalysis {
    pub input: Value,
}

impl TabularAnalysis {
    pub fn feature_count(&self) -> usize {
        self.input.as_object().map(|m| m.len()).unwrap_or(0)
    }
}

/// Record shape. Image-only data lives only on the `Image` variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Image(ImageAnalysis),
    Tabular(TabularAnalysis),
}

impl Analysis {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Analysis::Image(_) => AnalysisKind::Image,
            Analysis::Tabular(_) => AnalysisKind::Tabular,
        }
    }
}

/// A validated prediction record. Read-only for the lifetime of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub id: String,
    pub prediction: Prediction,
    /// Percentage, always within 0..=100.
    pub confidence: f64,
    pub metrics: ModelMetrics,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub owner: UserSnapshot,
    pub analysis: Analysis,
}

impl PredictionRecord {
    pub fn kind(&self) -> AnalysisKind {
        self.analysis.kind()
    }
}

impl TryFrom<PredictionRow> for PredictionRecord {
    type Error = RecordError;

    fn try_from(row: PredictionRow) -> Result<Self, Self::Error> {
        let prediction: Prediction = row.prediction.parse()?;

        if !(0.0..=100.0).contains(&row.confidence) {
            return Err(RecordError::ConfidenceOutOfRange(row.confidence));
        }

        let input = row.input_data.unwrap_or(Value::Null);
        let analysis = match row.kind.trim().to_ascii_lowercase().as_str() {
            "image" => Analysis::Image(ImageAnalysis {
                gradcam: row.gradcam.filter(|g| !g.trim().is_empty()),
                input,
            }),
            "tabular" => {
                if row.gradcam.is_some() {
                    warn!(
                        prediction_id = %row.prediction_id,
                        "Tabular record carries a gradcam payload; ignoring it"
                    );
                }
                Analysis::Tabular(TabularAnalysis { input })
            }
            other => return Err(RecordError::UnknownKind(other.to_string())),
        };

        Ok(PredictionRecord {
            id: row.prediction_id,
            prediction,
            confidence: row.confidence,
            metrics: row.model_metrics.map(|m| m.0).unwrap_or_default(),
            timestamp: row.timestamp,
            user_id: row.user_id,
            owner: row.user_snapshot.map(|u| u.0).unwrap_or_default(),
            analysis,
        })
    }
}
