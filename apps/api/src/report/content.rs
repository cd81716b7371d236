//! Fixed report copy, selected by prediction and analysis type.

use crate::models::prediction::{Analysis, Prediction};

pub const REPORT_TITLE: &str = "MEDICAL DIAGNOSTIC REPORT";
pub const REPORT_SUBTITLE: &str = "Breast Cancer AI Detection Analysis";
pub const SYSTEM_NAME: &str = "Breast Cancer Detection AI System";

pub fn headline(prediction: Prediction) -> &'static str {
    match prediction {
        Prediction::Malignant => "CANCER SIGNS FOUND",
        Prediction::Benign => "NO CANCER SIGNS FOUND",
    }
}

pub fn interpretation(prediction: Prediction) -> &'static str {
    match prediction {
        Prediction::Benign => {
            "The AI analysis indicates characteristics consistent with benign (non-cancerous) \
             tissue. However, this should not replace professional medical evaluation. Continue \
             with regular screening as recommended by your healthcare provider."
        }
        Prediction::Malignant => {
            "The AI analysis has detected patterns that may indicate malignant (cancerous) \
             tissue. Immediate follow-up with a qualified oncologist is strongly recommended for \
             comprehensive evaluation and treatment planning."
        }
    }
}

pub fn recommendations(prediction: Prediction) -> &'static [&'static str] {
    match prediction {
        Prediction::Benign => &[
            "Continue with regular self-examinations monthly",
            "Schedule annual mammogram screening as per age guidelines",
            "Maintain healthy lifestyle with balanced diet and exercise",
            "Report any changes in breast tissue to your healthcare provider",
            "Keep this report for your medical records",
        ],
        Prediction::Malignant => &[
            "Schedule immediate consultation with an oncologist",
            "Undergo comprehensive diagnostic imaging (mammogram, ultrasound, MRI)",
            "Consider biopsy for definitive diagnosis",
            "Discuss treatment options with your medical team",
            "Seek second opinion from another specialist",
            "Connect with support groups and counseling services",
        ],
    }
}

pub const DISCLAIMER: &str = "This AI-generated report is intended as a screening tool to assist \
    healthcare professionals and should not be used as the sole basis for medical diagnosis or \
    treatment decisions. Always consult with qualified medical professionals for proper \
    diagnosis, treatment planning, and medical care. The AI model's predictions are based on \
    statistical patterns and may not account for individual patient circumstances.";

pub const HEATMAP_LEGEND: &[&str] = &[
    "Red / yellow areas: regions with the strongest influence on the classification.",
    "Blue / dark areas: regions with little or no influence on the classification.",
    "The heatmap explains the model's attention; it is not a lesion boundary.",
];

pub const TABULAR_NOTICE_TITLE: &str = "CLINICAL DATA ANALYSIS";

pub const TABULAR_NOTICE: &str = "This prediction was produced from clinical cell-nucleus \
    measurements rather than an image, so no visual heatmap applies. A gradient-boosted decision \
    tree ensemble (XGBoost) scores ten standardized mean features such as radius, texture, \
    perimeter, area and concavity, and combines the votes of its trees into the reported \
    confidence.";

pub fn analysis_label(analysis: &Analysis) -> &'static str {
    match analysis {
        Analysis::Tabular(_) => "Clinical Data Analysis",
        Analysis::Image(_) => "Medical Imaging Analysis",
    }
}

/// Label/value rows for the technical specification table.
pub fn technical_specifications(analysis: &Analysis) -> Vec<(&'static str, String)> {
    match analysis {
        Analysis::Image(image) => vec![
            ("Model Architecture", "DenseNet-121 convolutional neural network".to_string()),
            ("Input", "Single-channel grayscale image, 224 x 224 px".to_string()),
            (
                "Source File",
                image.source_file().unwrap_or("Not recorded").to_string(),
            ),
            ("Explainability", "Grad-CAM on the final dense block".to_string()),
            ("Output Classes", "Benign / Malignant (softmax)".to_string()),
        ],
        Analysis::Tabular(tabular) => vec![
            ("Model Architecture", "XGBoost gradient-boosted trees".to_string()),
            (
                "Input Features",
                match tabular.feature_count() {
                    0 => "10 mean cell-nucleus measurements".to_string(),
                    n => format!("{n} cell-nucleus measurements"),
                },
            ),
            ("Preprocessing", "Standard scaling (zero mean, unit variance)".to_string()),
            ("Training Data", "Wisconsin Diagnostic Breast Cancer dataset".to_string()),
            ("Output Classes", "Benign / Malignant (probability)".to_string()),
        ],
    }
}
