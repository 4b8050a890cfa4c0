use std::collections::HashMap;

use serde::Deserialize;

use super::PredictionError;

#[derive(Debug, Deserialize)]
pub(crate) struct LabelEncoderFile {
    pub classes: Vec<String>,
}

/// Fitted mapping from category strings to integer codes.
///
/// The code of a class is its position in the exported `classes` list. Lookups
/// are exact: no trimming, case folding or fuzzy matching.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    field: &'static str,
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    pub fn from_classes(field: &'static str, classes: Vec<String>) -> Result<Self, String> {
        if classes.is_empty() {
            return Err(format!("{field} encoder has no classes"));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (index, class) in classes.iter().enumerate() {
            let code = u32::try_from(index).map_err(|_| format!("{field} encoder is too large"))?;
            if codes.insert(class.clone(), code).is_some() {
                return Err(format!("{field} encoder lists '{class}' more than once"));
            }
        }

        Ok(Self {
            field,
            classes,
            codes,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, value: &str) -> Result<u32, PredictionError> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| PredictionError::UnknownCategory {
                field: self.field,
                value: value.to_string(),
            })
    }
}
