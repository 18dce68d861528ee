//! Target label encoding for the classifier.

use serde::{Deserialize, Serialize};

use crate::transform::CodeMap;
use crate::EncodeError;

/// Maps collapsed category labels to contiguous class ids and back.
///
/// Fitted once over the post-collapse training labels; `encode` and
/// `decode` round-trip exactly for every fitted label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEncoder {
    classes: CodeMap,
}

impl TargetEncoder {
    /// Fits the class vocabulary over the training labels.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::EmptyFit`] when no labels are observed.
    pub fn fit<I, S>(labels: I) -> Result<Self, EncodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            classes: CodeMap::fit("crime_type", labels)?,
        })
    }

    /// Maps a label to its class id.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnseenValue`] for labels outside the fitted
    /// vocabulary.
    pub fn encode(&self, label: &str) -> Result<usize, EncodeError> {
        self.classes.encode(label)
    }

    /// Maps every label in `labels` to its class id.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnseenValue`] on the first unknown label.
    pub fn encode_all<I, S>(&self, labels: I) -> Result<Vec<usize>, EncodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(|label| self.encode(label.as_ref()))
            .collect()
    }

    /// Maps a predicted class id back to its label.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnknownClassId`] when the id is out of
    /// range.
    pub fn decode(&self, class_id: usize) -> Result<&str, EncodeError> {
        self.classes.decode(class_id)
    }

    /// Number of fitted classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// The fitted labels in class-id order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        self.classes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_every_label() {
        let encoder = TargetEncoder::fit(["Burglary", "Theft", "Other", "Theft"]).unwrap();
        assert_eq!(encoder.n_classes(), 3);

        for label in ["Burglary", "Theft", "Other"] {
            let id = encoder.encode(label).unwrap();
            assert_eq!(encoder.decode(id).unwrap(), label);
        }
    }

    #[test]
    fn decoded_labels_stay_inside_vocabulary() {
        let encoder = TargetEncoder::fit(["Burglary", "Theft", "Other"]).unwrap();
        for id in 0..encoder.n_classes() {
            let label = encoder.decode(id).unwrap();
            assert!(["Burglary", "Theft", "Other"].contains(&label));
            assert_ne!(label, "Vandalism");
        }
    }

    #[test]
    fn out_of_range_class_id_is_rejected() {
        let encoder = TargetEncoder::fit(["Burglary", "Theft"]).unwrap();
        assert!(matches!(
            encoder.decode(5),
            Err(EncodeError::UnknownClassId {
                class_id: 5,
                n_classes: 2,
            })
        ));
    }

    #[test]
    fn encode_all_preserves_order() {
        let encoder = TargetEncoder::fit(["Burglary", "Theft", "Other"]).unwrap();
        let ids = encoder.encode_all(["Theft", "Burglary"]).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(encoder.decode(ids[0]).unwrap(), "Theft");
        assert_eq!(encoder.decode(ids[1]).unwrap(), "Burglary");
    }
}
