#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fitted feature and target encoders.
//!
//! Every encoder here is two-phase: a `fit` that consumes the training
//! subset once and yields an immutable, serializable descriptor, and a
//! pure `transform` that applies the fitted parameters to any record with
//! the same feature schema. Transforms never refit, and a categorical
//! value that was not seen at fit time is an explicit
//! [`EncodeError::UnseenValue`] — never a silently invented code.

pub mod feature;
pub mod target;
pub mod transform;

pub use feature::{Feature, FeatureEncoder, FeatureRow};
pub use target::TargetEncoder;
pub use transform::{CodeMap, FeatureTransform, Standardizer};

/// Errors raised at the encoder boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A categorical value was not observed when the encoder was fitted.
    #[error("value '{value}' for feature '{feature}' was not seen at fit time")]
    UnseenValue {
        /// Feature the value belongs to.
        feature: String,
        /// The offending value.
        value: String,
    },

    /// A predicted class id does not map back to any fitted label.
    #[error("class id {class_id} is out of range for {n_classes} classes")]
    UnknownClassId {
        /// The offending class id.
        class_id: usize,
        /// Number of classes the encoder was fitted with.
        n_classes: usize,
    },

    /// An encoder was fitted on an empty training set.
    #[error("cannot fit '{feature}' on an empty training set")]
    EmptyFit {
        /// Feature that had no observations.
        feature: String,
    },
}
