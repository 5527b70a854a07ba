//! Schema alignment: raw feature maps in, model-shaped rows out.

mod aligner;
mod request;
mod vector;

pub use aligner::{ReferenceSchema, SchemaAligner};
pub use request::{
    BINARY_COLUMNS, CATEGORICAL_COLUMN, FURNISHING_STATUSES, HouseFeatures, binary_flag,
};
pub use vector::FeatureVector;
