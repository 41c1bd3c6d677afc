use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Geometric computation error: {0}")]
    GeometricComputation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
