use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TEI predict error: {0}")]
    Tei(String),

    #[error("{model} returned no predictions")]
    EmptyPrediction { model: String },
}
