pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{ReviewClient, REVIEW_PAGE_SIZE};
pub use error::ScraperError;
pub use normalize::{
    decode_review, normalize_date, normalize_rating, raw_review_id, transform_review,
};
pub use types::{RawId, RawImage, RawProductInfo, RawRating, RawReview, RawText};
