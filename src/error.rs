//! Error types for layout estimation and stock bookkeeping.

use thiserror::Error;

use crate::types::{Article, Rect};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("piece {piece} does not fit a roll of width {roll_width} in any orientation")]
    PieceTooLarge { piece: Rect, roll_width: u32 },

    #[error("layout of {height} x {roll_width} exceeds the packing limit")]
    LayoutTooLarge { height: u64, roll_width: u32 },

    #[error("piece {piece} has a zero dimension")]
    InvalidPiece { piece: Rect },

    #[error("no material with article {article}")]
    UnknownArticle { article: Article },

    #[error("article {article} already exists")]
    ArticleAlreadyExists { article: Article },

    #[error("no batch {batch_number} of article {article}")]
    InvalidBatch { article: Article, batch_number: u32 },

    #[error(
        "batch {batch_number} of article {article} has {available} m left, {requested} m requested"
    )]
    InsufficientLength {
        article: Article,
        batch_number: u32,
        available: f64,
        requested: f64,
    },

    #[error("no accessory with article {article}")]
    UnknownAccessory { article: Article },

    #[error("accessory {article} has {available} left, {requested} requested")]
    InsufficientAccessory {
        article: Article,
        available: f64,
        requested: f64,
    },

    #[error("insufficient stock for articles {articles:?}")]
    InsufficientStock { articles: Vec<Article> },
}

impl LayoutError {
    /// Input faults abort a packing run. Stock shortages are business outcomes.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            LayoutError::InsufficientStock { .. }
                | LayoutError::InsufficientLength { .. }
                | LayoutError::InsufficientAccessory { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
