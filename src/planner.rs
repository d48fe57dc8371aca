//! Order-level estimation: packs each material's pieces and matches the used
//! roll length against stock.
//!
//! Articles are planned independently. A fatal packing error for one article
//! is recorded for that article only; the order is satisfied only when every
//! article has a batch (or needs none).

use serde::Serialize;

use crate::config::units_to_meters;
use crate::error::{LayoutError, Result};
use crate::inventory::StockSnapshot;
use crate::queue::{MaterialRequirement, PieceQueue, build_queues};
use crate::render::LayoutRenderer;
use crate::selector::select_batch;
use crate::shelf::{Layout, ShelfPacker};
use crate::types::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "batch_number", rename_all = "snake_case")]
pub enum Allocation {
    Batch(u32),
    /// Nothing to cut.
    NotNeeded,
    /// No batch is long enough.
    Unavailable,
}

impl Allocation {
    pub fn is_satisfied(&self) -> bool {
        !matches!(self, Allocation::Unavailable)
    }

    pub fn batch_number(&self) -> Option<u32> {
        match self {
            Allocation::Batch(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackingResult {
    pub article: Article,
    pub allocation: Allocation,
    /// Used roll length in meters.
    pub used_length: f64,
    pub layout: Layout,
    pub map: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ArticleOutcome {
    Packed(PackingResult),
    Failed { article: Article, error: LayoutError },
}

impl ArticleOutcome {
    pub fn article(&self) -> Article {
        match self {
            ArticleOutcome::Packed(result) => result.article,
            ArticleOutcome::Failed { article, .. } => *article,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        match self {
            ArticleOutcome::Packed(result) => result.allocation.is_satisfied(),
            ArticleOutcome::Failed { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderPlan {
    pub outcomes: Vec<ArticleOutcome>,
}

impl OrderPlan {
    pub fn is_satisfied(&self) -> bool {
        self.outcomes.iter().all(ArticleOutcome::is_satisfied)
    }

    pub fn failing_articles(&self) -> Vec<Article> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_satisfied())
            .map(ArticleOutcome::article)
            .collect()
    }

    /// The first fatal error, else `InsufficientStock` naming every short article.
    pub fn ensure_satisfied(&self) -> Result<()> {
        if let Some(error) = self.outcomes.iter().find_map(|o| match o {
            ArticleOutcome::Failed { error, .. } => Some(error.clone()),
            ArticleOutcome::Packed(_) => None,
        }) {
            return Err(error);
        }
        let articles = self.failing_articles();
        if articles.is_empty() {
            Ok(())
        } else {
            Err(LayoutError::InsufficientStock { articles })
        }
    }

    /// `(article, batch_number, length)` cuts the inventory has to book.
    pub fn decommissions(&self) -> Vec<(Article, u32, f64)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ArticleOutcome::Packed(result) => result
                    .allocation
                    .batch_number()
                    .map(|n| (result.article, n, result.used_length)),
                ArticleOutcome::Failed { .. } => None,
            })
            .collect()
    }
}

pub struct LayoutPlanner<'a> {
    stock: &'a StockSnapshot,
    renderer: Option<&'a dyn LayoutRenderer>,
}

impl<'a> LayoutPlanner<'a> {
    pub fn new(stock: &'a StockSnapshot) -> Self {
        Self {
            stock,
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: &'a dyn LayoutRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn plan(&self, requirements: &[MaterialRequirement]) -> OrderPlan {
        let outcomes = build_queues(requirements)
            .into_iter()
            .map(|(article, queue)| match self.plan_article(article, queue) {
                Ok(result) => ArticleOutcome::Packed(result),
                Err(error) => {
                    tracing::warn!(article, %error, "packing failed");
                    ArticleOutcome::Failed { article, error }
                }
            })
            .collect();
        let plan = OrderPlan { outcomes };
        if !plan.is_satisfied() {
            tracing::warn!(failing = ?plan.failing_articles(), "order cannot be cut from stock");
        }
        plan
    }

    fn plan_article(&self, article: Article, queue: PieceQueue) -> Result<PackingResult> {
        let material = self
            .stock
            .material(article)
            .ok_or(LayoutError::UnknownArticle { article })?;
        let pieces = queue.len();
        let layout = ShelfPacker::new(material.roll_width).pack(queue)?;
        let used_length = units_to_meters(layout.height);

        let allocation = if pieces == 0 {
            Allocation::NotNeeded
        } else {
            match select_batch(&material.batches, used_length) {
                Some(batch) => Allocation::Batch(batch.batch_number),
                None => Allocation::Unavailable,
            }
        };

        tracing::info!(
            article,
            pieces,
            used_length,
            waste_percent = layout.waste_percent(),
            batch = ?allocation.batch_number(),
            "article packed"
        );

        let map = self.renderer.and_then(|r| r.render(article, &layout));
        Ok(PackingResult {
            article,
            allocation,
            used_length,
            layout,
            map,
        })
    }
}
