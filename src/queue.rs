use serde::{Deserialize, Serialize};

use crate::types::{Article, Demand, Rect};

/// Pieces of one material required by an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub article: Article,
    pub pieces: Vec<Demand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedPiece {
    pub id: usize,
    pub rect: Rect,
}

/// Ordered work list of pieces waiting to be placed.
///
/// Removal takes out exactly one element and keeps the rest in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceQueue {
    pieces: Vec<QueuedPiece>,
}

impl PieceQueue {
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedPiece> {
        self.pieces.iter()
    }

    pub fn pop_front(&mut self) -> Option<QueuedPiece> {
        if self.pieces.is_empty() {
            None
        } else {
            Some(self.pieces.remove(0))
        }
    }

    pub fn position(&self, pred: impl FnMut(&QueuedPiece) -> bool) -> Option<usize> {
        self.pieces.iter().position(pred)
    }

    pub fn remove(&mut self, idx: usize) -> QueuedPiece {
        self.pieces.remove(idx)
    }

    pub fn total_area(&self) -> u64 {
        self.pieces.iter().map(|p| p.rect.area()).sum()
    }
}

/// Expands demands into one oriented entry per unit, largest first.
pub fn build_queue(demands: &[Demand]) -> PieceQueue {
    let mut rects: Vec<Rect> = demands
        .iter()
        .flat_map(|d| std::iter::repeat_n(d.rect.oriented(), d.qty as usize))
        .collect();
    // Stable: equal keys keep input order.
    rects.sort_by(|a, b| {
        b.longer()
            .cmp(&a.longer())
            .then_with(|| b.shorter().cmp(&a.shorter()))
    });

    PieceQueue {
        pieces: rects
            .into_iter()
            .enumerate()
            .map(|(id, rect)| QueuedPiece { id, rect })
            .collect(),
    }
}

/// Groups requirements by article in first-seen order and builds a queue for each.
pub fn build_queues(requirements: &[MaterialRequirement]) -> Vec<(Article, PieceQueue)> {
    let mut grouped: Vec<(Article, Vec<Demand>)> = Vec::new();
    for req in requirements {
        match grouped.iter_mut().find(|(article, _)| *article == req.article) {
            Some((_, demands)) => demands.extend_from_slice(&req.pieces),
            None => grouped.push((req.article, req.pieces.clone())),
        }
    }

    grouped
        .into_iter()
        .map(|(article, demands)| (article, build_queue(&demands)))
        .collect()
}
