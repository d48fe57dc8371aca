//! In-memory stock snapshot: cloth master data, the batches and leftover
//! patches on hand, and accessory stock.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{LENGTH_EPS, units_to_meters};
use crate::error::{LayoutError, Result};
use crate::order::AccessoryRequirement;
use crate::planner::OrderPlan;
use crate::types::{Article, Batch};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub article: Article,
    /// Roll width in internal units.
    #[serde(deserialize_with = "crate::types::deserialize_u32_from_number")]
    pub roll_width: u32,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub patches: Vec<Patch>,
}

/// Leftover piece of cloth kept for later cuts, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub id: u32,
    pub length: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryStock {
    pub article: Article,
    #[serde(default)]
    pub amount: f64,
}

/// One line of a stock report. Areas are square meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StockItem {
    ClothBatch {
        article: Article,
        batch_number: u32,
        length: f64,
        area: f64,
    },
    ClothPatch {
        article: Article,
        patch_id: u32,
        area: f64,
    },
    Accessory {
        article: Article,
        amount: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockSnapshot {
    materials: BTreeMap<Article, Material>,
    accessories: BTreeMap<Article, f64>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_materials(materials: impl IntoIterator<Item = Material>) -> Result<Self> {
        let mut stock = Self::new();
        for material in materials {
            stock.insert(material)?;
        }
        Ok(stock)
    }

    pub fn add_material(&mut self, article: Article, roll_width: u32) -> Result<()> {
        self.insert(Material {
            article,
            roll_width,
            batches: Vec::new(),
            patches: Vec::new(),
        })
    }

    /// Registers an accessory with its opening amount.
    pub fn add_accessory(&mut self, accessory: AccessoryStock) -> Result<()> {
        if self.accessories.contains_key(&accessory.article) {
            return Err(LayoutError::ArticleAlreadyExists {
                article: accessory.article,
            });
        }
        self.accessories.insert(accessory.article, accessory.amount);
        Ok(())
    }

    fn insert(&mut self, material: Material) -> Result<()> {
        if self.materials.contains_key(&material.article) {
            return Err(LayoutError::ArticleAlreadyExists {
                article: material.article,
            });
        }
        self.materials.insert(material.article, material);
        Ok(())
    }

    pub fn material(&self, article: Article) -> Option<&Material> {
        self.materials.get(&article)
    }

    pub fn accessory(&self, article: Article) -> Option<f64> {
        self.accessories.get(&article).copied()
    }

    /// Registers an incoming roll and returns its batch number.
    pub fn receive(&mut self, article: Article, length: f64) -> Result<u32> {
        let batch_number = self
            .materials
            .values()
            .flat_map(|m| &m.batches)
            .map(|b| b.batch_number)
            .max()
            .map_or(1, |max| max + 1);
        let material = self
            .materials
            .get_mut(&article)
            .ok_or(LayoutError::UnknownArticle { article })?;
        material.batches.push(Batch::new(batch_number, length));
        tracing::info!(article, batch_number, length, "batch received");
        Ok(batch_number)
    }

    /// Cuts `length` meters off a batch. A batch used up completely is removed.
    pub fn decommission(
        &mut self,
        article: Article,
        batch_number: u32,
        length: f64,
    ) -> Result<()> {
        let material = self
            .materials
            .get_mut(&article)
            .ok_or(LayoutError::UnknownArticle { article })?;
        let idx = material
            .batches
            .iter()
            .position(|b| b.batch_number == batch_number)
            .ok_or(LayoutError::InvalidBatch {
                article,
                batch_number,
            })?;

        let batch = &mut material.batches[idx];
        if batch.length + LENGTH_EPS < length {
            return Err(LayoutError::InsufficientLength {
                article,
                batch_number,
                available: batch.length,
                requested: length,
            });
        }
        batch.length -= length;
        if batch.length.abs() < LENGTH_EPS {
            material.batches.remove(idx);
        }
        tracing::info!(article, batch_number, length, "batch decommissioned");
        Ok(())
    }

    /// Files a leftover patch under a cloth article and returns its id.
    pub fn add_patch(&mut self, article: Article, length: f64, width: f64) -> Result<u32> {
        let id = self
            .materials
            .values()
            .flat_map(|m| &m.patches)
            .map(|p| p.id)
            .max()
            .map_or(1, |max| max + 1);
        let material = self
            .materials
            .get_mut(&article)
            .ok_or(LayoutError::UnknownArticle { article })?;
        material.patches.push(Patch { id, length, width });
        tracing::info!(article, patch_id = id, area = length * width, "patch added");
        Ok(id)
    }

    /// Adds an arrival to an accessory and returns the new amount.
    pub fn receive_accessory(&mut self, article: Article, amount: f64) -> Result<f64> {
        let stock = self
            .accessories
            .get_mut(&article)
            .ok_or(LayoutError::UnknownAccessory { article })?;
        *stock += amount;
        tracing::info!(article, amount, total = *stock, "accessory received");
        Ok(*stock)
    }

    /// Takes `quantity` off an accessory. An exhausted accessory stays
    /// registered with a zero amount.
    pub fn decommission_accessory(&mut self, article: Article, quantity: f64) -> Result<()> {
        let stock = self
            .accessories
            .get_mut(&article)
            .ok_or(LayoutError::UnknownAccessory { article })?;
        if *stock + LENGTH_EPS < quantity {
            return Err(LayoutError::InsufficientAccessory {
                article,
                available: *stock,
                requested: quantity,
            });
        }
        *stock -= quantity;
        if *stock <= LENGTH_EPS {
            *stock = 0.0;
        }
        tracing::info!(article, quantity, "accessory decommissioned");
        Ok(())
    }

    /// Accessories an order needs more of than is on hand, including ones
    /// never registered.
    pub fn accessory_shortages(&self, requirements: &[AccessoryRequirement]) -> Vec<Article> {
        requirements
            .iter()
            .filter(|r| {
                self.accessory(r.article)
                    .is_none_or(|amount| amount + LENGTH_EPS < r.quantity as f64)
            })
            .map(|r| r.article)
            .collect()
    }

    /// Decommissions every accessory the order needs, all or nothing.
    pub fn apply_accessories(&mut self, requirements: &[AccessoryRequirement]) -> Result<()> {
        let mut next = self.clone();
        for r in requirements {
            next.decommission_accessory(r.article, r.quantity as f64)?;
        }
        *self = next;
        Ok(())
    }

    /// Decommissions every batch the plan allocated. Either all succeed or
    /// the snapshot is left unchanged.
    pub fn apply(&mut self, plan: &OrderPlan) -> Result<()> {
        plan.ensure_satisfied()?;
        let mut next = self.clone();
        for (article, batch_number, length) in plan.decommissions() {
            next.decommission(article, batch_number, length)?;
        }
        *self = next;
        Ok(())
    }

    /// Everything on hand: per cloth its batches then its patches, then
    /// accessories with a non-zero amount.
    pub fn status(&self) -> Vec<StockItem> {
        let cloth = self.materials.values().flat_map(|m| {
            let width = units_to_meters(m.roll_width);
            let batches = m.batches.iter().map(move |b| StockItem::ClothBatch {
                article: m.article,
                batch_number: b.batch_number,
                length: b.length,
                area: b.length * width,
            });
            let patches = m.patches.iter().map(move |p| StockItem::ClothPatch {
                article: m.article,
                patch_id: p.id,
                area: p.length * p.width,
            });
            batches.chain(patches)
        });
        let accessories = self
            .accessories
            .iter()
            .filter(|(_, amount)| **amount > 0.0)
            .map(|(&article, &amount)| StockItem::Accessory { article, amount });
        cloth.chain(accessories).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> StockSnapshot {
        let mut stock = StockSnapshot::new();
        stock.add_material(10, 150).unwrap();
        stock.add_material(20, 140).unwrap();
        stock
    }

    #[test]
    fn test_duplicate_article() {
        let mut stock = stock();
        assert_eq!(
            stock.add_material(10, 90),
            Err(LayoutError::ArticleAlreadyExists { article: 10 })
        );
    }

    #[test]
    fn test_receive_numbers_globally() {
        let mut stock = stock();
        assert_eq!(stock.receive(10, 30.0), Ok(1));
        assert_eq!(stock.receive(20, 25.0), Ok(2));
        assert_eq!(stock.receive(10, 12.5), Ok(3));
        assert_eq!(
            stock.receive(99, 1.0),
            Err(LayoutError::UnknownArticle { article: 99 })
        );
        let numbers: Vec<u32> = stock
            .material(10)
            .unwrap()
            .batches
            .iter()
            .map(|b| b.batch_number)
            .collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn test_decommission() {
        let mut stock = stock();
        let n = stock.receive(10, 5.0).unwrap();
        stock.decommission(10, n, 2.0).unwrap();
        assert_eq!(stock.material(10).unwrap().batches[0].length, 3.0);

        assert!(matches!(
            stock.decommission(10, n, 4.0),
            Err(LayoutError::InsufficientLength { available, .. }) if available == 3.0
        ));
        assert_eq!(
            stock.decommission(10, 42, 1.0),
            Err(LayoutError::InvalidBatch {
                article: 10,
                batch_number: 42
            })
        );

        stock.decommission(10, n, 3.0).unwrap();
        assert!(stock.material(10).unwrap().batches.is_empty());
    }

    fn area(item: &StockItem) -> f64 {
        match item {
            StockItem::ClothBatch { area, .. } | StockItem::ClothPatch { area, .. } => *area,
            StockItem::Accessory { amount, .. } => *amount,
        }
    }

    #[test]
    fn test_status_area() {
        let mut stock = stock();
        stock.receive(10, 4.0).unwrap();
        stock.receive(20, 2.0).unwrap();
        let status = stock.status();
        assert_eq!(status.len(), 2);
        assert!(matches!(status[0], StockItem::ClothBatch { article: 10, .. }));
        assert!((area(&status[0]) - 6.0).abs() < 1e-9);
        assert!((area(&status[1]) - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_status_lists_patches_and_accessories() {
        let mut stock = stock();
        stock.receive(10, 4.0).unwrap();
        assert_eq!(stock.add_patch(10, 0.5, 0.4), Ok(1));
        assert_eq!(stock.add_patch(20, 1.0, 1.2), Ok(2));
        assert_eq!(
            stock.add_patch(99, 1.0, 1.0),
            Err(LayoutError::UnknownArticle { article: 99 })
        );
        stock
            .add_accessory(AccessoryStock {
                article: 7,
                amount: 12.0,
            })
            .unwrap();
        stock
            .add_accessory(AccessoryStock {
                article: 8,
                amount: 0.0,
            })
            .unwrap();

        let status = stock.status();
        assert_eq!(status.len(), 4);
        assert!(matches!(status[0], StockItem::ClothBatch { article: 10, batch_number: 1, .. }));
        assert!(matches!(status[1], StockItem::ClothPatch { article: 10, patch_id: 1, .. }));
        assert!((area(&status[1]) - 0.2).abs() < 1e-9);
        assert!(matches!(status[2], StockItem::ClothPatch { article: 20, patch_id: 2, .. }));
        assert_eq!(
            status[3],
            StockItem::Accessory {
                article: 7,
                amount: 12.0
            }
        );

        let json = serde_json::to_value(&status[1]).unwrap();
        assert_eq!(json["type"], "cloth_patch");
    }

    #[test]
    fn test_decommission_accessory() {
        let mut stock = stock();
        stock
            .add_accessory(AccessoryStock {
                article: 7,
                amount: 5.0,
            })
            .unwrap();
        assert_eq!(stock.receive_accessory(7, 3.0), Ok(8.0));

        stock.decommission_accessory(7, 6.0).unwrap();
        assert_eq!(stock.accessory(7), Some(2.0));
        assert_eq!(
            stock.decommission_accessory(7, 3.0),
            Err(LayoutError::InsufficientAccessory {
                article: 7,
                available: 2.0,
                requested: 3.0
            })
        );
        assert_eq!(
            stock.decommission_accessory(9, 1.0),
            Err(LayoutError::UnknownAccessory { article: 9 })
        );

        stock.decommission_accessory(7, 2.0).unwrap();
        assert_eq!(stock.accessory(7), Some(0.0));
        assert!(stock.status().is_empty());
        assert!(matches!(
            stock.decommission_accessory(7, 1.0),
            Err(LayoutError::InsufficientAccessory { .. })
        ));
    }

    #[test]
    fn test_apply_accessories_all_or_nothing() {
        let mut stock = stock();
        for (article, amount) in [(7, 4.0), (8, 1.0)] {
            stock.add_accessory(AccessoryStock { article, amount }).unwrap();
        }
        let needs = [
            AccessoryRequirement {
                article: 7,
                quantity: 3,
            },
            AccessoryRequirement {
                article: 8,
                quantity: 2,
            },
            AccessoryRequirement {
                article: 9,
                quantity: 1,
            },
        ];
        assert_eq!(stock.accessory_shortages(&needs), vec![8, 9]);

        let before = stock.clone();
        assert!(stock.apply_accessories(&needs).is_err());
        assert_eq!(stock, before);

        assert!(stock.accessory_shortages(&needs[..1]).is_empty());
        stock.apply_accessories(&needs[..1]).unwrap();
        assert_eq!(stock.accessory(7), Some(1.0));
    }
}
