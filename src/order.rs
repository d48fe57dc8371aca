use serde::{Deserialize, Serialize};

use crate::queue::MaterialRequirement;
use crate::types::{Article, Demand, Rect, deserialize_u32_from_number};

/// Product definition: one cut of `width x length` from each listed cloth and
/// one unit of each listed accessory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(default)]
    pub clothes: Vec<Article>,
    #[serde(default)]
    pub accessories: Vec<Article>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryRequirement {
    pub article: Article,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: Product,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub count: u32,
}

/// Cloth pieces needed by an order, per article in first-seen order.
pub fn material_requirements(lines: &[OrderLine]) -> Vec<MaterialRequirement> {
    let mut requirements: Vec<MaterialRequirement> = Vec::new();
    for line in lines.iter().filter(|l| l.count > 0) {
        let demand = Demand::new(Rect::new(line.product.length, line.product.width), line.count);
        for &article in &line.product.clothes {
            match requirements.iter_mut().find(|r| r.article == article) {
                Some(req) => req.pieces.push(demand),
                None => requirements.push(MaterialRequirement {
                    article,
                    pieces: vec![demand],
                }),
            }
        }
    }
    requirements
}

/// Accessory units needed by an order, per article in first-seen order.
pub fn accessory_requirements(lines: &[OrderLine]) -> Vec<AccessoryRequirement> {
    let mut requirements: Vec<AccessoryRequirement> = Vec::new();
    for line in lines.iter().filter(|l| l.count > 0) {
        for &article in &line.product.accessories {
            match requirements.iter_mut().find(|r| r.article == article) {
                Some(req) => req.quantity += line.count,
                None => requirements.push(AccessoryRequirement {
                    article,
                    quantity: line.count,
                }),
            }
        }
    }
    requirements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements_per_cloth() {
        let shirt = Product {
            id: 1,
            width: 60,
            length: 80,
            clothes: vec![5, 9],
            accessories: vec![40],
        };
        let scarf = Product {
            id: 2,
            width: 30,
            length: 150,
            clothes: vec![9],
            accessories: vec![],
        };
        let lines = vec![
            OrderLine { product: shirt, count: 2 },
            OrderLine { product: scarf, count: 3 },
        ];

        let reqs = material_requirements(&lines);
        assert_eq!(
            reqs,
            vec![
                MaterialRequirement {
                    article: 5,
                    pieces: vec![Demand::new(Rect::new(80, 60), 2)],
                },
                MaterialRequirement {
                    article: 9,
                    pieces: vec![
                        Demand::new(Rect::new(80, 60), 2),
                        Demand::new(Rect::new(150, 30), 3),
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_zero_count_and_no_clothes() {
        let lines = vec![
            OrderLine {
                product: Product {
                    id: 1,
                    width: 10,
                    length: 10,
                    clothes: vec![1],
                    accessories: vec![40],
                },
                count: 0,
            },
            OrderLine {
                product: Product {
                    id: 2,
                    width: 10,
                    length: 10,
                    clothes: vec![],
                    accessories: vec![],
                },
                count: 4,
            },
        ];
        assert!(material_requirements(&lines).is_empty());
        assert!(accessory_requirements(&lines).is_empty());
    }

    #[test]
    fn test_accessories_per_unit() {
        let lines: Vec<OrderLine> = serde_json::from_str(
            r#"[
                {"product": {"id": 1, "width": 60, "length": 80, "clothes": [5], "accessories": [40, 41]}, "count": 2},
                {"product": {"id": 2, "width": 30, "length": 150, "accessories": [41]}, "count": 3},
                {"product": {"id": 3, "width": 30, "length": 30}, "count": 1}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            accessory_requirements(&lines),
            vec![
                AccessoryRequirement {
                    article: 40,
                    quantity: 2,
                },
                AccessoryRequirement {
                    article: 41,
                    quantity: 5,
                },
            ]
        );
        assert_eq!(material_requirements(&lines).len(), 1);
    }
}
