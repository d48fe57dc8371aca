use serde::{Deserialize, Deserializer, Serialize};

/// Material identifier shared by cloth master data and stock.
pub type Article = u32;

/// Rectangle in roll space. `length` runs along the roll, `width` across it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
}

impl Rect {
    pub fn new(length: u32, width: u32) -> Self {
        Self { length, width }
    }

    pub fn area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            length: self.width,
            width: self.length,
        }
    }

    pub fn longer(&self) -> u32 {
        self.length.max(self.width)
    }

    pub fn shorter(&self) -> u32 {
        self.length.min(self.width)
    }

    /// Same rectangle with the longer side along the roll.
    pub fn oriented(&self) -> Self {
        Self::new(self.longer(), self.shorter())
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0 || self.width == 0
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.length, self.width)
    }
}

/// `qty` identical cuts of `rect` required by an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    pub rect: Rect,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub qty: u32,
}

impl Demand {
    pub fn new(rect: Rect, qty: u32) -> Self {
        Self { rect, qty }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Queue id of the placed piece instance.
    pub piece: usize,
    pub rect: Rect,
    pub x: u32,
    pub y: u32,
    pub rotated: bool,
}

impl Placement {
    pub fn x_end(&self) -> u32 {
        self.x + self.rect.width
    }

    pub fn y_end(&self) -> u32 {
        self.y + self.rect.length
    }

    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.x_end()
            && other.x < self.x_end()
            && self.y < other.y_end()
            && other.y < self.y_end()
    }
}

/// A stocked roll of one material. `length` is the remaining length in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub batch_number: u32,
    pub length: f64,
}

impl Batch {
    pub fn new(batch_number: u32, length: f64) -> Self {
        Self {
            batch_number,
            length,
        }
    }
}

/// Accepts integral JSON numbers written either as `3` or `3.0`.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}
