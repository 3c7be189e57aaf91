//! Categorical color mapping for the grouping field.

use crate::models::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Plain 8-bit RGB color, independent of any drawing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb` form.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Twenty-color categorical palette: ten hues, each followed by its light tint.
pub const CATEGORY20: [Rgb; 20] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xae, 0xc7, 0xe8),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0xff, 0xbb, 0x78),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0x98, 0xdf, 0x8a),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0xff, 0x98, 0x96),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0xc5, 0xb0, 0xd5),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xc4, 0x9c, 0x94),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0xf7, 0xb6, 0xd2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xc7, 0xc7, 0xc7),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0xdb, 0xdb, 0x8d),
    Rgb(0x17, 0xbe, 0xcf),
    Rgb(0x9e, 0xda, 0xe5),
];

/// Color for keys that were not seen when the scale was built.
pub const UNKNOWN_GROUP_COLOR: Rgb = Rgb(0x7f, 0x7f, 0x7f);

/// Ordinal map from group key to palette color.
///
/// Built once per dataset from the first-seen order of keys; colors cycle when
/// there are more keys than palette entries. Never rebuilt on re-render, so a
/// group keeps its color whatever fields are plotted.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    domain: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColorScale {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut domain = Vec::new();
        let mut index = HashMap::new();
        for k in keys {
            let k = k.into();
            if !index.contains_key(&k) {
                index.insert(k.clone(), domain.len());
                domain.push(k);
            }
        }
        Self { domain, index }
    }

    pub fn from_records(records: &[Record]) -> Self {
        Self::new(records.iter().map(|r| r.state.as_str()))
    }

    /// Keys in first-seen order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn get(&self, key: &str) -> Option<Rgb> {
        self.index
            .get(key)
            .map(|i| CATEGORY20[i % CATEGORY20.len()])
    }

    pub fn color(&self, key: &str) -> Rgb {
        self.get(key).unwrap_or(UNKNOWN_GROUP_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_order_drives_colors() {
        let cs = ColorScale::new(["Goa", "Assam", "Goa", "Bihar"]);
        assert_eq!(cs.domain(), ["Goa", "Assam", "Bihar"]);
        assert_eq!(cs.color("Goa").hex(), "#1f77b4");
        assert_eq!(cs.color("Assam").hex(), "#aec7e8");
        assert_eq!(cs.color("Bihar").hex(), "#ff7f0e");
        assert_eq!(cs.get("Kerala"), None);
        assert_eq!(cs.color("Kerala"), UNKNOWN_GROUP_COLOR);
    }

    #[test]
    fn palette_cycles_after_twenty() {
        let keys: Vec<String> = (0..22).map(|i| format!("S{i}")).collect();
        let cs = ColorScale::new(keys);
        assert_eq!(cs.color("S20"), cs.color("S0"));
        assert_eq!(cs.color("S21"), cs.color("S1"));
    }
}
