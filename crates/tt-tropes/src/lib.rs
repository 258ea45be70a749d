//! Noir trope table with convention and subversion selection.
//!
//! Forty classic noir story elements ship embedded in the crate. Each has a
//! conventional treatment and five subversions; [`TropeTable::generate`]
//! draws story elements and decides per pick whether to play it straight.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use serde::Deserialize;

const NOIR_JSON: &str = include_str!("../data/noir_tropes.json");

/// One entry of the trope table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Trope {
    /// 1-based table number.
    pub number: u32,
    /// Short title.
    pub title: String,
    /// The conventional treatment.
    pub convention: String,
    /// Alternative treatments that upend the convention.
    pub subversions: Vec<String>,
}

/// Whether a pick plays the trope straight or subverts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Implementation {
    /// The conventional treatment.
    Convention,
    /// One of the subversions.
    Subversion,
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Convention => f.write_str("Convention"),
            Self::Subversion => f.write_str("Subversion"),
        }
    }
}

/// A generated story element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TropePick {
    /// Title of the chosen trope.
    pub title: String,
    /// How the trope is used.
    pub implementation: Implementation,
    /// The convention or subversion text.
    pub text: String,
}

/// An ordered table of tropes.
#[derive(Debug, Clone, Default)]
pub struct TropeTable {
    tropes: Vec<Trope>,
}

impl TropeTable {
    /// Parse a table from a JSON array of tropes.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let tropes = serde_json::from_str(json)?;
        Ok(Self { tropes })
    }

    /// The embedded noir table.
    pub fn noir() -> Self {
        Self::from_json(NOIR_JSON).unwrap_or_default()
    }

    /// Number of tropes.
    pub fn len(&self) -> usize {
        self.tropes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.tropes.is_empty()
    }

    /// Look up a trope by its table number.
    pub fn get(&self, number: u32) -> Option<&Trope> {
        self.tropes.iter().find(|t| t.number == number)
    }

    /// All tropes in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Trope> {
        self.tropes.iter()
    }

    /// Draw `count` story elements, tropes chosen with replacement.
    ///
    /// Each pick is a subversion with probability `subversion_rate`
    /// (clamped to `0.0..=1.0`), otherwise the convention. Tropes without
    /// subversions always yield their convention.
    pub fn generate(&self, subversion_rate: f64, count: usize, rng: &mut StdRng) -> Vec<TropePick> {
        if self.tropes.is_empty() {
            return Vec::new();
        }
        let rate = if subversion_rate.is_nan() {
            0.0
        } else {
            subversion_rate.clamp(0.0, 1.0)
        };

        (0..count)
            .map(|_| {
                let trope = &self.tropes[rng.random_range(0..self.tropes.len())];
                let subvert = !trope.subversions.is_empty() && rng.random::<f64>() < rate;
                if subvert {
                    let text = &trope.subversions[rng.random_range(0..trope.subversions.len())];
                    TropePick {
                        title: trope.title.clone(),
                        implementation: Implementation::Subversion,
                        text: text.clone(),
                    }
                } else {
                    TropePick {
                        title: trope.title.clone(),
                        implementation: Implementation::Convention,
                        text: trope.convention.clone(),
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn embedded_table_parses() {
        let table = TropeTable::from_json(NOIR_JSON).unwrap();
        assert_eq!(table.len(), 40);
        for (i, trope) in table.iter().enumerate() {
            assert_eq!(trope.number as usize, i + 1);
            assert_eq!(trope.subversions.len(), 5, "{}", trope.title);
            assert!(!trope.convention.is_empty());
        }
    }

    #[test]
    fn get_by_number() {
        let table = TropeTable::noir();
        assert_eq!(table.get(1).unwrap().title, "The False MacGuffin Reveal");
        assert!(table.get(0).is_none());
        assert!(table.get(41).is_none());
    }

    #[test]
    fn zero_rate_is_all_conventions() {
        let table = TropeTable::noir();
        let picks = table.generate(0.0, 50, &mut rng());
        assert_eq!(picks.len(), 50);
        for pick in &picks {
            assert_eq!(pick.implementation, Implementation::Convention);
            let trope = table.iter().find(|t| t.title == pick.title).unwrap();
            assert_eq!(pick.text, trope.convention);
        }
    }

    #[test]
    fn full_rate_is_all_subversions() {
        let table = TropeTable::noir();
        for pick in table.generate(1.0, 50, &mut rng()) {
            assert_eq!(pick.implementation, Implementation::Subversion);
            let trope = table.iter().find(|t| t.title == pick.title).unwrap();
            assert!(trope.subversions.contains(&pick.text));
        }
    }

    #[test]
    fn rate_is_clamped() {
        let table = TropeTable::noir();
        assert!(
            table
                .generate(7.5, 20, &mut rng())
                .iter()
                .all(|p| p.implementation == Implementation::Subversion)
        );
        assert!(
            table
                .generate(-1.0, 20, &mut rng())
                .iter()
                .all(|p| p.implementation == Implementation::Convention)
        );
    }

    #[test]
    fn same_seed_same_picks() {
        let table = TropeTable::noir();
        assert_eq!(
            table.generate(0.3, 10, &mut rng()),
            table.generate(0.3, 10, &mut rng())
        );
    }

    #[test]
    fn zero_count_and_empty_table() {
        assert!(TropeTable::noir().generate(0.5, 0, &mut rng()).is_empty());
        assert!(TropeTable::default().generate(0.5, 5, &mut rng()).is_empty());
    }

    #[test]
    fn implementation_display() {
        assert_eq!(Implementation::Subversion.to_string(), "Subversion");
    }
}
