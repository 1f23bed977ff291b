use std::cmp::Ordering;

use bigdecimal::BigDecimal;

use crate::classify::ClassifyError;

/// Unnormalized per-class scores of one classification, in class-name order.
///
/// Values are comparable across classes of the same run but do not sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scores {
    entries: Vec<(String, BigDecimal)>,
}

impl Scores {
    pub fn get(&self, class: &str) -> Option<&BigDecimal> {
        self.entries
            .iter()
            .find(|(name, _)| name == class)
            .map(|(_, score)| score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BigDecimal)> {
        self.entries.iter().map(|(name, score)| (name.as_str(), score))
    }

    /// Classes by descending score; equal scores by ascending name.
    pub fn ranked(&self) -> Vec<(&str, &BigDecimal)> {
        let mut ranked: Vec<(&str, &BigDecimal)> = self.iter().collect();
        ranked.sort_by(|a, b| match b.1.cmp(a.1) {
            Ordering::Equal => a.0.cmp(b.0),
            other => other,
        });
        ranked
    }

    /// The class with the strictly highest score. On a tie the class that
    /// comes first keeps the lead.
    pub fn best(&self) -> Result<&str, ClassifyError> {
        let mut entries = self.entries.iter();
        let (mut best, mut best_score) = match entries.next() {
            Some((name, score)) => (name, score),
            None => return Err(ClassifyError::EmptyResult),
        };
        for (name, score) in entries {
            if score > best_score {
                best = name;
                best_score = score;
            }
        }
        Ok(best.as_str())
    }

    pub fn into_inner(self) -> Vec<(String, BigDecimal)> {
        self.entries
    }
}

impl FromIterator<(String, BigDecimal)> for Scores {
    fn from_iter<I: IntoIterator<Item = (String, BigDecimal)>>(iter: I) -> Self {
        Scores {
            entries: iter.into_iter().collect(),
        }
    }
}
