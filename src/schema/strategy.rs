//! Strategy (genome) data model.
//!
//! A strategy is an ordered sequence of genes, each pairing a sensor action
//! with the condition that terminates it. Genes are stored in a length-bearing
//! vector rather than a terminator-delimited byte buffer, so the structural
//! invariants (gene count >= 1, even elementary-code length, bounded length)
//! are maintained by construction instead of by sentinel bookkeeping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sensor actions a gene can request.
///
/// Wire codes start at 1; code 0 is reserved and never encodes a valid action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateLeft,
    RotateRight,
    SkipLeft,
    SkipRight,
}

impl Action {
    /// Number of action variants.
    pub const COUNT: u32 = 6;

    const ALL: [Action; 6] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::RotateLeft,
        Action::RotateRight,
        Action::SkipLeft,
        Action::SkipRight,
    ];

    /// Canonical wire code (1-based; 0 is reserved).
    pub fn code(self) -> u8 {
        match self {
            Action::MoveLeft => 1,
            Action::MoveRight => 2,
            Action::RotateLeft => 3,
            Action::RotateRight => 4,
            Action::SkipLeft => 5,
            Action::SkipRight => 6,
        }
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Option<Action> {
        Action::ALL.get(code.checked_sub(1)? as usize).copied()
    }

    /// Variant for a uniform draw in `[0, COUNT)`.
    pub fn from_index(index: u32) -> Action {
        Action::ALL[(index % Action::COUNT) as usize]
    }
}

/// Conditions that terminate a stepping action.
///
/// Wire codes start at 1; code 0 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Stop once no object is in the line of sight.
    NonObject,
    /// Stop once an object is in the line of sight.
    Object,
}

impl Condition {
    /// Number of condition variants.
    pub const COUNT: u32 = 2;

    /// Canonical wire code (1-based; 0 is reserved).
    pub fn code(self) -> u8 {
        match self {
            Condition::NonObject => 1,
            Condition::Object => 2,
        }
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Option<Condition> {
        match code {
            1 => Some(Condition::NonObject),
            2 => Some(Condition::Object),
            _ => None,
        }
    }

    /// Variant for a uniform draw in `[0, COUNT)`.
    pub fn from_index(index: u32) -> Condition {
        match index % Condition::COUNT {
            0 => Condition::NonObject,
            _ => Condition::Object,
        }
    }
}

/// One (action, condition) pair, the atomic editable unit of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    pub action: Action,
    pub condition: Condition,
}

/// An evolvable control strategy: a non-empty, bounded sequence of genes.
///
/// The elementary-code view used by the genetic operators addresses the
/// sequence as alternating action/condition slots: locus `2k` is gene `k`'s
/// action, `2k + 1` its condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    genes: Vec<Gene>,
}

impl Genome {
    /// Wrap a gene sequence. Callers keep the gene count >= 1.
    pub fn new(genes: Vec<Gene>) -> Self {
        debug_assert!(!genes.is_empty());
        Self { genes }
    }

    /// Number of genes.
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    /// Length in elementary codes (always even).
    pub fn code_len(&self) -> usize {
        self.genes.len() * 2
    }

    /// Gene at `index`.
    pub fn gene(&self, index: usize) -> Gene {
        self.genes[index]
    }

    /// All genes in order.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Append a gene at the end.
    pub fn push_gene(&mut self, gene: Gene) {
        self.genes.push(gene);
    }

    /// Splice a gene in at `index`, shifting the tail right.
    pub fn insert_gene(&mut self, index: usize, gene: Gene) {
        self.genes.insert(index, gene);
    }

    /// Delete the gene at `index`, shifting the tail left.
    pub fn remove_gene(&mut self, index: usize) {
        self.genes.remove(index);
    }

    /// Overwrite the action slot of gene `index`.
    pub fn set_action(&mut self, index: usize, action: Action) {
        self.genes[index].action = action;
    }

    /// Overwrite the condition slot of gene `index`.
    pub fn set_condition(&mut self, index: usize, condition: Condition) {
        self.genes[index].condition = condition;
    }

    /// Canonical byte encoding: one action code and one condition code per
    /// gene. Used as the population-registry deduplication key.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.code_len());
        for gene in &self.genes {
            out.push(gene.action.code());
            out.push(gene.condition.code());
        }
        out
    }

    /// Decode a canonical byte encoding.
    pub fn decode(codes: &[u8]) -> Option<Genome> {
        if codes.is_empty() || codes.len() % 2 != 0 {
            return None;
        }
        let genes = codes
            .chunks_exact(2)
            .map(|pair| {
                Some(Gene {
                    action: Action::from_code(pair[0])?,
                    condition: Condition::from_code(pair[1])?,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Genome { genes })
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:?}/{:?}", gene.action, gene.condition)?;
        }
        Ok(())
    }
}
