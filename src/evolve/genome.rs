//! Genetic operators over strategies.
//!
//! All randomness flows through [`StrategyRng`], a thin wrapper over a
//! seedable generator, so a run is reproducible from its seed alone. The
//! operators address genomes through the elementary-code view: even loci
//! are action slots, odd loci condition slots.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::schema::{Action, Condition, Gene, Genome};

use super::EvolveError;
use super::registry::{InsertOutcome, PopulationRegistry};

/// Probability threshold splitting mutation from crossbreeding.
pub const PROB_MUT: f32 = 0.5;

/// Seeded random source for genome generation and variation.
pub struct StrategyRng {
    inner: StdRng,
}

impl StrategyRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Raw draw, used modulo a bound for locus and code selection.
    pub fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f32 {
        self.inner.r#gen()
    }

    /// Access the underlying generator for scenario sampling.
    pub fn inner(&mut self) -> &mut StdRng {
        &mut self.inner
    }
}

fn random_gene(rng: &mut StrategyRng) -> Gene {
    Gene {
        action: Action::from_index(rng.next_u32()),
        condition: Condition::from_index(rng.next_u32()),
    }
}

/// Generate a fresh random strategy of `starting_length / 2` genes, with a
/// floor of one gene.
pub fn random_genome(rng: &mut StrategyRng, starting_length: usize) -> Genome {
    let num_genes = (starting_length / 2).max(1);
    Genome::new((0..num_genes).map(|_| random_gene(rng)).collect())
}

/// Mutate `genome` in place.
///
/// The locus is drawn over the full code capacity. A locus beyond the
/// current length appends a random gene when room remains (one trailing
/// slot stays reserved) and is otherwise re-rolled inside the genome.
/// An in-range locus either deletes its gene (even locus, coin flip,
/// never the last remaining gene) or resamples the slot until the value
/// changes.
pub fn mutate(rng: &mut StrategyRng, genome: &mut Genome, code_capacity: usize) {
    let len = genome.code_len();
    let mut locus = rng.next_u32() as usize % code_capacity;

    if locus >= len {
        if len < code_capacity - 3 {
            genome.push_gene(random_gene(rng));
            return;
        }
        locus = rng.next_u32() as usize % len;
    }

    if rng.next_u32() % 2 == 0 && locus % 2 == 0 && genome.gene_count() > 1 {
        genome.remove_gene(locus / 2);
        return;
    }

    if locus % 2 == 0 {
        let current = genome.gene(locus / 2).action;
        let mut next = Action::from_index(rng.next_u32());
        while next == current {
            next = Action::from_index(rng.next_u32());
        }
        genome.set_action(locus / 2, next);
    } else {
        let current = genome.gene(locus / 2).condition;
        let mut next = Condition::from_index(rng.next_u32());
        while next == current {
            next = Condition::from_index(rng.next_u32());
        }
        genome.set_condition(locus / 2, next);
    }
}

/// Crossbreed genetic material from `winner` into `loser` in place.
///
/// A coin flip picks between splicing one whole winner gene into a random
/// position in the loser (possibly appending) and overwriting a single
/// elementary slot with the winner's value at the same locus. A near-full
/// loser always takes the overwrite path. Both code lengths are even, so a
/// locus reduced modulo the loser's length keeps its action/condition
/// parity.
pub fn crossbreed(rng: &mut StrategyRng, winner: &Genome, loser: &mut Genome, code_capacity: usize) {
    let winner_len = winner.code_len();
    let force_copy = loser.code_len() >= code_capacity - 3;

    if !force_copy && rng.next_u32() % 2 == 0 {
        let locus = rng.next_u32() as usize % winner_len;
        let gene = winner.gene(locus / 2);

        let mut dest = rng.next_u32() as usize % loser.code_len();
        if dest % 2 != 0 {
            dest += 1;
        }
        // dest / 2 can equal the gene count, which appends
        loser.insert_gene(dest / 2, gene);
    } else {
        let locus = rng.next_u32() as usize % winner_len;
        let dest = locus % loser.code_len();
        if locus % 2 == 0 {
            loser.set_action(dest / 2, winner.gene(locus / 2).action);
        } else {
            loser.set_condition(dest / 2, winner.gene(locus / 2).condition);
        }
    }
}

/// Vary `loser` until it becomes a strategy the run has never admitted,
/// then record it in the registry.
///
/// Each attempt applies one operator, mutation or crossbreeding with equal
/// probability. Stops with an error when the registry is at capacity or no
/// unseen variant turns up within `retry_limit` attempts.
pub fn mutate_or_breed(
    rng: &mut StrategyRng,
    winner: &Genome,
    loser: &mut Genome,
    registry: &mut PopulationRegistry,
    code_capacity: usize,
    retry_limit: usize,
) -> Result<(), EvolveError> {
    for attempt in 0..retry_limit {
        if rng.uniform() > PROB_MUT {
            mutate(rng, loser, code_capacity);
        } else {
            crossbreed(rng, winner, loser, code_capacity);
        }

        match registry.insert(loser) {
            InsertOutcome::Inserted => {
                debug!("unseen variant found after {} attempts", attempt + 1);
                return Ok(());
            }
            InsertOutcome::AlreadyExists => continue,
            InsertOutcome::CapacityExceeded => {
                return Err(EvolveError::PopulationExhausted(registry.capacity()));
            }
        }
    }
    Err(EvolveError::DedupRetriesExhausted(retry_limit))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::schema::StrategyConfig;

    fn arb_genome(max_genes: usize) -> impl Strategy<Value = Genome> {
        prop::collection::vec((0u32..6, 0u32..2), 1..=max_genes).prop_map(|pairs| {
            Genome::new(
                pairs
                    .into_iter()
                    .map(|(a, c)| Gene {
                        action: Action::from_index(a),
                        condition: Condition::from_index(c),
                    })
                    .collect(),
            )
        })
    }

    #[test]
    fn test_random_genome_has_floor_of_one_gene() {
        let mut rng = StrategyRng::new(1);
        assert_eq!(random_genome(&mut rng, 0).gene_count(), 1);
        assert_eq!(random_genome(&mut rng, 1).gene_count(), 1);
        assert_eq!(random_genome(&mut rng, 8).gene_count(), 4);
    }

    #[test]
    fn test_generation_is_reproducible() {
        let mut a = StrategyRng::new(99);
        let mut b = StrategyRng::new(99);
        assert_eq!(random_genome(&mut a, 8), random_genome(&mut b, 8));
    }

    proptest! {
        #[test]
        fn test_mutate_preserves_structure(genome in arb_genome(9), seed in 0u64..1000) {
            let capacity = StrategyConfig::default().code_capacity();
            let mut rng = StrategyRng::new(seed);
            let mut mutated = genome.clone();
            mutate(&mut rng, &mut mutated, capacity);

            prop_assert!(mutated.gene_count() >= 1);
            prop_assert!(mutated.code_len() < capacity);
            // one operator application moves the length by at most one gene
            let diff = mutated.gene_count() as isize - genome.gene_count() as isize;
            prop_assert!(diff.abs() <= 1);
        }

        #[test]
        fn test_crossbreed_preserves_structure(
            winner in arb_genome(9),
            loser in arb_genome(9),
            seed in 0u64..1000,
        ) {
            let capacity = StrategyConfig::default().code_capacity();
            let mut rng = StrategyRng::new(seed);
            let mut bred = loser.clone();
            crossbreed(&mut rng, &winner, &mut bred, capacity);

            prop_assert!(bred.gene_count() >= loser.gene_count());
            prop_assert!(bred.gene_count() <= loser.gene_count() + 1);
            prop_assert!(bred.code_len() < capacity);
            // every gene of the result exists in one of the parents
            for gene in bred.genes() {
                let in_winner = winner.genes().contains(gene);
                let in_loser = loser.genes().contains(gene);
                let hybrid = winner
                    .genes()
                    .iter()
                    .chain(loser.genes())
                    .any(|g| g.action == gene.action)
                    && winner
                        .genes()
                        .iter()
                        .chain(loser.genes())
                        .any(|g| g.condition == gene.condition);
                prop_assert!(in_winner || in_loser || hybrid);
            }
        }
    }

    #[test]
    fn test_mutate_or_breed_yields_unseen_variant() {
        let mut rng = StrategyRng::new(7);
        let winner = random_genome(&mut rng, 8);
        let mut loser = random_genome(&mut rng, 8);
        let mut registry = PopulationRegistry::new(100);
        registry.insert(&winner);
        registry.insert(&loser);

        let before = loser.clone();
        mutate_or_breed(&mut rng, &winner, &mut loser, &mut registry, 21, 1000).unwrap();
        assert_ne!(loser, before);
        assert!(registry.contains(&loser));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_mutate_or_breed_reports_full_population() {
        let mut rng = StrategyRng::new(13);
        let winner = random_genome(&mut rng, 8);
        let mut loser = random_genome(&mut rng, 8);
        let mut registry = PopulationRegistry::new(2);
        registry.insert(&winner);
        registry.insert(&loser);

        let err = mutate_or_breed(&mut rng, &winner, &mut loser, &mut registry, 21, 1000)
            .unwrap_err();
        assert!(matches!(err, EvolveError::PopulationExhausted(2)));
    }
}
