mod common;

use std::sync::Arc;

use common::shifted_sphere;
use swarmopt_pso::guide::GuideContext;
use swarmopt_pso::{
    Bounds, GuidePolicy, GuideSelectionStrategy, KnowledgePolicy, Minimise, MultiPopulation,
    Objective, PsoConfigBuilder, RandomSource,
};

fn two_objectives() -> Vec<Arc<dyn Objective>> {
    vec![
        Arc::new(Minimise(shifted_sphere(0.0))),
        Arc::new(Minimise(shifted_sphere(2.0))),
    ]
}

fn vepso(policy: KnowledgePolicy, seed: u64) -> MultiPopulation {
    let config = PsoConfigBuilder::new()
        .seed(seed)
        .popsize(10)
        .maxiter(100)
        .guide(GuidePolicy::VectorEvaluated(policy))
        .build();
    let bounds = Bounds::from_pairs(&[(-5.0, 5.0); 3]).unwrap();
    MultiPopulation::new(two_objectives(), bounds, config).unwrap()
}

#[test]
fn test_ring_guide_comes_from_other_population() {
    let mut populations = vepso(KnowledgePolicy::Ring { offset: 1 }, 4);
    populations.step().unwrap();

    let snapshot = populations.board().snapshot();
    let strategy = GuideSelectionStrategy::from_policy(
        GuidePolicy::VectorEvaluated(KnowledgePolicy::Ring { offset: 1 }),
        RandomSource::seeded(0),
    );
    let p0 = &populations.swarms()[0];
    let particle = &p0.particles()[0];
    let nbest = p0.best_position().clone();
    let ctx = GuideContext {
        neighbourhood_best: &nbest,
        populations: Some(snapshot.as_slice()),
        population_index: 0,
    };
    let guide = strategy.select_guide(particle, &ctx).unwrap();
    assert_eq!(&guide, populations.swarms()[1].best_position());
    assert_ne!(&guide, p0.best_position());
}

#[test]
fn test_vepso_populations_pull_towards_each_other() {
    let report = vepso(KnowledgePolicy::Ring { offset: 1 }, 12).solve().unwrap();
    assert_eq!(report.x.len(), 2);
    assert_eq!(report.nit, 100);
    assert_eq!(report.nfev, 2 * 10 * 101);
    // each sub-swarm settles on the segment between the two optima
    for x in &report.x {
        for &xi in x.iter() {
            assert!((-1.0..=3.0).contains(&xi), "x = {:?}", x);
        }
    }
}

#[test]
fn test_vepso_random_transfer_is_reproducible() {
    let a = vepso(KnowledgePolicy::Random, 21).solve().unwrap();
    let b = vepso(KnowledgePolicy::Random, 21).solve().unwrap();
    assert_eq!(a.x, b.x);
    assert_eq!(a.fitness, b.fitness);
}
