mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{create_bounds, sphere};
use swarmopt_pso::{
    CallbackAction, GcParameters, PsoConfigBuilder, PsoError, PsoIntermediate, particle_swarm,
};

#[test]
fn test_gcpso_sphere() {
    let config = PsoConfigBuilder::new()
        .seed(42)
        .popsize(20)
        .maxiter(500)
        .guaranteed_convergence(GcParameters::default())
        .build();
    let report = particle_swarm(sphere, &create_bounds(5, 5.12), config).unwrap();
    assert!(report.fun() < 1e-4, "f = {:e}", report.fun());
}

#[test]
fn test_gcpso_rho_stays_in_range() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let config = PsoConfigBuilder::new()
        .seed(8)
        .popsize(10)
        .maxiter(200)
        .guaranteed_convergence(GcParameters::default())
        .callback(Box::new(move |im: &PsoIntermediate| {
            sink.borrow_mut().push(im.rho);
            CallbackAction::Continue
        }))
        .build();
    particle_swarm(sphere, &create_bounds(3, 5.0), config).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 200);
    for rho in seen.iter() {
        let rho = rho.expect("GC run reports rho");
        assert!(rho >= 1.0e-323 && rho <= 10.0 / 1.2);
    }
}

#[test]
fn test_gcpso_rejects_bad_coefficients() {
    let params = GcParameters { rho_expand_coefficient: 1.0, ..GcParameters::default() };
    let config = PsoConfigBuilder::new().seed(1).guaranteed_convergence(params).build();
    let err = particle_swarm(sphere, &create_bounds(2, 1.0), config).unwrap_err();
    assert!(matches!(err, PsoError::InvalidParameter { .. }));
}

#[test]
fn test_gcpso_degenerate_bounds() {
    let config = PsoConfigBuilder::new()
        .seed(1)
        .popsize(4)
        .maxiter(3)
        .guaranteed_convergence(GcParameters::default())
        .build();
    let err = particle_swarm(sphere, &[(0.0, 0.0), (-1.0, 1.0)], config).unwrap_err();
    assert_eq!(err, PsoError::DegenerateBounds { dimension: 0 });
}
