use woodrail::{BlockConfig, ConstraintRegime, ElementKind, Integrator, PinLevel, RailwayBlock, SolverConfig, Vec2};

fn disturbed_layout(regime: ConstraintRegime) -> RailwayBlock<f32> {
    let mut block = RailwayBlock::new(BlockConfig::new().with_regime(regime).with_enforced_joints(true));
    let lead = block.add_element(ElementKind::Straight);
    let split = block.add_element(ElementKind::Split);
    let branch = block.add_element(ElementKind::Round { convex: true });
    let end = block.elements()[lead.0].points()[1];
    block.attach(split, 0, end).unwrap();
    let fork = block.elements()[split.0].points()[2];
    block.attach(branch, 0, fork).unwrap();
    block.set_pins(lead, PinLevel::Center).unwrap();
    let tip = block.elements()[branch.0].points()[1];
    block.nudge(tip, Vec2::new(4.0, -9.0)).unwrap();
    block
}

#[test]
fn layout_simulation_deterministic() {
    for regime in [ConstraintRegime::Simple, ConstraintRegime::Element] {
        let results: Vec<_> = (0..5)
            .map(|_| {
                let mut block = disturbed_layout(regime);
                let integrator = Integrator::new(SolverConfig::new().with_gravity(Vec2::new(0.0, -9.81)));
                let mut flagged = Vec::new();
                for _ in 0..120 {
                    flagged.push(integrator.advance(&mut block));
                }
                let positions: Vec<Vec2<f32>> = block.particles().iter().map(|p| p.pos).collect();
                (positions, flagged)
            })
            .collect();

        for r in &results[1..] {
            assert_eq!(results[0].1, r.1);
            for (a, b) in results[0].0.iter().zip(r.0.iter()) {
                assert_eq!(a.x, b.x);
                assert_eq!(a.y, b.y);
            }
        }
    }
}
