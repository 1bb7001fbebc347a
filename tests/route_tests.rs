use woodrail::{ElementId, ElementKind, RailwayBlock, Switch, TrainCursor, Vec2};

fn ring() -> RailwayBlock<f64> {
    let mut block = RailwayBlock::default();
    for k in 0..8 {
        let id = block.add_element(ElementKind::Round { convex: true });
        if k > 0 {
            let end = block.elements()[k - 1].points()[1];
            block.attach(id, 0, end).unwrap();
        }
    }
    let (closing, start) = (block.elements()[7].points()[1], block.elements()[0].points()[0]);
    block.add_connection(closing, start).unwrap();
    block
}

#[test]
fn train_laps_the_ring() {
    let block = ring();
    let arc = block.elements()[0].edge_length(block.particles(), 0, 1);
    let mut cursor = TrainCursor::new(&block, ElementId(0), 0, Switch::Left).unwrap();

    assert!(cursor.advance(&block, 8.5 * arc, Switch::Left));
    assert_eq!(cursor.element, ElementId(0));
    assert!((cursor.t - 0.5).abs() < 1e-6, "t = {}", cursor.t);
    let pose = cursor.pose(&block);
    assert!(pose.position.distance(Vec2::new(0.0, 0.0)) < 1e-6);
}

#[test]
fn train_stays_on_the_circle() {
    let block = ring();
    let center = Vec2::new(0.0, -150.0);
    let mut cursor = TrainCursor::new(&block, ElementId(3), 1, Switch::Left).unwrap();
    for _ in 0..100 {
        assert!(cursor.advance(&block, 13.0, Switch::Left));
        let pose = cursor.pose(&block);
        assert!((pose.position.distance(center) - 150.0).abs() < 1e-6);
        // Velocity is radial, i.e. perpendicular to the direction of travel.
        assert!((pose.velocity.length() - 150.0).abs() < 1e-6);
    }
}

#[test]
fn split_branches_lead_to_different_pieces() {
    let mut block: RailwayBlock<f64> = RailwayBlock::default();
    let lead = block.add_element(ElementKind::Straight);
    let split = block.add_element(ElementKind::Split);
    let upper = block.add_element(ElementKind::Straight);
    let lower = block.add_element(ElementKind::Round { convex: false });

    let lead_end = block.elements()[lead.0].points()[1];
    block.attach(split, 0, lead_end).unwrap();
    let (branch1, branch2) = (block.elements()[split.0].points()[1], block.elements()[split.0].points()[2]);
    block.attach(upper, 0, branch1).unwrap();
    block.attach(lower, 0, branch2).unwrap();

    let split_length = block.elements()[split.0].edge_length(block.particles(), 0, 1);
    let distance = 100.0 + split_length + 10.0;
    for (switch, expected) in [(Switch::Left, upper), (Switch::Right, lower)] {
        let mut cursor = TrainCursor::new(&block, lead, 0, switch).unwrap();
        assert!(cursor.advance(&block, distance, switch));
        assert_eq!(cursor.element, expected);
        assert_eq!(cursor.from, 0);
    }

    // Coming back out of a branch always leads to the stub.
    let mut cursor = TrainCursor::new(&block, upper, 1, Switch::Right).unwrap();
    assert!(cursor.advance(&block, 100.0 + 10.0, Switch::Right));
    assert_eq!(cursor.element, split);
    assert_eq!((cursor.from, cursor.to), (1, 0));
}

#[test]
fn cursor_rejects_bad_entry() {
    let mut block: RailwayBlock<f64> = RailwayBlock::default();
    let id = block.add_element(ElementKind::Straight);
    assert!(TrainCursor::new(&block, id, 2, Switch::Left).is_none());
    assert!(TrainCursor::new(&block, ElementId(5), 0, Switch::Left).is_none());
}
