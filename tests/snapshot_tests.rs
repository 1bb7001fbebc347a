use woodrail::{ElementKind, ElementRecord, Integrator, PinLevel, RailwayBlock, Vec2};

fn sample_block() -> RailwayBlock<f64> {
    let mut block = RailwayBlock::default();
    let straight = block.add_element(ElementKind::Straight);
    let round = block.add_element(ElementKind::Round { convex: false });
    let split = block.add_element(ElementKind::Split);
    let end = block.elements()[straight.0].points()[1];
    block.attach(round, 0, end).unwrap();
    block.move_element(split, Vec2::new(-240.0, 90.0)).unwrap();
    block.set_pins(straight, PinLevel::Center).unwrap();
    block.set_pins(split, PinLevel::Ends).unwrap();
    block
}

#[test]
fn json_round_trip_reproduces_the_block() {
    let block = sample_block();
    let json = serde_json::to_string(&block.serialize()).unwrap();
    assert!(json.contains("\"type\":\"s\""));
    assert!(json.contains("\"type\":\"r\""));
    assert!(json.contains("\"type\":\"v\""));

    let records: Vec<ElementRecord<f64>> = serde_json::from_str(&json).unwrap();
    let mut restored = RailwayBlock::default();
    assert_eq!(restored.deserialize(&records), 0);

    assert_eq!(restored.element_count(), block.element_count());
    assert_eq!(restored.particle_count(), block.particle_count());
    for (a, b) in block.elements().iter().zip(restored.elements()) {
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.pins(), b.pins());
    }
    for (a, b) in block.particles().iter().zip(restored.particles()) {
        assert_eq!(a.pos, b.pos);
        assert_eq!(b.pos, b.prev_pos);
        assert_eq!(a.pinned, b.pinned);
    }
    assert_eq!(restored.serialize(), block.serialize());
}

#[test]
fn connections_are_rebuilt_from_coincident_ends() {
    let block = sample_block();
    let mut restored = RailwayBlock::default();
    restored.deserialize(&block.serialize());
    assert!(restored.connections().is_empty());
    assert_eq!(restored.connect_coincident(1e-6), 1);
    let (old, new) = (block.connections()[0], restored.connections()[0]);
    assert!(new.involves(old.endpoint1) && new.involves(old.endpoint2));
}

#[test]
fn unknown_type_tags_are_dropped() {
    let json = r#"[
        {"type": "s", "center": {"x": 0.0, "y": 0.0},
         "points": [{"x": -50.0, "y": 0.0}, {"x": 50.0, "y": 0.0}], "pins": 0},
        {"type": "x", "center": {"x": 5.0, "y": 5.0},
         "points": [{"x": 0.0, "y": 0.0}], "pins": 0},
        {"type": "s", "center": {"x": 0.0, "y": 200.0},
         "points": [{"x": -50.0, "y": 200.0}, {"x": 50.0, "y": 200.0}], "pins": 1}
    ]"#;
    let records: Vec<ElementRecord<f64>> = serde_json::from_str(json).unwrap();
    let mut block = RailwayBlock::default();
    assert_eq!(block.deserialize(&records), 1);
    assert_eq!(block.element_count(), 2);
    assert_eq!(block.elements()[1].pins(), PinLevel::Center);
    assert_eq!(block.particle(block.elements()[1].center()).pos, Vec2::new(0.0, 200.0));
}

#[test]
fn out_of_range_pins_leave_the_element_free() {
    let json = r#"[
        {"type": "s", "center": {"x": 0.0, "y": 0.0},
         "points": [{"x": -50.0, "y": 0.0}, {"x": 50.0, "y": 0.0}], "pins": 7},
        {"type": "s", "center": {"x": 0.0, "y": 90.0},
         "points": [{"x": -50.0, "y": 90.0}, {"x": 50.0, "y": 90.0}], "pins": -1}
    ]"#;
    let records: Vec<ElementRecord<f64>> = serde_json::from_str(json).unwrap();
    let mut block = RailwayBlock::default();
    assert_eq!(block.deserialize(&records), 0);
    assert!(block.elements().iter().all(|e| e.pins() == PinLevel::Free));
    assert!(block.particles().iter().all(|p| !p.pinned));
}

#[test]
fn loading_keeps_the_frame_counter() {
    let mut block = sample_block();
    let integrator = Integrator::default();
    for _ in 0..5 {
        integrator.advance(&mut block);
    }
    let snapshot = block.serialize();
    block.deserialize(&snapshot);
    assert_eq!(block.frame_index(), 5);
    assert_eq!(block.element_count(), 3);
}
