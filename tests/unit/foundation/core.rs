use super::*;

#[test]
fn any_medium_is_compatible_with_everything() {
    assert!(Medium::Any.compatible(Medium::Audio));
    assert!(Medium::Video.compatible(Medium::Any));
    assert!(Medium::Audio.compatible(Medium::Audio));
    assert!(!Medium::Audio.compatible(Medium::Video));
}

#[test]
fn transport_ops_map_to_states() {
    assert_eq!(TransportOp::parse_play("start"), Some(TransportOp::Start));
    assert_eq!(TransportOp::parse_play("rewind"), None);
    assert_eq!(
        TransportOp::Pause.resulting_state(TransportState::Playing),
        TransportState::Paused
    );
    assert_eq!(
        TransportOp::Seek { from: 0.0, to: 4.0 }.resulting_state(TransportState::Playing),
        TransportState::Playing
    );
}

#[test]
fn geometry_rejects_negative_size() {
    assert!(Geometry::new(0.0, 0.0, -1.0, 10.0).is_err());
    assert!(Geometry::new(0.0, 0.0, f64::NAN, 10.0).is_err());
    let g = Geometry::new(1.0, 2.0, 30.0, 40.0).unwrap();
    let moved = g.moved_to(Point::new(5.0, 6.0));
    assert_eq!(moved.origin(), Point::new(5.0, 6.0));
    assert_eq!(moved.width, 30.0);
}
