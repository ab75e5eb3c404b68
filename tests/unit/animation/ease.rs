use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in Ease::ALL {
        if ease == Ease::Step {
            continue;
        }
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn cosine_is_symmetric_around_half() {
    assert!((Ease::Cosine.apply(0.5) - 0.5).abs() < 1e-12);
    let lo = Ease::Cosine.apply(0.2);
    let hi = Ease::Cosine.apply(0.8);
    assert!((lo + hi - 1.0).abs() < 1e-12);
}

#[test]
fn tokens_round_trip() {
    for ease in Ease::ALL {
        assert_eq!(Ease::from_token(ease.token()), Some(ease));
    }
    assert_eq!(Ease::from_token("bounce"), None);
}

#[test]
fn normalize_clamps_and_handles_empty_window() {
    assert_eq!(normalize(-1.0, 0.0, 2.0), 0.0);
    assert_eq!(normalize(1.0, 0.0, 2.0), 0.5);
    assert_eq!(normalize(3.0, 0.0, 2.0), 1.0);
    assert_eq!(normalize(0.9, 1.0, 1.0), 0.0);
    assert_eq!(normalize(1.0, 1.0, 1.0), 1.0);
}

#[test]
fn interpolate_hits_endpoints_exactly() {
    let (a, b) = (0.1, 0.3);
    for ease in Ease::ALL {
        assert_eq!(interpolate(a, b, 0.0, ease), a);
        assert_eq!(interpolate(a, b, 1.0, ease), b);
    }
}
