use super::*;
use crate::animation::ease::Ease;
use crate::config::RewirePolicy;
use crate::graph::collaborator::{Command, CommandLog, RecordingCollaborator};
use crate::graph::template::TemplateRegistry;

fn graph() -> (GraphManager, CommandLog) {
    let collab = RecordingCollaborator::new();
    let log = collab.log();
    let mut g = GraphManager::new(
        Box::new(collab),
        TemplateRegistry::with_prelude().unwrap(),
        RewirePolicy::Rewire,
    );
    g.instantiate("mp4input", "v1", &["a.mp4".to_owned()])
        .unwrap();
    let geometry: Vec<String> = ["0", "0", "320", "240"].map(str::to_owned).to_vec();
    g.instantiate("xoutput", "w", &geometry).unwrap();
    (g, log)
}

fn spec(t0: f64, from: (f64, f64), t1: f64, to: (f64, f64), ease: Ease) -> MoveSpec {
    MoveSpec {
        clock: "v1".to_owned(),
        t0,
        from: Point::new(from.0, from.1),
        t1,
        to: Point::new(to.0, to.1),
        ease_x: ease,
        ease_y: ease,
    }
}

fn moves(log: &CommandLog) -> Vec<Point> {
    log.snapshot()
        .into_iter()
        .filter_map(|c| match c {
            Command::WindowMove { to, .. } => Some(to),
            _ => None,
        })
        .collect()
}

#[test]
fn cosine_move_is_halfway_at_midpoint() {
    let (g, _) = graph();
    let mut e = InterpolationEngine::new();
    e.start("w", spec(0.0, (0.0, 0.0), 1.0, (10.0, 10.0), Ease::Cosine), &g);
    let p = e.position("w", 0.5).unwrap();
    assert!((p.x - 5.0).abs() < 1e-9);
    assert!((p.y - 5.0).abs() < 1e-9);
}

#[test]
fn endpoints_are_exact() {
    let task = AnimationTask::new(
        "w",
        spec(0.3, (0.1, 7.7), 2.9, (123.456, -0.2), Ease::InOutCubic),
    );
    assert_eq!(task.sample(0.3), Point::new(0.1, 7.7));
    assert_eq!(task.sample(2.9), Point::new(123.456, -0.2));
    assert_eq!(task.sample(-5.0), Point::new(0.1, 7.7));
    assert_eq!(task.sample(50.0), Point::new(123.456, -0.2));
}

#[test]
fn supersede_starts_from_current_position() {
    let (mut g, _) = graph();
    let mut e = InterpolationEngine::new();
    e.start("w", spec(0.0, (0.0, 0.0), 2.0, (100.0, 0.0), Ease::Linear), &g);
    g.record_progress("v1", 1.0);
    e.start("w", spec(1.0, (0.0, 0.0), 3.0, (0.0, 0.0), Ease::Linear), &g);

    assert_eq!(e.active(), 1);
    assert_eq!(e.task("w").unwrap().spec.from, Point::new(50.0, 0.0));
    assert_eq!(e.position("w", 1.0).unwrap(), Point::new(50.0, 0.0));
}

#[test]
fn advance_waits_for_start_and_retires_after_end() {
    let (mut g, log) = graph();
    let mut e = InterpolationEngine::new();
    e.start("w", spec(1.0, (0.0, 0.0), 2.0, (10.0, 20.0), Ease::Linear), &g);

    assert_eq!(e.advance(&mut g), 0, "clock not reported yet");
    g.record_progress("v1", 0.5);
    assert_eq!(e.advance(&mut g), 0, "before t0");

    g.record_progress("v1", 1.5);
    assert_eq!(e.advance(&mut g), 1);
    assert_eq!(e.advance(&mut g), 0, "unchanged position is not re-sent");

    g.record_progress("v1", 2.5);
    assert_eq!(e.advance(&mut g), 1);
    assert!(e.is_idle());
    assert_eq!(moves(&log), vec![Point::new(5.0, 10.0), Point::new(10.0, 20.0)]);
    assert_eq!(g.window("w").unwrap().geometry.origin(), Point::new(10.0, 20.0));
}

#[test]
fn cancelled_task_has_no_position() {
    let (g, _) = graph();
    let mut e = InterpolationEngine::new();
    e.start("w", spec(0.0, (0.0, 0.0), 1.0, (1.0, 1.0), Ease::Linear), &g);
    assert_eq!(e.cancel_all(), 1);
    assert!(matches!(
        e.position("w", 0.5),
        Err(LiveMixError::NoActiveTask(_))
    ));
}

#[test]
fn failing_window_drops_the_task() {
    let (mut g, _) = graph();
    let mut e = InterpolationEngine::new();
    e.start("v1", spec(0.0, (0.0, 0.0), 1.0, (1.0, 1.0), Ease::Linear), &g);
    g.record_progress("v1", 0.5);
    assert_eq!(e.advance(&mut g), 0);
    assert!(e.is_idle());
}
