use super::*;
use crate::config::RewirePolicy;
use crate::foundation::core::{Point, TransportState};
use crate::foundation::error::LiveMixError;
use crate::graph::collaborator::{Command, CommandLog, RecordingCollaborator};
use crate::graph::template::TemplateRegistry;
use crate::script::compiler::compile;

const GRAPH: &str = "\
raw m 0 proxysrc name=in ! videoflip name=flip ! proxysink name=out
war
new mp4input v1 a.mp4
new xoutput w 0 0 320 240
new m m1
";

fn setup(collab: RecordingCollaborator) -> (GraphManager, InterpolationEngine, CommandLog) {
    let log = collab.log();
    let program = compile(GRAPH).unwrap();
    let mut reg = TemplateRegistry::with_prelude().unwrap();
    reg.extend_from(&program).unwrap();
    let mut g = GraphManager::new(Box::new(collab), reg, RewirePolicy::Rewire);
    g.instantiate("mp4input", "v1", &["a.mp4".to_owned()])
        .unwrap();
    let geometry: Vec<String> = ["0", "0", "320", "240"].map(str::to_owned).to_vec();
    g.instantiate("xoutput", "w", &geometry).unwrap();
    g.instantiate("m", "m1", &[]).unwrap();
    (g, InterpolationEngine::new(), log)
}

fn group(src: &str) -> ActionGroup {
    compile(src).unwrap().triggers.remove(0).group
}

fn after_setup(log: &CommandLog) -> Vec<Command> {
    log.snapshot().into_iter().skip(3).collect()
}

#[test]
fn sequential_group_applies_its_action() {
    let (mut g, mut e, log) = setup(RecordingCollaborator::new());
    let out = execute(&group("on pre act v1 play start\n"), &mut g, &mut e).unwrap();
    assert_eq!(
        out,
        GroupOutcome {
            applied: 1,
            skipped: 0,
            terminate: false
        }
    );
    assert_eq!(g.instance("v1").unwrap().transport, TransportState::Playing);
    assert_eq!(
        after_setup(&log),
        vec![Command::Transport {
            instance: "v1".to_owned(),
            op: TransportOp::Start
        }]
    );
}

#[test]
fn recoverable_failures_skip_only_the_failing_action() {
    let (mut g, mut e, log) = setup(RecordingCollaborator::new());
    let out = execute(
        &group(
            "on pre wrap\n\
             act m1 prop flip method int nope\n\
             act v1 window show\n\
             act w window show\n\
             parw\n",
        ),
        &mut g,
        &mut e,
    )
    .unwrap();
    assert_eq!((out.applied, out.skipped), (1, 2));
    assert_eq!(
        after_setup(&log),
        vec![Command::WindowShow {
            instance: "w".to_owned()
        }]
    );
}

#[test]
fn collaborator_refusal_is_recoverable() {
    let (mut g, mut e, _) = setup(RecordingCollaborator::new().refusing("v1"));
    let out = execute(
        &group("on pre wrap\nact v1 play start\nact w window show\nparw\n"),
        &mut g,
        &mut e,
    )
    .unwrap();
    assert_eq!((out.applied, out.skipped), (1, 1));
}

#[test]
fn parallel_conflicts_keep_the_last_action() {
    let (mut g, mut e, log) = setup(RecordingCollaborator::new());
    execute(
        &group(
            "on pre wrap\n\
             act v1 play start\n\
             act m1 prop flip method GstOrientation 90r\n\
             act v1 play pause\n\
             act m1 prop flip method GstOrientation 180\n\
             act v1 seek 0 2\n\
             parw\n",
        ),
        &mut g,
        &mut e,
    )
    .unwrap();
    let cmds = after_setup(&log);
    assert_eq!(cmds.len(), 3);
    assert_eq!(
        cmds[0],
        Command::Transport {
            instance: "v1".to_owned(),
            op: TransportOp::Pause
        }
    );
    assert!(matches!(&cmds[1], Command::SetProperty { value, .. } if value.to_string() == "GstOrientation::180"));
    assert!(matches!(
        cmds[2],
        Command::Transport {
            op: TransportOp::Seek { .. },
            ..
        }
    ));
}

#[test]
fn window_move_registers_a_task() {
    let (mut g, mut e, _) = setup(RecordingCollaborator::new());
    let out = execute(
        &group("on pre act w window move v1 0 0 0 1 10 10 mcos mcos\n"),
        &mut g,
        &mut e,
    )
    .unwrap();
    assert_eq!(out.applied, 1);
    assert_eq!(e.active(), 1);
    assert_eq!(e.position("w", 0.5).unwrap(), Point::new(5.0, 5.0));
}

#[test]
fn window_move_on_a_windowless_node_is_skipped() {
    let (mut g, mut e, _) = setup(RecordingCollaborator::new());
    let out = execute(
        &group("on pre act v1 window move v1 0 0 0 1 10 10 linear linear\n"),
        &mut g,
        &mut e,
    )
    .unwrap();
    assert_eq!(out.skipped, 1);
    assert!(e.is_idle());
}

#[test]
fn terminate_is_reported_after_the_rest_of_the_group() {
    let (mut g, mut e, log) = setup(RecordingCollaborator::new());
    let out = execute(
        &group("on pre wrap\nterminate\nact v1 play stop\nparw\n"),
        &mut g,
        &mut e,
    )
    .unwrap();
    assert!(out.terminate);
    assert_eq!(out.applied, 1);
    assert_eq!(after_setup(&log).len(), 1);
}

#[test]
fn structural_failures_abort_the_group() {
    let (mut g, mut e, _) = setup(RecordingCollaborator::new());
    let err = execute(
        &group("on pre act m1 prop crop top int 1\n"),
        &mut g,
        &mut e,
    )
    .unwrap_err();
    assert!(matches!(err, LiveMixError::UnknownElement { .. }));
}
