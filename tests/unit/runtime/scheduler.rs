use super::*;
use crate::config::RewirePolicy;
use crate::foundation::core::NodeHandle;
use crate::graph::collaborator::{Command, CommandLog, RecordingCollaborator};
use crate::graph::template::TemplateRegistry;
use crate::script::compiler::compile;
use crate::script::program::Statement;

struct Fixture {
    graph: GraphManager,
    engine: InterpolationEngine,
    scheduler: Scheduler,
    log: CommandLog,
}

impl Fixture {
    fn new(src: &str) -> Self {
        let program = compile(src).unwrap();
        let collab = RecordingCollaborator::new();
        let log = collab.log();
        let mut reg = TemplateRegistry::with_prelude().unwrap();
        reg.extend_from(&program).unwrap();
        let mut graph = GraphManager::new(Box::new(collab), reg, RewirePolicy::Rewire);
        for stmt in &program.statements {
            if let Statement::New {
                template,
                instance,
                args,
                ..
            } = stmt
            {
                graph.instantiate(template, instance, args).unwrap();
            }
        }
        Self {
            graph,
            engine: InterpolationEngine::new(),
            scheduler: Scheduler::new(program.triggers),
            log,
        }
    }

    fn handle(&self, instance: &str) -> NodeHandle {
        self.graph.handle_of(instance).unwrap()
    }

    fn start(&mut self) {
        self.scheduler
            .start(&mut self.graph, &mut self.engine)
            .unwrap();
    }

    fn progress(&mut self, instance: &str, value: f64) {
        let node = self.handle(instance);
        self.scheduler
            .handle_signal(
                &Signal::Progress { node, value },
                &mut self.graph,
                &mut self.engine,
            )
            .unwrap();
    }

    fn callback(&mut self, instance: &str, event: &str) {
        let node = self.handle(instance);
        self.scheduler
            .handle_signal(
                &Signal::Callback {
                    node,
                    event: event.to_owned(),
                },
                &mut self.graph,
                &mut self.engine,
            )
            .unwrap();
    }

    fn orders(&self) -> Vec<usize> {
        self.scheduler.dispatched().iter().map(|d| d.order).collect()
    }
}

const SOURCES: &str = "new mp4input v1 a.mp4\nnew mp4input v2 b.mp4\nnew xoutput w 0 0 320 240\n";

#[test]
fn pre_bindings_fire_first_in_declaration_order() {
    let mut f = Fixture::new(&format!(
        "{SOURCES}\
         on progress v1 0 act w window show\n\
         on pre act v1 play start\n\
         on pre act v2 play start\n\
         on callback v1 end terminate\n"
    ));
    assert_eq!(f.scheduler.state(), RunState::Idle);
    f.start();
    assert_eq!(f.scheduler.state(), RunState::Running);
    assert_eq!(f.orders(), vec![1, 2]);

    f.progress("v1", 0.0);
    assert_eq!(f.orders(), vec![1, 2, 0]);

    let cmds: Vec<_> = f.log.snapshot().into_iter().skip(3).collect();
    assert_eq!(cmds[0].instance(), "v1");
    assert_eq!(cmds[1].instance(), "v2");
    assert_eq!(cmds[2], Command::WindowShow { instance: "w".to_owned() });
}

#[test]
fn progress_fires_in_threshold_order_once() {
    let mut f = Fixture::new(&format!(
        "{SOURCES}\
         on progress v1 0.5 act v2 play stop\n\
         on progress v1 0.2 act v2 play start\n\
         on progress v1 0.2 act w window show\n\
         on progress v2 0.1 act v1 play pause\n"
    ));
    f.start();
    f.progress("v1", 0.1);
    assert!(f.orders().is_empty());

    f.progress("v1", 0.6);
    assert_eq!(f.orders(), vec![1, 2, 0]);

    f.progress("v1", 0.05);
    f.progress("v1", 0.7);
    assert_eq!(f.orders(), vec![1, 2, 0], "progress bindings fire once");
    assert_eq!(f.graph.clock_position("v1"), Some(0.7));
}

#[test]
fn invalid_progress_values_are_dropped() {
    let mut f = Fixture::new(&format!("{SOURCES}on progress v1 0 act v1 play start\n"));
    f.start();
    f.progress("v1", f64::NAN);
    f.progress("v1", -1.0);
    assert!(f.orders().is_empty());
    assert_eq!(f.graph.clock_position("v1"), None);
}

#[test]
fn progress_above_one_is_clamped() {
    let mut f = Fixture::new(&format!(
        "{SOURCES}on progress v1 1 act v1 play start\non progress v2 1 act v2 play start\n"
    ));
    f.start();
    f.progress("v1", 42.0);
    assert_eq!(f.graph.clock_position("v1"), Some(1.0));
    assert_eq!(f.orders(), vec![0]);
}

#[test]
fn callbacks_match_instance_and_event() {
    let mut f = Fixture::new(&format!(
        "{SOURCES}\
         on callback v1 eos act w window show\n\
         on callback v2 eos act v2 play stop\n\
         on callback v1 eos act v1 play stop\n\
         on progress v1 1 act v1 play start\n"
    ));
    f.start();
    f.callback("v1", "eos");
    assert_eq!(f.orders(), vec![0, 2]);
    f.callback("v1", "eos");
    assert_eq!(f.orders(), vec![0, 2, 0, 2]);
    assert_eq!(f.graph.clock("v1").unwrap().events.len(), 2);
}

#[test]
fn terminal_callback_fires_once_per_run() {
    let mut f = Fixture::new(&format!(
        "{SOURCES}\
         on callback v1 end act v1 play stop\n\
         on callback v1 eos act w window show\n\
         on progress v2 1 act v2 play stop\n"
    ));
    f.start();
    f.callback("v1", "end");
    f.callback("v1", "end");
    assert_eq!(f.orders(), vec![0]);

    f.callback("v1", "eos");
    f.callback("v1", "eos");
    assert_eq!(f.orders(), vec![0, 1, 1]);
    assert_eq!(f.scheduler.state(), RunState::Running);
    assert_eq!(f.graph.clock("v1").unwrap().events.len(), 4);
}

#[test]
fn terminate_cancels_animations_and_stops_intake() {
    let mut f = Fixture::new(&format!(
        "{SOURCES}\
         on pre act w window move v1 0 0 0 1 100 100 linear linear\n\
         on progress v1 0.5 terminate\n\
         on progress v1 0.6 act v2 play start\n"
    ));
    f.start();
    assert_eq!(f.engine.active(), 1);

    f.progress("v1", 0.1);
    assert_eq!(f.scheduler.tick(&mut f.graph, &mut f.engine), 1);

    f.progress("v1", 0.7);
    assert_eq!(f.scheduler.state(), RunState::Terminated);
    assert_eq!(f.scheduler.end_reason(), Some(EndReason::Terminate));
    assert_eq!(f.orders(), vec![0, 1], "threshold 0.6 is abandoned after terminate");
    assert!(matches!(
        f.engine.position("w", 0.7),
        Err(crate::foundation::error::LiveMixError::NoActiveTask(_))
    ));

    let before = f.log.len();
    f.callback("v1", "end");
    assert_eq!(f.scheduler.tick(&mut f.graph, &mut f.engine), 0);
    assert_eq!(f.log.len(), before);
}

#[test]
fn run_ends_when_nothing_is_pending() {
    let mut f = Fixture::new(&format!("{SOURCES}on pre act v1 play start\n"));
    f.start();
    assert_eq!(f.scheduler.end_reason(), Some(EndReason::Idle));

    let mut f = Fixture::new(&format!(
        "{SOURCES}on callback v1 end act v1 play stop\non callback v1 eos act v2 play stop\n"
    ));
    f.start();
    assert_eq!(f.scheduler.state(), RunState::Running);
    f.callback("v1", "end");
    assert_eq!(f.scheduler.end_reason(), Some(EndReason::Idle));
}

#[test]
fn unfired_progress_keeps_the_run_alive_after_end() {
    let mut f = Fixture::new(&format!(
        "{SOURCES}on callback v1 end act v1 play stop\non progress v2 0.3 act v2 play stop\n"
    ));
    f.start();
    f.callback("v1", "end");
    assert_eq!(f.scheduler.state(), RunState::Running);
    f.progress("v2", 0.3);
    assert_eq!(f.scheduler.end_reason(), Some(EndReason::Idle));
}

#[test]
fn disconnect_finishes_the_run() {
    let mut f = Fixture::new(&format!("{SOURCES}on progress v1 0.3 act v1 play stop\n"));
    f.start();
    f.scheduler.disconnect(&mut f.engine);
    assert_eq!(f.scheduler.end_reason(), Some(EndReason::Disconnected));
}

#[test]
fn signals_from_unknown_nodes_are_ignored() {
    let mut f = Fixture::new(&format!("{SOURCES}on progress v1 0 act v1 play start\n"));
    f.start();
    f.scheduler
        .handle_signal(
            &Signal::Progress {
                node: NodeHandle(999),
                value: 1.0,
            },
            &mut f.graph,
            &mut f.engine,
        )
        .unwrap();
    assert!(f.orders().is_empty());
}
