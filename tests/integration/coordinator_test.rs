//! Integration tests for the session coordinator
//!
//! Parameter changes while a conversion runs must stop the old engine
//! before the new one is even created.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use svgtrace::conversion::scripted::{ProbeEvent, ScriptedFactory};
use svgtrace::conversion::{
    build_config, ClusteringMode, ControlValues, ConversionConfig, Engine, SessionOutcome,
    SurfaceIds,
};
use svgtrace::error::ConversionResult;
use svgtrace::presentation::{PreviewPanel, SharedSink};
use svgtrace::runner::{
    LocalScheduler, RestartOutcome, SessionCoordinator, SessionState, SliceConfig,
};

fn config_with(controls: ControlValues) -> ConversionConfig {
    build_config(&controls, &SurfaceIds::default())
}

fn coordinator(
    factory: ScriptedFactory,
) -> (SessionCoordinator<ScriptedFactory>, LocalScheduler, Rc<RefCell<PreviewPanel>>) {
    let scheduler = LocalScheduler::new();
    let panel = PreviewPanel::new().shared();
    let sink: SharedSink = panel.clone();
    let coordinator = SessionCoordinator::new(factory, Rc::new(scheduler.clone()), sink)
        .with_slice_config(
            SliceConfig::new()
                .with_budget(Duration::ZERO)
                .with_delay(Duration::ZERO),
        );
    (coordinator, scheduler, panel)
}

#[cfg(test)]
mod coordinator_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_two_quick_restarts_leave_one_live_engine() {
        let (mut coordinator, scheduler, _panel) = coordinator(ScriptedFactory::new(20));

        coordinator.restart(config_with(ControlValues::default())).unwrap();
        coordinator
            .restart(config_with(ControlValues::default().with_filter_speckle(8)))
            .unwrap();

        let probe = coordinator.factory().probe().clone();
        assert_eq!(probe.created(), 2);
        assert_eq!(probe.live(), 1);

        scheduler.run_until_idle().unwrap();
        assert_eq!(probe.live(), 0);
        assert_eq!(probe.ticks_of(1), 0);
        assert_eq!(probe.ticks_of(2), 20);
    }

    #[test]
    fn test_change_while_running_stops_old_session_exactly_once() {
        let (mut coordinator, scheduler, _panel) = coordinator(ScriptedFactory::new(10));

        assert_eq!(
            coordinator.restart(config_with(ControlValues::default())).unwrap(),
            RestartOutcome::Started(1)
        );
        scheduler.run_for(4).unwrap();
        assert_eq!(
            coordinator.current().unwrap().state(),
            SessionState::Running
        );

        assert_eq!(
            coordinator
                .restart(config_with(ControlValues::default().with_color_precision(8)))
                .unwrap(),
            RestartOutcome::Started(2)
        );
        scheduler.run_until_idle().unwrap();

        let probe = coordinator.factory().probe();
        let events = probe.events();
        let freed_first = events
            .iter()
            .position(|event| *event == ProbeEvent::Free(1))
            .unwrap();
        let created_second = events
            .iter()
            .position(|event| *event == ProbeEvent::Created(2))
            .unwrap();
        let first_tick_of_second = events
            .iter()
            .position(|event| *event == ProbeEvent::Tick(2))
            .unwrap();

        assert_eq!(
            events
                .iter()
                .filter(|event| **event == ProbeEvent::Free(1))
                .count(),
            1
        );
        assert!(freed_first < created_second);
        assert!(created_second < first_tick_of_second);
        assert_eq!(probe.ticks_of(1), 4);
        assert_eq!(probe.ticks_of(2), 10);
    }

    #[test]
    fn test_engines_never_interleave() {
        let (mut coordinator, scheduler, _panel) = coordinator(ScriptedFactory::new(6));

        for precision in 1..=5 {
            coordinator
                .restart(config_with(
                    ControlValues::default().with_color_precision(precision),
                ))
                .unwrap();
            scheduler.run_for(2).unwrap();
        }
        scheduler.run_until_idle().unwrap();

        // Once an engine ticks, no earlier engine ticks again
        let mut newest = 0;
        for event in coordinator.factory().probe().events() {
            if let ProbeEvent::Tick(id) = event {
                assert!(id >= newest, "engine {} ticked after engine {}", id, newest);
                newest = id;
            }
        }
        assert_eq!(coordinator.factory().probe().live(), 0);
    }

    #[test]
    fn test_no_source_is_silent() {
        let factory = ScriptedFactory::new(4);
        factory.set_source_loaded(false);
        let (mut coordinator, scheduler, panel) = coordinator(factory);

        let outcome = coordinator
            .restart(config_with(ControlValues::default()))
            .unwrap();

        assert_eq!(outcome, RestartOutcome::NoSource);
        assert!(coordinator.current().is_none());
        assert!(scheduler.is_idle());
        assert!(!panel.borrow().state().progress_visible);
        assert_eq!(coordinator.factory().probe().created(), 0);
    }

    #[test]
    fn test_binary_restart_switches_visual() {
        let (mut coordinator, scheduler, panel) = coordinator(ScriptedFactory::new(40));

        coordinator.restart(config_with(ControlValues::default())).unwrap();
        assert!(panel.borrow().state().preview_visible);

        coordinator
            .restart(config_with(
                ControlValues::default().with_clustering_mode(ClusteringMode::Binary),
            ))
            .unwrap();
        let state = panel.borrow().state().clone();
        assert!(!state.preview_visible);
        assert_eq!(state.vector_background, Some("#fff"));

        scheduler.run_until_idle().unwrap();
    }

    #[test]
    fn test_statistics_record_superseded_sessions() {
        let (mut coordinator, scheduler, _panel) = coordinator(ScriptedFactory::new(3));

        coordinator.restart(config_with(ControlValues::default())).unwrap();
        scheduler.run_for(1).unwrap();
        coordinator.restart(config_with(ControlValues::default())).unwrap();
        scheduler.run_until_idle().unwrap();

        let stats = coordinator.statistics();
        assert_eq!(stats.session_count, 2);
        assert_eq!(stats.steps, 4);
        assert_eq!(stats.outcome, SessionOutcome::Completed);
        assert!(stats.finished_at.is_some());
    }

    #[test]
    fn test_stop_releases_current_engine() {
        let (mut coordinator, scheduler, _panel) = coordinator(ScriptedFactory::new(5));
        coordinator.restart(config_with(ControlValues::default())).unwrap();

        assert!(coordinator.stop());
        assert!(!coordinator.stop());
        scheduler.run_until_idle().unwrap();

        assert_eq!(coordinator.factory().probe().ticks(), 0);
        assert_eq!(
            coordinator.current().unwrap().state(),
            SessionState::Stopped
        );
    }

    #[test]
    fn test_closure_factory() {
        let probe = svgtrace::conversion::scripted::EngineProbe::new();
        let factory_probe = probe.clone();
        let factory = move |_config: &ConversionConfig| -> ConversionResult<Box<dyn Engine>> {
            Ok(Box::new(svgtrace::conversion::scripted::ScriptedEngine::new(
                2,
                &factory_probe,
            )))
        };

        let scheduler = LocalScheduler::new();
        let sink: SharedSink = PreviewPanel::new().shared();
        let mut coordinator = SessionCoordinator::new(factory, Rc::new(scheduler.clone()), sink);

        coordinator.restart(config_with(ControlValues::default())).unwrap();
        scheduler.run_until_idle().unwrap();

        assert_eq!(probe.created(), 1);
        assert_eq!(probe.ticks(), 2);
        assert_eq!(probe.frees(), 1);
    }
}
