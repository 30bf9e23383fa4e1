use pf_app::{AppError, start};
use pf_project::{RunParams, params_from_yaml_str};
use pf_sim::{RunStatus, SimError};

/// Scenario A on a coarse mesh.
fn small_run(total_time_s: f64) -> RunParams {
    let mut params =
        params_from_yaml_str(include_str!("../../../demos/scenario_a.yaml")).unwrap();
    params.mesh.nr = 4;
    params.mesh.ntheta = 2;
    params.mesh.nz = 6;
    params.time.total_time_s = total_time_s;
    params.time.dt_s = 1.0;
    params.time.record_every = 2;
    params
}

#[test]
fn step_by_step_then_to_completion() {
    let handle = start(&small_run(5.0)).unwrap();
    assert_eq!(handle.progress().status, RunStatus::Idle);

    let first = handle.advance_one_step().unwrap();
    assert_eq!(first.step_index, 1);
    assert_eq!(first.status, RunStatus::Running);
    assert_eq!(first.current_time, 1.0);

    assert_eq!(handle.run_to_completion().unwrap(), RunStatus::Completed);
    let done = handle.progress();
    assert_eq!(done.step_index, 5);
    assert_eq!(done.current_time, 5.0);

    let bundle = handle.results().unwrap();
    assert_eq!(bundle.status, RunStatus::Completed);
    assert_eq!(bundle.step_indices, vec![0, 2, 4, 5]);
    assert_eq!(bundle.time_steps.last(), Some(&5.0));
    assert!(bundle.manifest.finished_at.is_some());
    assert_eq!(bundle.manifest.steps, 5);
}

#[test]
fn completed_runs_reject_further_steps() {
    let handle = start(&small_run(2.0)).unwrap();
    handle.run_to_completion().unwrap();
    assert!(matches!(
        handle.advance_one_step(),
        Err(AppError::Simulation(SimError::InvalidTransition {
            from: RunStatus::Completed,
            ..
        }))
    ));
    assert!(matches!(
        handle.cancel(),
        Err(AppError::Simulation(SimError::InvalidTransition { .. }))
    ));
}

#[test]
fn progress_is_streamed_for_every_step() {
    let handle = start(&small_run(4.0)).unwrap();
    let mut steps = Vec::new();
    let status = handle
        .run_with_progress(|event| steps.push(event.step_index))
        .unwrap();
    assert_eq!(status, RunStatus::Completed);
    assert_eq!(steps, vec![1, 2, 3, 4]);
}

#[test]
fn idle_run_cancels_immediately() {
    let handle = start(&small_run(10.0)).unwrap();
    handle.cancel().unwrap();
    // Cancelling again is a no-op.
    handle.cancel().unwrap();
    assert_eq!(handle.progress().status, RunStatus::Cancelled);
    let bundle = handle.results().unwrap();
    assert_eq!(bundle.status, RunStatus::Cancelled);
    assert_eq!(bundle.final_metrics.step_index, 0);
}

#[test]
fn cancel_reaches_a_busy_run() {
    let mut params = small_run(1.0e6);
    params.time.max_steps = 2_000_000;
    let handle = start(&params).unwrap();
    let status = std::thread::scope(|s| {
        let runner = s.spawn(|| handle.run_to_completion());
        loop {
            let progress = handle.progress();
            if progress.step_index >= 3 || progress.status.is_terminal() {
                break;
            }
            std::thread::yield_now();
        }
        handle.cancel().unwrap();
        runner.join().unwrap()
    })
    .unwrap();
    assert_eq!(status, RunStatus::Cancelled);
    let progress = handle.progress();
    assert!(progress.step_index >= 3);
    assert!(progress.current_time < 1.0e6);
}

#[test]
fn identical_params_share_a_run_id_but_not_a_handle() {
    let a = start(&small_run(2.0)).unwrap();
    let b = start(&small_run(2.0)).unwrap();
    let c = start(&small_run(3.0)).unwrap();
    assert_eq!(a.run_id(), b.run_id());
    assert_ne!(a.run_id(), c.run_id());
    assert_ne!(a.id(), b.id());
}

#[test]
fn invalid_params_never_start_a_worker() {
    let mut params = small_run(2.0);
    params.mesh.ntheta = 0;
    assert!(matches!(start(&params), Err(AppError::Validation(_))));
}

#[test]
fn repeated_runs_produce_identical_bundles() {
    let run = || {
        let handle = start(&small_run(3.0)).unwrap();
        handle.run_to_completion().unwrap();
        handle.results().unwrap()
    };
    let (a, b) = (run(), run());
    assert_eq!(a.temperature_fields, b.temperature_fields);
    assert_eq!(a.summary().temperature_digest, b.summary().temperature_digest);
}
