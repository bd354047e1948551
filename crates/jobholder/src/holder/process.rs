use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::common::error::HolderError;
use crate::common::manager::slurm::format_slurm_duration;
use crate::holder::config::{Policy, RunMode};
use crate::holder::controller::{Decision, constrained_value, decide, is_held_by_user};
use crate::holder::handler::SchedulerHandler;
use crate::holder::snapshot::{JobSnapshot, build_snapshot};
use crate::holder::JobAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No cycle has been started.
    Idle,
    Running,
    /// The total duration has elapsed, or the single cycle of a single-shot run has finished.
    Stopped,
    /// Stopped by a shutdown request.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderSummary {
    pub state: LoopState,
    pub cycles: u64,
    pub failed_cycles: u64,
}

/// What happened during a single decision cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub job_count: usize,
    /// `None` if no jobs were found and nothing had to be decided.
    pub decision: Option<Decision>,
    /// Hold/release actions that have failed.
    pub failures: Vec<HolderError>,
}

/// Queries the jobs of the configured user, decides what to do with pending jobs and executes
/// the decision.
///
/// Query and parse errors abort the cycle before any action is taken. A failed hold/release
/// action is recorded in the report and the remaining actions are still executed.
pub async fn run_cycle(
    handler: &dyn SchedulerHandler,
    policy: &Policy,
) -> crate::Result<CycleReport> {
    let snapshot = build_snapshot(handler, policy.username()).await?;
    log::info!("Fetched jobs. Found {} jobs", snapshot.len());
    if snapshot.is_empty() {
        log::info!("No jobs found. No action taken");
        return Ok(CycleReport {
            job_count: 0,
            decision: None,
            failures: vec![],
        });
    }
    log_snapshot(&snapshot);

    let value_constrained = match constrained_value(&snapshot, policy.constraint()) {
        Some(value) => value,
        None => handler
            .query_fairshare(policy.username())
            .await
            .map_err(|error| HolderError::QueryFailure(format!("fairshare query: {error:?}")))?,
    };
    log::debug!(
        "Constrained value ({:?}): {value_constrained}",
        policy.constraint()
    );

    let decision = decide(&snapshot, policy, value_constrained);
    log_decision(&snapshot, policy, &decision);

    let failures = execute_decision(handler, &decision).await;
    Ok(CycleReport {
        job_count: snapshot.len(),
        decision: Some(decision),
        failures,
    })
}

/// Executes the actions of a decision one by one.
async fn execute_decision(
    handler: &dyn SchedulerHandler,
    decision: &Decision,
) -> Vec<HolderError> {
    let mut failures = vec![];
    for job_id in &decision.targets {
        log::debug!("Executing {} of job {job_id}", decision.action);
        if let Err(error) = handler.control_job(decision.action, job_id).await {
            let failure = HolderError::ControlActionFailure {
                action: decision.action,
                job_id: job_id.clone(),
                reason: format!("{error:?}"),
            };
            log::warn!("{failure}");
            failures.push(failure);
        }
    }
    failures
}

fn log_snapshot(snapshot: &JobSnapshot) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    for job in snapshot.jobs() {
        log::debug!(
            "Job {} ({}): state={} partition={} nodes={} cpus={} memory={} time_left={} priority={} reason={}",
            job.id,
            job.name,
            job.state.as_str(),
            job.partition,
            job.nodes,
            job.cpus,
            job.memory,
            format_slurm_duration(&job.time_left),
            job.priority,
            job.node_reason
        );
    }
}

fn log_decision(snapshot: &JobSnapshot, policy: &Policy, decision: &Decision) {
    log::debug!(
        "Pending jobs ordered by {:?}: {:?}",
        policy.order_by(),
        decision.candidates
    );
    match decision.action {
        JobAction::Hold => {
            log::info!(
                "Constrained value ({}) >= maximum ({}). Holding {} job(s)",
                decision.value_constrained,
                policy.value_max(),
                decision.targets.len()
            );
            for job in snapshot
                .pending()
                .filter(|job| is_held_by_user(&job.node_reason))
            {
                log::debug!("Job {} already held", job.id);
            }
        }
        JobAction::Release => {
            log::info!(
                "Constrained value ({}) < maximum ({}). Releasing {} of {} pending job(s)",
                decision.value_constrained,
                policy.value_max(),
                decision.targets.len(),
                decision.candidates.len()
            );
        }
    }
    if !decision.is_noop() {
        log::info!("Job(s) to {}: {}", decision.action, decision.targets.join(", "));
    }
}

/// Runs decision cycles until the total duration of the policy elapses or `cancel` is
/// triggered.
///
/// The first cycle starts immediately, unless `cancel` has already been triggered, in which
/// case no cycle runs and the summary stays [`LoopState::Idle`]. Every following cycle starts
/// `interval` after the previous one has finished, so cycles never overlap. Cancellation is
/// only observed between cycles; a running cycle is always finished.
pub async fn holder_process(
    handler: &dyn SchedulerHandler,
    policy: &Policy,
    cancel: CancellationToken,
) -> HolderSummary {
    let mut summary = HolderSummary {
        state: LoopState::Idle,
        cycles: 0,
        failed_cycles: 0,
    };
    if cancel.is_cancelled() {
        log::debug!("Shutdown requested before the first cycle");
        return summary;
    }

    let deadline = Instant::now() + policy.total_duration();
    summary.state = LoopState::Running;
    perform_cycle(handler, policy, &mut summary).await;

    if policy.mode() == RunMode::SingleShot {
        summary.state = LoopState::Stopped;
        return summary;
    }

    loop {
        let now = Instant::now();
        if now >= deadline {
            log::debug!("Total duration has elapsed");
            summary.state = LoopState::Stopped;
            break;
        }
        let wake_up = deadline.min(now + policy.interval());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                summary.state = LoopState::Cancelled;
                break;
            }
            _ = tokio::time::sleep_until(wake_up) => {}
        }

        if Instant::now() >= deadline {
            log::debug!("Total duration has elapsed");
            summary.state = LoopState::Stopped;
            break;
        }
        perform_cycle(handler, policy, &mut summary).await;
    }
    summary
}

async fn perform_cycle(
    handler: &dyn SchedulerHandler,
    policy: &Policy,
    summary: &mut HolderSummary,
) {
    summary.cycles += 1;
    match run_cycle(handler, policy).await {
        Ok(report) => {
            if !report.failures.is_empty() {
                log::warn!(
                    "{} job action(s) failed in this cycle",
                    report.failures.len()
                );
            }
        }
        Err(error) => {
            summary.failed_cycles += 1;
            log::error!("Decision cycle failed, no action taken: {error}");
        }
    }
}
