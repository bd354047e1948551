use clap::Parser;

use jobholder::JOBHOLDER_VERSION;
use jobholder::common::cli::HolderOpts;
use jobholder::common::manager::slurm::format_slurm_duration;
use jobholder::common::setup::{setup_logging, setup_shutdown};
use jobholder::holder::handler::dryrun::DryRunHandler;
use jobholder::holder::handler::slurm::SlurmHandler;
use jobholder::holder::process::{LoopState, holder_process};

#[tokio::main(flavor = "current_thread")]
async fn main() -> jobholder::Result<()> {
    let opts = HolderOpts::parse();
    setup_logging(opts.verbose);

    let policy = match opts.into_policy() {
        Ok(policy) => policy,
        Err(error) => {
            log::error!("{error}");
            std::process::exit(1);
        }
    };

    log::info!(
        "jobholder {JOBHOLDER_VERSION} started for user `{}`: constraint {:?}, maximum {}, order by {:?}, interval {}, duration {}{}",
        policy.username(),
        policy.constraint(),
        policy.value_max(),
        policy.order_by(),
        format_slurm_duration(&policy.interval()),
        format_slurm_duration(&policy.total_duration()),
        if policy.dry_run() { " (dry run)" } else { "" }
    );

    let cancel = setup_shutdown();
    let summary = if policy.dry_run() {
        let handler = DryRunHandler::new(Box::new(SlurmHandler::new()));
        let summary = holder_process(&handler, &policy, cancel).await;
        handler.log_summary();
        summary
    } else {
        holder_process(&SlurmHandler::new(), &policy, cancel).await
    };

    let reason = match summary.state {
        LoopState::Cancelled | LoopState::Idle => "shutdown requested",
        LoopState::Running | LoopState::Stopped => "finished",
    };
    log::info!(
        "jobholder stopped ({reason}) after {} cycle(s), {} failed",
        summary.cycles,
        summary.failed_cycles
    );
    Ok(())
}
