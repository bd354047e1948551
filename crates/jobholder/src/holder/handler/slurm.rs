use crate::common::manager::slurm::{SQUEUE_FIELDS, parse_sshare_fairshare};
use crate::holder::JobAction;
use crate::holder::handler::common::run_command;
use crate::holder::handler::{HandlerFuture, SchedulerHandler};

/// Talks to Slurm through `squeue`, `sshare` and `scontrol`.
#[derive(Default)]
pub struct SlurmHandler;

impl SlurmHandler {
    pub fn new() -> Self {
        Self
    }
}

impl SchedulerHandler for SlurmHandler {
    fn query_jobs(&self, username: &str) -> HandlerFuture<Vec<String>> {
        let username = username.to_string();
        Box::pin(async move {
            let format = SQUEUE_FIELDS.join(",");
            let output = run_command(
                "squeue",
                &["-u", username.as_str(), "--Format", format.as_str()],
            )
            .await?;
            Ok(output.lines().map(|line| line.to_string()).collect())
        })
    }

    fn query_fairshare(&self, username: &str) -> HandlerFuture<f64> {
        let username = username.to_string();
        Box::pin(async move {
            let output = run_command("sshare", &["-u", username.as_str(), "-U"]).await?;
            log::debug!("sshare output: {}", output.trim());
            parse_sshare_fairshare(&output)
        })
    }

    fn control_job(&self, action: JobAction, job_id: &str) -> HandlerFuture<()> {
        let job_id = job_id.to_string();
        Box::pin(async move {
            run_command("scontrol", &[action.as_str(), job_id.as_str()]).await?;
            Ok(())
        })
    }
}
