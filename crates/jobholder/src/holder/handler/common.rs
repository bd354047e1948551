use std::process::Output;

use anyhow::Context;
use bstr::ByteSlice;
use tokio::process::Command;

/// Runs a scheduler command and returns its standard output.
///
/// The child is killed if the returned future is dropped. A non-zero exit code is turned into
/// an error that carries the exit code and both output streams.
pub async fn run_command(program: &str, args: &[&str]) -> anyhow::Result<String> {
    log::info!("Running `{program} {}`", args.join(" "));

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Cannot start `{program}`"))?;
    ensure_success(program, &output)?;
    Ok(output.stdout.to_str_lossy().into_owned())
}

fn ensure_success(program: &str, output: &Output) -> anyhow::Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let code = match output.status.code() {
        Some(code) => code.to_string(),
        None => "none (terminated by a signal)".to_string(),
    };
    anyhow::bail!(
        "`{program}` failed with exit code {code}\nStderr: {}\nStdout: {}",
        output.stderr.to_str_lossy().trim(),
        output.stdout.to_str_lossy().trim()
    )
}

#[cfg(test)]
mod tests {
    use crate::holder::handler::common::run_command;

    #[tokio::test]
    async fn command_output() {
        let output = run_command("sh", &["-c", "echo 1 2 3"]).await.unwrap();
        assert_eq!(output, "1 2 3\n");
    }

    #[tokio::test]
    async fn failing_command() {
        let error = run_command("sh", &["-c", "echo out; echo err >&2; exit 3"])
            .await
            .unwrap_err();
        insta::assert_snapshot!(format!("{error}"), @r"
        `sh` failed with exit code 3
        Stderr: err
        Stdout: out
        ");
    }

    #[tokio::test]
    async fn missing_program() {
        let error = run_command("jobholder-missing-program", &[])
            .await
            .unwrap_err();
        assert!(format!("{error}").contains("Cannot start"));
    }
}
