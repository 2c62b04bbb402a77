//! `ohc list`: the read action on its own. Never reaches the gate.

use ohc_config::ConfigMode;
use ohc_execution::RemoteService;
use tracing::warn;

use super::{build_client, load_command_config, CommandError, ExitStatus, OrExit};

pub fn run_list(config_paths: &[String], strict_config: bool) -> Result<ExitStatus, CommandError> {
    let cfg = load_command_config(config_paths, ConfigMode::List, strict_config)?;
    let client = build_client(&cfg)?;

    let reply = client.list_tasks().or_exit(ExitStatus::Transport)?;

    println!("http_status={}", reply.http_status);
    println!("{}", reply.body);

    if reply.is_accepted() {
        Ok(ExitStatus::Ok)
    } else {
        warn!(
            http_status = reply.http_status,
            reason = %reply.failure_message(),
            "list_tasks rejected"
        );
        Ok(ExitStatus::Rejected)
    }
}
