//! Command dispatch and handlers.

pub mod build;
pub mod diff;
pub mod list;

use std::future::Future;

use crate::cli::Command;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::contract::builder::BuildRequest;
use crate::store::ListFilter;

/// Dispatch a parsed command to its handler against the live filesystem.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command, settings: &Settings) -> Result<(), String> {
    let ctx = ServiceContext::live();
    dispatch_with_context(command, &ctx, settings)
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(command: &Command, ctx: &ServiceContext, settings: &Settings) -> Result<(), String> {
    let output = match command {
        Command::Build { typescript, template, styles, print } => {
            let request = BuildRequest {
                typescript: typescript.clone(),
                template: template.clone(),
                styles: styles.clone(),
            };
            build::execute(ctx, &settings.contracts_dir, &request, *print)?
        }
        Command::Diff { before, after, dedup } => {
            diff::execute(ctx, &settings.contracts_dir, before, after, *dedup)?
        }
        Command::List { component, limit } => {
            let filter = ListFilter { component: component.clone(), limit: *limit };
            list::execute(ctx, &settings.contracts_dir, &filter)?
        }
    };
    print!("{output}");
    Ok(())
}

/// Drives `future` to completion on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_on_runs_a_future_to_completion() {
        assert_eq!(block_on(async { 40 + 2 }), Ok(42));
    }
}
