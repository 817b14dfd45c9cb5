//! `appstrap plan`: show what a template would do.

use tracing::instrument;

use appstrap_core::domain::BootstrapPlan;

use crate::{
    cli::{PlanArgs, PlanFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(args: PlanArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let origin = super::template_origin(args.template, &config);
    let plan = super::orchestrator(&config, true)?.preview(&origin)?;

    match args.format {
        PlanFormat::Json => {
            let json = serde_json::to_string_pretty(&plan).map_err(|e| CliError::IoError {
                message: "cannot serialise plan".into(),
                source: e.into(),
            })?;
            output.data(&json)?;
        }
        PlanFormat::Table => print_plan(&plan, &output)?,
    }
    Ok(())
}

/// Print a plan as a numbered step list.
pub fn print_plan(plan: &BootstrapPlan, output: &OutputManager) -> CliResult<()> {
    output.header(&format!(
        "Plan '{}': {} steps, {} actions",
        plan.name,
        plan.steps.len(),
        plan.action_count()
    ))?;
    for line in describe(plan) {
        output.print(&line)?;
    }
    Ok(())
}

fn describe(plan: &BootstrapPlan) -> Vec<String> {
    let mut lines = Vec::new();
    if !plan.capture_gems.is_empty() {
        lines.push(format!("Keeps upstream requirements for: {}", plan.capture_gems.join(", ")));
    }
    let width = plan.steps.len().to_string().len();
    for (index, step) in plan.steps.iter().enumerate() {
        let mut heading = format!("{:>width$}. {}", index + 1, step.name);
        if let Some(precondition) = &step.precondition {
            heading.push_str(&format!("  ({precondition})"));
        }
        lines.push(heading);
        for action in &step.actions {
            lines.push(format!("{:width$}    {action}", ""));
        }
    }
    lines
}
