//! Implementation of the `appstrap new` command.
//!
//! Responsibility: translate CLI arguments and config into a
//! `BootstrapRequest`, run the orchestrator, and display the report. No
//! business logic lives here.

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use appstrap_core::application::{ActionOutcome, BootstrapReport, BootstrapRequest};

use crate::{
    cli::NewArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `appstrap new` command.
///
/// 1. Validate the application name and resolve the target directory
/// 2. Merge flags over config into a `BootstrapRequest`
/// 3. Run the orchestrator (gates, plan, git)
/// 4. Print the report and next steps
#[instrument(skip_all, fields(app = %args.name))]
pub fn execute(args: NewArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    validate_app_name(&args.name)?;
    let target = resolve_target(&args.name, args.path.clone());
    let request = build_request(&args, &config, target);

    debug!(
        target = %request.target_root.display(),
        template = %request.template_origin,
        dry_run = request.dry_run,
        "Request resolved"
    );

    let orchestrator = super::orchestrator(&config, args.non_interactive)?;

    if !request.dry_run {
        output.header(&format!("Bootstrapping '{}'...", request.app_name))?;
    }
    info!(app = %request.app_name, "Bootstrap started");

    let report = orchestrator.bootstrap(request)?;

    if report.dry_run {
        show_dry_run(&report, &output)
    } else {
        show_report(&report, &output)
    }
}

// ── Request construction ──────────────────────────────────────────────────────

fn resolve_target(name: &str, path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| PathBuf::from(".").join(name))
}

fn build_request(args: &NewArgs, config: &AppConfig, target: PathBuf) -> BootstrapRequest {
    let origin = super::template_origin(args.template.clone(), config);
    let locale = args
        .locale
        .clone()
        .unwrap_or_else(|| config.bootstrap.locale.clone());

    let mut request = BootstrapRequest::new(&args.name, target, origin)
        .with_options(args.options.into())
        .with_locale(locale)
        .dry_run(args.dry_run);

    if let Some(remote) = args.remote.as_ref().or(config.bootstrap.remote.as_ref()) {
        request = request.with_remote(remote);
    }
    if let Some(version) = args
        .toolchain_version
        .as_ref()
        .or(config.bootstrap.toolchain_version.as_ref())
    {
        request = request.with_toolchain_version(version);
    }
    request
}

fn validate_app_name(name: &str) -> CliResult<()> {
    let invalid = |reason: &str| CliError::InvalidAppName {
        name: name.into(),
        reason: reason.into(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.starts_with('.') {
        return Err(invalid("name cannot start with '.'"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("name cannot contain path separators"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("name cannot contain whitespace"));
    }
    Ok(())
}

// ── Report rendering ──────────────────────────────────────────────────────────

fn show_dry_run(report: &BootstrapReport, output: &OutputManager) -> CliResult<()> {
    output.info(&format!(
        "Dry run: would bootstrap '{}' at {} from {}",
        report.app_name,
        report.target_root.display(),
        report.source
    ))?;
    super::plan::print_plan(&report.plan, output)?;
    output.info("Nothing was changed.")?;
    Ok(())
}

fn show_report(report: &BootstrapReport, output: &OutputManager) -> CliResult<()> {
    for step in &report.steps {
        match &step.skipped {
            Some(reason) => output.dim(&format!("- {} (skipped: {reason})", step.name))?,
            None => output.success(&step.name)?,
        }
    }

    for failure in report.advisory_failures() {
        if let ActionOutcome::Failed(reason) = &failure.outcome {
            output.warning(&format!("{} failed: {reason}", failure.action))?;
        }
    }

    if let Some(git) = &report.git {
        if git.operations.is_empty() {
            output.info(&format!("Git: left as is ({})", git.initial_state))?;
        } else {
            output.info(&format!("Git: {} operations", git.operations.len()))?;
        }
        if let Some(remote) = &git.remote {
            output.info(&format!("Pushed to {remote}"))?;
        }
    }

    output.print("")?;
    output.success(&report.success_message())?;

    if !output.is_quiet() {
        output.print("")?;
        output.print("Next steps:")?;
        output.print(&format!("  cd {}", report.target_root.display()))?;
        output.print("  bin/rails server")?;
    }

    info!(run_id = %report.run_id, applied = report.applied_steps(), "Bootstrap reported");
    Ok(())
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::GeneratorFlags;
    use appstrap_core::domain::GeneratorOptions;

    fn args(name: &str) -> NewArgs {
        NewArgs {
            name: name.into(),
            path: None,
            template: None,
            remote: None,
            locale: None,
            options: GeneratorFlags::default(),
            toolchain_version: None,
            non_interactive: true,
            dry_run: false,
        }
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", " ", ".hidden", "a/b", "a\\b", "my app"] {
            assert!(
                matches!(validate_app_name(name), Err(CliError::InvalidAppName { .. })),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_generator_style_names() {
        for name in ["blog", "my_shop", "admin-portal", "app2"] {
            assert!(validate_app_name(name).is_ok());
        }
    }

    #[test]
    fn target_defaults_to_app_name_under_cwd() {
        assert_eq!(resolve_target("blog", None), PathBuf::from("./blog"));
        assert_eq!(
            resolve_target("blog", Some(PathBuf::from("/srv/blog"))),
            PathBuf::from("/srv/blog")
        );
    }

    #[test]
    fn flags_override_config() {
        let mut config = AppConfig::default();
        config.bootstrap.template = Some("/opt/templates/rails".into());
        config.bootstrap.remote = Some("skip".into());
        config.bootstrap.locale = "de".into();

        let mut cli = args("blog");
        cli.locale = Some("fr".into());
        cli.template = Some("./tpl".into());

        let request = build_request(&cli, &config, PathBuf::from("./blog"));
        assert_eq!(request.locale, "fr");
        assert_eq!(request.template_origin, "./tpl");
        assert_eq!(request.remote.as_deref(), Some("skip"));
        assert_eq!(request.options, GeneratorOptions::default());
    }

    #[test]
    fn config_fills_missing_flags() {
        let mut config = AppConfig::default();
        config.bootstrap.toolchain_version = Some("6.0.3".into());

        let request = build_request(&args("blog"), &config, PathBuf::from("./blog"));
        assert_eq!(request.template_origin, ".");
        assert_eq!(request.locale, "en");
        assert_eq!(request.remote, None);
        assert_eq!(request.toolchain_version.as_deref(), Some("6.0.3"));
    }
}
