//! End-to-end runs of the orchestrator over the in-memory adapters.

use std::path::Path;

use appstrap_adapters::{
    ManifestPlanLoader, RecordingRunner, ScriptedAnswer, ScriptedPrompter, SimpleRenderer,
};
use appstrap_core::{
    application::{
        ApplicationError, BootstrapPolicy, BootstrapRequest, Orchestrator,
        testing::MemoryFilesystem,
        ports::{Filesystem, ResolvedSource, SourceResolver},
    },
    domain::{DomainError, GeneratorOptions, GitOpKind, RepoState},
    error::{AppstrapError, AppstrapResult},
};

const TEMPLATE: &str = "/template";
const APP: &str = "/work/blog";

/// Always resolves to the in-memory template directory.
struct FixedSource;

impl SourceResolver for FixedSource {
    fn resolve(&self, _origin: &str) -> AppstrapResult<ResolvedSource> {
        Ok(ResolvedSource::local(TEMPLATE))
    }
}

fn template_fs() -> MemoryFilesystem {
    MemoryFilesystem::new()
        .with_file("/template/ruby-version.tt", "2.7.1\n")
        .with_file(
            "/template/Gemfile.tt",
            "source \"https://rubygems.org\"\n\ngem \"rails\"{{GEM_RAILS_REQUIREMENT}}\ngem \"puma\"{{GEM_PUMA_REQUIREMENT}}\n",
        )
        .with_file("/template/README.md.tt", "# {{APP_NAME_PASCAL}}\n")
        .with_file(
            "/template/app/helpers/application_helper.rb",
            "module ApplicationHelper\nend\n",
        )
        .with_file("/template/config/locales/en.yml", "en:\n  hello: \"Hello\"\n")
        .with_file(
            "/template/app/controllers/users/sessions_controller.rb",
            "module Users\nend\n",
        )
        .with_file(
            "/template/db/seeds.rb.tt",
            "User.create!(email: \"admin@{{APP_NAME_KEBAB}}.example.com\")\n",
        )
        .with_file("/template/spec/models/user_spec.rb", "RSpec.describe User\n")
        // Output of the upstream generator.
        .with_file(
            "/work/blog/Gemfile",
            "source 'https://rubygems.org'\ngem 'rails', '~> 6.0.3', '>= 6.0.3.2'\ngem 'puma', '~> 4.1'\n",
        )
        .with_file(
            "/work/blog/config/application.rb",
            "module Blog\n  class Application < Rails::Application\n    config.load_defaults 6.0\n  end\nend\n",
        )
        .with_file(
            "/work/blog/config/routes.rb",
            "Rails.application.routes.draw do\n  devise_for :users\nend\n",
        )
        .with_dir("/work/blog/db/migrate")
}

fn orchestrator(
    fs: &MemoryFilesystem,
    runner: &RecordingRunner,
    prompter: &ScriptedPrompter,
) -> Orchestrator {
    Orchestrator::new(
        Box::new(fs.clone()),
        Box::new(runner.clone()),
        Box::new(prompter.clone()),
        Box::new(FixedSource),
        Box::new(ManifestPlanLoader::new(fs.clone())),
        Box::new(SimpleRenderer::new()),
    )
}

fn request() -> BootstrapRequest {
    BootstrapRequest::new("blog", APP, TEMPLATE).with_toolchain_version("6.0.3")
}

fn read(fs: &MemoryFilesystem, relative: &str) -> String {
    fs.read_file(Path::new(APP).join(relative))
        .unwrap_or_else(|| panic!("{relative} was not written"))
}

#[test]
fn non_interactive_run_applies_builtin_plan_and_commits() {
    let fs = template_fs();
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::non_interactive();

    let report = orchestrator(&fs, &runner, &prompter)
        .bootstrap(request())
        .unwrap();

    assert_eq!(
        runner.commands(),
        [
            "bundle install",
            "bin/rails db:create",
            "bin/rails generate rspec:install",
            "bundle exec rubocop -a",
            "git init",
            "git add -A .",
            "git commit -m Project setup",
        ]
    );
    assert_eq!(read(&fs, ".ruby-version"), "2.7.1\n");
    assert_eq!(
        read(&fs, "Gemfile"),
        "source \"https://rubygems.org\"\n\ngem \"rails\", \"~> 6.0.3\"\ngem \"puma\", \"~> 4.1\"\n"
    );
    assert_eq!(read(&fs, "README.md"), "# Blog\n");
    assert!(read(&fs, "config/application.rb")
        .contains("Rails::Application\n    config.i18n.default_locale = :en\n"));
    assert!(fs.exists(&Path::new(APP).join("config/locales/en.yml")));
    assert!(!fs.exists(&Path::new(APP).join("db/seeds.rb")));

    let git = report.git.as_ref().unwrap();
    assert_eq!(git.initial_state, RepoState::NoRepo);
    assert_eq!(git.remote, None);
    assert_eq!(report.success_message(), "Your app blog has been successfully created!");
}

#[test]
fn confirmed_features_run_their_steps_and_push_to_remote() {
    let fs = template_fs();
    let runner = RecordingRunner::new();
    let prompter = ScriptedPrompter::new([
        ScriptedAnswer::Yes,
        ScriptedAnswer::No,
        ScriptedAnswer::Yes,
        ScriptedAnswer::Text("git@github.com:acme/blog.git".into()),
    ]);

    let report = orchestrator(&fs, &runner, &prompter)
        .bootstrap(request().with_locale("fr"))
        .unwrap();

    let commands = runner.commands();
    assert!(commands.contains(&"bundle add devise".to_string()));
    assert!(commands.contains(&"bin/rails generate devise User".to_string()));
    assert!(!commands.iter().any(|c| c.starts_with("yarn")));
    assert_eq!(
        commands[commands.len() - 2..],
        [
            "git remote add origin git@github.com:acme/blog.git",
            "git push -u origin --all",
        ]
    );

    assert_eq!(
        prompter.asked(),
        [
            "Do you want to add authentication with Devise?",
            "Do you want to use Bootstrap for styling?",
            "Do you want to apply RSpec suggested settings?",
            "What is the git remote URL for this project?",
        ]
    );
    assert_eq!(
        read(&fs, "db/seeds.rb"),
        "User.create!(email: \"admin@blog.example.com\")\n"
    );
    assert!(read(&fs, "config/routes.rb").contains("controllers: { sessions: \"users/sessions\" }"));
    assert!(read(&fs, "config/application.rb").contains("default_locale = :fr"));
    assert!(fs.exists(&Path::new(APP).join("spec/models/user_spec.rb")));
    assert!(report
        .git
        .unwrap()
        .operations
        .contains(&GitOpKind::AddRemote {
            url: "git@github.com:acme/blog.git".into()
        }));
}

#[test]
fn unsupported_option_fails_before_anything_is_touched() {
    let fs = template_fs();
    let runner = RecordingRunner::new();
    let options = GeneratorOptions {
        skip_bundle: Some(true),
        ..GeneratorOptions::default()
    };

    let err = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(request().with_options(options))
        .unwrap_err();

    assert!(matches!(
        err,
        AppstrapError::Domain(DomainError::UnsupportedOption {
            name: "skip_bundle",
            expected: false,
            actual: true,
        })
    ));
    assert_eq!(fs.write_count(), 0);
    assert!(runner.commands().is_empty());
}

#[test]
fn skip_bundle_skips_install_when_the_policy_allows_it() {
    let fs = template_fs();
    let runner = RecordingRunner::new();
    let policy = BootstrapPolicy {
        expected_options: GeneratorOptions {
            skip_bundle: None,
            ..GeneratorOptions::supported()
        },
        ..BootstrapPolicy::default()
    };
    let options = GeneratorOptions {
        skip_bundle: Some(true),
        ..GeneratorOptions::default()
    };

    let report = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .with_policy(policy)
        .bootstrap(request().with_options(options))
        .unwrap();

    assert!(!runner.commands().contains(&"bundle install".to_string()));
    let install = report
        .steps
        .iter()
        .find(|s| s.name == "Install dependencies")
        .unwrap();
    assert!(install.was_skipped());
}

#[test]
fn old_toolchain_is_rejected_when_non_interactive() {
    let fs = template_fs();
    let runner = RecordingRunner::new();

    let err = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(request().with_toolchain_version("5.2.4"))
        .unwrap_err();

    match err {
        AppstrapError::Domain(DomainError::VersionIncompatible { detected, .. }) => {
            assert_eq!(detected, "5.2.4")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs.write_count(), 0);
}

#[test]
fn detected_toolchain_version_comes_from_the_version_command() {
    let fs = template_fs();
    let runner = RecordingRunner::new().with_probe("rails --version", "Rails 6.0.3.4\n");

    let result = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(BootstrapRequest::new("blog", APP, TEMPLATE));

    assert!(result.is_ok(), "{result:?}");
}

#[test]
fn fatal_command_failure_aborts_without_rollback() {
    let fs = template_fs();
    let runner = RecordingRunner::new().failing("bin/rails db:create");

    let err = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(request())
        .unwrap_err();

    match err {
        AppstrapError::Application(ApplicationError::CommandFailed { command, code, .. }) => {
            assert_eq!(command, "bin/rails db:create");
            assert_eq!(code, Some(1));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(read(&fs, ".ruby-version"), "2.7.1\n");
    assert!(!runner.commands().iter().any(|c| c.starts_with("git")));
}

#[test]
fn advisory_lint_failure_does_not_stop_the_run() {
    let fs = template_fs();
    let runner = RecordingRunner::new().failing("bundle exec rubocop");

    let report = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(request())
        .unwrap();

    assert_eq!(report.advisory_failures().count(), 1);
    assert!(report.git.is_some());
}

#[test]
fn existing_history_leaves_git_alone() {
    let fs = template_fs().with_dir("/work/blog/.git");
    let runner = RecordingRunner::new().with_probe("git log", "1a2b3c4 Initial commit\n");

    let report = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(request())
        .unwrap();

    assert!(!runner.commands().iter().any(|c| c.starts_with("git")));
    let git = report.git.unwrap();
    assert_eq!(git.initial_state, RepoState::RepoWithCommits);
    assert!(git.operations.is_empty());
}

#[test]
fn existing_migrations_skip_database_creation() {
    let fs = template_fs().with_file("/work/blog/db/migrate/20200101000000_create_users.rb", "");
    let runner = RecordingRunner::new();

    orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(request())
        .unwrap();

    assert!(!runner.commands().contains(&"bin/rails db:create".to_string()));
}

#[test]
fn template_manifest_replaces_builtin_plan() {
    let fs = template_fs().with_file(
        "/template/appstrap.toml",
        r#"
[plan]
name = "minimal"

[[steps]]
name = "Procfile"

[[steps.actions]]
create = "Procfile"

[[steps.actions]]
ask_text = "Which port?"
key = "port"
default = "3000"

[[steps.actions]]
run = ["bin/rails", "server", "-p", "{{PORT}}"]
"#,
    );
    let runner = RecordingRunner::new();

    let report = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(request().with_remote("skip"))
        .unwrap();

    assert_eq!(report.plan.name, "minimal");
    assert!(fs.exists(&Path::new(APP).join("Procfile")));
    assert_eq!(runner.commands()[0], "bin/rails server -p 3000");
}

#[test]
fn dry_run_changes_nothing() {
    let fs = template_fs();
    let runner = RecordingRunner::new();

    let report = orchestrator(&fs, &runner, &ScriptedPrompter::non_interactive())
        .bootstrap(request().dry_run(true))
        .unwrap();

    assert!(report.dry_run);
    assert!(report.steps.is_empty());
    assert_eq!(fs.write_count(), 0);
    assert!(runner.commands().is_empty());
}
