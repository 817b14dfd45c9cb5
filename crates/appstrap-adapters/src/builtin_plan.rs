//! The built-in Rails plan.
//!
//! Used when a template source ships no `appstrap.toml`. Files it names
//! (`Gemfile.tt`, `config/locales`, ...) are read from the template
//! source directory; see `templates/rails` in this repository for a
//! matching asset set.
//!
//! # Step order
//!
//! 1. Project files: `.ruby-version`, `Gemfile`, `README.md` (forced)
//! 2. `bundle install`, unless `--skip-bundle`
//! 3. Helpers and localization
//! 4. Authentication with Devise (asked, default no)
//! 5. Bootstrap styling (asked, default no)
//! 6. `bin/rails db:create` when `db/migrate` has no migrations
//! 7. RSpec, with optional suggested settings (asked, default no)
//! 8. `bundle exec rubocop -a` (advisory)

use appstrap_core::domain::{
    Action, BootstrapPlan, OptionName, Pattern, Position, Precondition, Scope, Step,
};

pub const AUTHENTICATION_KEY: &str = "authentication";
pub const BOOTSTRAP_KEY: &str = "bootstrap";
pub const RSPEC_SETTINGS_KEY: &str = "rspec_settings";

/// Gems whose upstream requirement is kept in the rendered `Gemfile`.
pub const CAPTURED_GEMS: &[&str] = &["rails", "puma", "sqlite3", "webpacker", "bootsnap"];

const APPLICATION_ANCHOR: &str = "class Application < Rails::Application\n";
const LOCALE_CONFIG: &str = "    config.i18n.default_locale = :{{LOCALE}}\n    \
                             config.i18n.load_path += Dir[Rails.root.join(\"config\", \"locales\", \"**\", \"*.yml\")]\n";

const PACK_ANCHOR: &str = "require(\"channels\")\n";

fn render(src: &str, dst: &str) -> Action {
    Action::RenderTemplate {
        src: src.into(),
        dst: dst.into(),
        overwrite: true,
    }
}

fn ask(question: &str, key: &str) -> Action {
    Action::PromptYesNo {
        question: question.into(),
        default: false,
        key: key.into(),
    }
}

fn confirmed(key: &str) -> Precondition {
    Precondition::Confirmed { key: key.into() }
}

/// The Rails plan, in execution order.
pub fn rails_plan() -> BootstrapPlan {
    let mut plan = BootstrapPlan::new("rails");
    for gem in CAPTURED_GEMS {
        plan = plan.capture_gem(*gem);
    }

    plan.step(
        Step::new("Project files")
            .then(render("ruby-version.tt", ".ruby-version"))
            .then(render("Gemfile.tt", "Gemfile"))
            .then(render("README.md.tt", "README.md")),
    )
    .step(
        Step::new("Install dependencies")
            .when(Precondition::OptionDisabled {
                option: OptionName::SkipBundle,
            })
            .then(Action::command(["bundle", "install"])),
    )
    .step(Step::new("Helpers").then(Action::CopyFile {
        src: "app/helpers/application_helper.rb".into(),
        dst: "app/helpers/application_helper.rb".into(),
        overwrite: true,
    }))
    .step(
        Step::new("Localization")
            .when(Precondition::PathPresent {
                path: "config/application.rb".into(),
            })
            .then(Action::CopyTree {
                src: "config/locales".into(),
                dst: "config/locales".into(),
                overwrite: false,
            })
            .then(Action::InjectAnchor {
                file: "config/application.rb".into(),
                anchor: APPLICATION_ANCHOR.into(),
                position: Position::After,
                content: LOCALE_CONFIG.into(),
            }),
    )
    .step(Step::new("Ask about authentication").then(ask(
        "Do you want to add authentication with Devise?",
        AUTHENTICATION_KEY,
    )))
    .step(
        Step::new("Authentication")
            .when(confirmed(AUTHENTICATION_KEY))
            .then(Action::command(["bundle", "add", "devise"]))
            .then(Action::command(["bin/rails", "generate", "devise:install"]))
            .then(Action::command(["bin/rails", "generate", "devise", "User"]))
            .then(Action::CopyFile {
                src: "app/controllers/users/sessions_controller.rb".into(),
                dst: "app/controllers/users/sessions_controller.rb".into(),
                overwrite: true,
            })
            .then(render("db/seeds.rb.tt", "db/seeds.rb"))
            .then(Action::SubstitutePattern {
                file: "config/routes.rb".into(),
                pattern: Pattern::Literal("devise_for :users".into()),
                replacement: "devise_for :users, controllers: { sessions: \"users/sessions\" }"
                    .into(),
                scope: Scope::First,
            }),
    )
    .step(Step::new("Ask about styling").then(ask(
        "Do you want to use Bootstrap for styling?",
        BOOTSTRAP_KEY,
    )))
    .step(
        Step::new("Bootstrap")
            .when(confirmed(BOOTSTRAP_KEY))
            .then(Action::command(["yarn", "add", "bootstrap", "jquery", "popper.js"]))
            .then(Action::InjectAnchor {
                file: "app/javascript/packs/application.js".into(),
                anchor: PACK_ANCHOR.into(),
                position: Position::After,
                content: "import \"bootstrap\"\n".into(),
            })
            .then(Action::SubstitutePattern {
                file: "app/assets/stylesheets/application.css".into(),
                pattern: Pattern::Literal(" *= require_self".into()),
                replacement: " *= require bootstrap\n *= require_self".into(),
                scope: Scope::First,
            }),
    )
    .step(
        Step::new("Database")
            .when(Precondition::NoFilesWithExtension {
                dir: "db/migrate".into(),
                extension: "rb".into(),
            })
            .then(Action::command(["bin/rails", "db:create"])),
    )
    .step(
        Step::new("RSpec")
            .then(Action::command(["bin/rails", "generate", "rspec:install"]))
            .then(ask(
                "Do you want to apply RSpec suggested settings?",
                RSPEC_SETTINGS_KEY,
            )),
    )
    .step(
        Step::new("RSpec settings")
            .when(confirmed(RSPEC_SETTINGS_KEY))
            .then(Action::CopyTree {
                src: "spec".into(),
                dst: "spec".into(),
                overwrite: true,
            }),
    )
    .step(Step::new("Lint").then(Action::advisory_command([
        "bundle", "exec", "rubocop", "-a",
    ])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstrap_core::domain::CommandPolicy;

    #[test]
    fn builtin_plan_is_valid() {
        let plan = rails_plan();
        plan.validate().unwrap();
        assert_eq!(plan.capture_gems.len(), CAPTURED_GEMS.len());
    }

    #[test]
    fn prompts_come_before_the_steps_they_gate() {
        let plan = rails_plan();
        let position = |name: &str| plan.steps.iter().position(|s| s.name == name).unwrap();
        assert!(position("Ask about authentication") < position("Authentication"));
        assert!(position("Ask about styling") < position("Bootstrap"));
        assert!(position("RSpec") < position("RSpec settings"));
    }

    #[test]
    fn only_lint_is_advisory() {
        let advisory: Vec<_> = rails_plan()
            .steps
            .into_iter()
            .flat_map(|s| s.actions)
            .filter(|a| {
                matches!(
                    a,
                    Action::RunShellCommand {
                        policy: CommandPolicy::Advisory,
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(advisory, [Action::advisory_command(["bundle", "exec", "rubocop", "-a"])]);
    }

    #[test]
    fn dependency_install_respects_skip_bundle() {
        let plan = rails_plan();
        let install = plan
            .steps
            .iter()
            .find(|s| s.name == "Install dependencies")
            .unwrap();
        assert_eq!(
            install.precondition,
            Some(Precondition::OptionDisabled {
                option: OptionName::SkipBundle
            })
        );
    }
}
