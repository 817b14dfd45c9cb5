//! Simple variable substitution renderer.

use appstrap_core::{
    application::ports::TemplateRenderer, domain::RenderContext, error::AppstrapResult,
};
use tracing::instrument;

/// Renderer using `{{VARIABLE}}` substitution only.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(bytes = template.len()))]
    fn render(&self, template: &str, context: &RenderContext) -> AppstrapResult<String> {
        Ok(context.render(template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_builtin_and_custom_variables() {
        let ctx = RenderContext::new("blog").with_variable("GEM_PUMA_REQUIREMENT", ", \"~> 4.1\"");
        let out = SimpleRenderer::new()
            .render("gem 'puma'{{GEM_PUMA_REQUIREMENT}} # {{APP_NAME_PASCAL}}", &ctx)
            .unwrap();
        assert_eq!(out, "gem 'puma', \"~> 4.1\" # Blog");
    }
}
