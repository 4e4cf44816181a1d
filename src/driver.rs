//! One rendering run: collect the context, then render every template root.

use std::process::ExitCode;

use tracing::{debug, info, warn};

use crate::context::collect_context;
use crate::render::render_templates;
use crate::settings::Settings;

/// Failure counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
    pub context_failures: usize,
    pub render_failures: usize,
}

impl Report {
    pub fn failures(&self) -> usize {
        self.context_failures + self.render_failures
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Collects the context from `settings.context` and renders `settings.templates` with it.
///
/// Templates are rendered even when some context sources failed; the report
/// carries both counts.
pub fn run(settings: &Settings) -> Report {
    debug!(?settings, "starting run");

    let (context_failures, context) = collect_context(&settings.context, settings.encoding);
    info!(keys = context.len(), failures = context_failures, "collected context");

    let render_failures = render_templates(
        &settings.templates,
        &context,
        settings.engine,
        settings.template_extension(),
        settings.encoding,
    );

    let report = Report {
        context_failures,
        render_failures,
    };
    if report.is_success() {
        info!("all templates rendered");
    } else {
        warn!(
            context_failures = report.context_failures,
            render_failures = report.render_failures,
            "finished with failures"
        );
    }
    report
}
