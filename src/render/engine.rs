//! Handlebars adapter: strict variables, no escaping, script functions as helpers.

use handlebars::{
    Handlebars, Helper, HelperDef, RenderContext, RenderErrorReason, ScopedJson, TemplateError,
};
use serde_json::Value;
use tracing::warn;

use crate::context::Context;
use crate::source::ScriptFunction;

pub(crate) struct HandlebarsEngine {
    registry: Handlebars<'static>,
    data: Value,
}

impl HandlebarsEngine {
    pub(crate) fn new(context: &Context) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Output is configuration, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        for (name, function) in context.functions() {
            if registry.get_helper(name).is_some() {
                warn!(function = %name, "context function shadows a built-in helper, skipping it");
                continue;
            }
            registry.register_helper(name, Box::new(FunctionHelper(function.clone())));
        }

        Self {
            registry,
            data: context.to_data(),
        }
    }

    pub(crate) fn load(&mut self, name: &str, text: &str) -> Result<(), TemplateError> {
        self.registry.register_template_string(name, text)
    }

    pub(crate) fn render(&self, name: &str) -> Result<String, handlebars::RenderError> {
        self.registry.render(name, &self.data)
    }

    pub(crate) fn unload(&mut self, name: &str) {
        self.registry.unregister_template(name);
    }
}

struct FunctionHelper(ScriptFunction);

impl HelperDef for FunctionHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc handlebars::Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, handlebars::RenderError> {
        let args: Vec<Value> = h.params().iter().map(|p| p.value().clone()).collect();
        self.0.call(&args).map(ScopedJson::Derived).map_err(|e| {
            RenderErrorReason::Other(format!("calling function '{}' failed: {e}", h.name())).into()
        })
    }
}
