//! Dynamic sources: Rhai scripts that compute context values or export functions.
//!
//! A script contributes to the context in one of two ways:
//!
//! - it defines `fn collect_context()` returning a map, which becomes the
//!   partial context (function pointers in the map become callables);
//! - it calls `register(Fn("name"))` or `register("alias", Fn("name"))` while it
//!   runs, and every exported function becomes a callable in the context.
//!
//! ```rhai
//! fn double(x) { x * 2 }
//! register(Fn("double"));
//! ```

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rhai::{CallFnOptions, Dynamic, Engine, EvalAltResult, FnPtr, ImmutableString, Map, Scope, AST};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::registry::FunctionRegistry;
use super::{ContextSource, SourceError};
use crate::context::{Context, ContextValue};
use crate::encoding::Encoding;

const COLLECT_CONTEXT: &str = "collect_context";

/// A function defined by a script, callable after the script has finished.
#[derive(Clone)]
pub struct ScriptFunction {
    function: FnPtr,
    engine: Arc<Engine>,
    ast: Arc<AST>,
}

impl ScriptFunction {
    fn new(function: FnPtr, engine: &Arc<Engine>, ast: &Arc<AST>) -> Self {
        Self {
            function,
            engine: Arc::clone(engine),
            ast: Arc::clone(ast),
        }
    }

    /// Name of the script function this callable invokes.
    pub fn name(&self) -> &str {
        self.function.fn_name()
    }

    /// Calls the function with JSON arguments and converts the result back to JSON.
    pub fn call(&self, args: &[Value]) -> Result<Value, Box<EvalAltResult>> {
        let args = args
            .iter()
            .map(|arg| rhai::serde::to_dynamic(arg))
            .collect::<Result<Vec<Dynamic>, _>>()?;
        let result: Dynamic = self.function.call(&self.engine, &self.ast, args)?;
        rhai::serde::from_dynamic(&result)
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScriptFunction").field(&self.name()).finish()
    }
}

impl PartialEq for ScriptFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && Arc::ptr_eq(&self.ast, &other.ast)
    }
}

/// Runs Rhai scripts, each in a fresh engine and scope.
///
/// The function registry is owned here and handed to every engine through its
/// `register` function; it is cleared before each script runs and drained after.
#[derive(Debug, Default)]
pub struct ScriptSource {
    registry: Arc<Mutex<FunctionRegistry>>,
}

impl ScriptSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of functions currently exported and not yet drained.
    pub fn pending_exports(&self) -> usize {
        self.registry().len()
    }

    fn registry(&self) -> MutexGuard<'_, FunctionRegistry> {
        lock(&self.registry)
    }

    fn engine(&self, path: &Path) -> Engine {
        let mut engine = Engine::new();

        let registry = Arc::clone(&self.registry);
        engine.register_fn("register", move |function: FnPtr| {
            let name = function.fn_name().to_string();
            lock(&registry).register(name, function);
        });
        let registry = Arc::clone(&self.registry);
        engine.register_fn("register", move |name: ImmutableString, function: FnPtr| {
            lock(&registry).register(name.as_str(), function);
        });

        let script = path.display().to_string();
        engine.on_print(move |text| info!(script = %script, "{text}"));
        let script = path.display().to_string();
        engine.on_debug(move |text, _source, position| {
            debug!(script = %script, %position, "{text}");
        });

        engine
    }

    fn call_collect_context(
        &self,
        path: &Path,
        engine: &Arc<Engine>,
        ast: &Arc<AST>,
        scope: &mut Scope,
    ) -> Result<Context, SourceError> {
        let options = CallFnOptions::new().eval_ast(false);
        let result = engine.call_fn_with_options::<Dynamic>(options, scope, ast, COLLECT_CONTEXT, ());
        // Exports made from inside collect_context() are not part of the context.
        self.registry().clear();
        let value = result.map_err(|e| SourceError::CollectContext {
            path: path.to_path_buf(),
            source: e,
        })?;

        if !value.is::<Map>() {
            return Err(SourceError::NonMapping {
                path: path.to_path_buf(),
                found: value.type_name(),
            });
        }

        value
            .cast::<Map>()
            .into_iter()
            .map(|(key, item)| {
                let key = key.to_string();
                if item.is::<FnPtr>() {
                    let function = ScriptFunction::new(item.cast::<FnPtr>(), engine, ast);
                    return Ok((key, ContextValue::Function(function)));
                }
                match rhai::serde::from_dynamic::<Value>(&item) {
                    Ok(data) => Ok((key, ContextValue::Data(data))),
                    Err(e) => Err(SourceError::Conversion {
                        path: path.to_path_buf(),
                        key,
                        source: e,
                    }),
                }
            })
            .collect()
    }
}

impl ContextSource for ScriptSource {
    fn load(&self, path: &Path, encoding: Encoding) -> Result<Context, SourceError> {
        let code = encoding
            .read_to_string(path)
            .map_err(|e| SourceError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;

        let engine = Arc::new(self.engine(path));
        let ast = engine.compile(&code).map_err(|e| SourceError::Compile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut scope = Scope::new();
        self.registry().clear();
        let run = engine.run_ast_with_scope(&mut scope, &ast);
        let exported = self.registry().drain();
        run.map_err(|e| SourceError::Execution {
            path: path.to_path_buf(),
            source: e,
        })?;

        let ast = Arc::new(ast);
        if ast.iter_functions().any(|f| f.name == COLLECT_CONTEXT) {
            return self.call_collect_context(path, &engine, &ast, &mut scope);
        }

        if exported.is_empty() {
            warn!(
                path = %path.display(),
                "script neither defines collect_context nor exports functions"
            );
            return Ok(Context::new());
        }

        exported
            .into_iter()
            .map(|(name, function)| {
                if !ast.iter_functions().any(|f| f.name == function.fn_name()) {
                    return Err(SourceError::UnknownFunction {
                        path: path.to_path_buf(),
                        name: function.fn_name().to_string(),
                    });
                }
                Ok((name, ContextValue::Function(ScriptFunction::new(function, &engine, &ast))))
            })
            .collect()
    }
}

fn lock(registry: &Mutex<FunctionRegistry>) -> MutexGuard<'_, FunctionRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
