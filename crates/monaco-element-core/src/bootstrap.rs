//! Two-phase bootstrap of the sandbox document.
//!
//! The controller script calls into the global AMD `require` that the
//! engine's loader installs, so it may only be injected after the loader
//! script has finished loading.

use crate::config::ElementConfig;
use crate::error::BootstrapError;
use crate::platform::DocumentInjector;

/// Id of the element the editor mounts into.
pub const CONTAINER_ID: &str = "container";

/// Full-height container, no scrollbars on the frame itself.
pub const SANDBOX_STYLESHEET: &str = "html, body, #container { \
height: 100%; margin: 0; padding: 0; overflow: hidden; }";

/// A script to insert into the sandbox document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptSource {
    /// External classic script; completion is its `load` event.
    Url(String),
    /// Inline module script; completes as soon as it is inserted.
    Module(String),
}

impl ScriptSource {
    /// Short description for logs and errors.
    pub fn describe(&self) -> String {
        match self {
            ScriptSource::Url(url) => url.clone(),
            ScriptSource::Module(_) => "<inline module>".to_owned(),
        }
    }
}

/// Everything the injector needs to prepare one sandbox document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub container_id: &'static str,
    pub stylesheet: &'static str,
    pub loader: ScriptSource,
    pub controller: ScriptSource,
}

impl BootstrapPlan {
    pub fn from_config(config: &ElementConfig) -> Result<Self, BootstrapError> {
        Ok(Self {
            container_id: CONTAINER_ID,
            stylesheet: SANDBOX_STYLESHEET,
            loader: ScriptSource::Url(config.loader_url()),
            controller: ScriptSource::Module(controller_source(config)?),
        })
    }
}

/// Source of the inline module that starts the sandbox controller.
///
/// The config is embedded as a JSON literal, which is also a valid JS object
/// literal.
pub fn controller_source(config: &ElementConfig) -> Result<String, BootstrapError> {
    let module = serde_json::to_string(&config.controller_module).map_err(dom_err)?;
    let options = serde_json::to_string(config).map_err(dom_err)?;
    Ok(format!(
        "import init, {{ startSandbox }} from {module};\n\
         await init();\n\
         startSandbox({options});\n"
    ))
}

fn dom_err(e: serde_json::Error) -> BootstrapError {
    BootstrapError::Dom {
        what: "controller script",
        reason: e.to_string(),
    }
}

/// Run the bootstrap sequence: container, loader, then stylesheet and
/// controller.
pub async fn bootstrap<I: DocumentInjector>(
    injector: &I,
    plan: &BootstrapPlan,
) -> Result<(), BootstrapError> {
    injector.create_container(plan.container_id)?;

    tracing::debug!(loader = %plan.loader.describe(), "loading engine loader");
    injector.inject_script(&plan.loader).await?;

    injector.inject_stylesheet(plan.stylesheet)?;
    injector.inject_script(&plan.controller).await?;
    tracing::debug!("sandbox bootstrap complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, PartialEq)]
    enum Step {
        Container(String),
        Stylesheet,
        Script(ScriptSource),
    }

    #[derive(Default)]
    struct RecordingInjector {
        steps: RefCell<Vec<Step>>,
        fail_url: Option<String>,
    }

    impl DocumentInjector for RecordingInjector {
        fn create_container(&self, id: &str) -> Result<(), BootstrapError> {
            self.steps.borrow_mut().push(Step::Container(id.to_owned()));
            Ok(())
        }

        fn inject_stylesheet(&self, rules: &str) -> Result<(), BootstrapError> {
            assert!(rules.contains("overflow: hidden"));
            self.steps.borrow_mut().push(Step::Stylesheet);
            Ok(())
        }

        async fn inject_script(&self, source: &ScriptSource) -> Result<(), BootstrapError> {
            if let (ScriptSource::Url(url), Some(bad)) = (source, &self.fail_url) {
                if url == bad {
                    return Err(BootstrapError::ScriptLoad { src: url.clone() });
                }
            }
            self.steps.borrow_mut().push(Step::Script(source.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_loader_runs_before_controller() {
        let injector = RecordingInjector::default();
        let plan = BootstrapPlan::from_config(&ElementConfig::default()).unwrap();
        bootstrap(&injector, &plan).await.unwrap();

        let steps = injector.steps.into_inner();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0], Step::Container("container".into()));
        assert_eq!(
            steps[1],
            Step::Script(ScriptSource::Url(
                "/node_modules/monaco-editor/min/vs/loader.js".into()
            ))
        );
        assert_eq!(steps[2], Step::Stylesheet);
        assert!(matches!(&steps[3], Step::Script(ScriptSource::Module(_))));
    }

    #[tokio::test]
    async fn test_loader_failure_stops_bootstrap() {
        let config = ElementConfig {
            lib_path: "/missing/vs".into(),
            ..Default::default()
        };
        let injector = RecordingInjector {
            fail_url: Some(config.loader_url()),
            ..Default::default()
        };
        let plan = BootstrapPlan::from_config(&config).unwrap();
        let err = bootstrap(&injector, &plan).await.unwrap_err();
        assert!(matches!(err, BootstrapError::ScriptLoad { ref src } if src == "/missing/vs/loader.js"));
        // Only the container was created; the controller never ran.
        assert_eq!(injector.steps.into_inner().len(), 1);
    }

    #[test]
    fn test_controller_source_embeds_config() {
        let config = ElementConfig {
            controller_module: "/pkg/monaco_element_js.js".into(),
            lib_path: "/vs".into(),
            ..Default::default()
        };
        let src = controller_source(&config).unwrap();
        assert!(src.starts_with("import init, { startSandbox } from \"/pkg/monaco_element_js.js\";"));
        assert!(src.contains("await init();"));
        assert!(src.contains(r#""libPath":"/vs""#));
        assert!(src.contains(r#""heightPolicy":"clamp""#));
    }
}
