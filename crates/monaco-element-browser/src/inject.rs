//! Script and stylesheet injection into the sandbox frame's document.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlIFrameElement, HtmlScriptElement};

use monaco_element_core::{BootstrapError, DocumentInjector, ScriptSource};

/// [`DocumentInjector`] over a same-origin frame document.
pub struct FrameInjector {
    document: Document,
}

impl FrameInjector {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Injector for the document currently loaded in `frame`.
    pub fn for_frame(frame: &HtmlIFrameElement) -> Result<Self, BootstrapError> {
        frame
            .content_document()
            .map(Self::new)
            .ok_or(BootstrapError::NoDocument)
    }

    fn append_to_head(&self, what: &'static str, node: &web_sys::Node) -> Result<(), BootstrapError> {
        let parent: web_sys::Node = match self.document.head() {
            Some(head) => head.into(),
            None => self
                .document
                .document_element()
                .ok_or(BootstrapError::NoDocument)?
                .into(),
        };
        parent.append_child(node).map_err(|e| dom_error(what, e))?;
        Ok(())
    }
}

fn dom_error(what: &'static str, e: JsValue) -> BootstrapError {
    BootstrapError::Dom {
        what,
        reason: format!("{:?}", e),
    }
}

impl DocumentInjector for FrameInjector {
    fn create_container(&self, id: &str) -> Result<(), BootstrapError> {
        let body = self.document.body().ok_or(BootstrapError::NoDocument)?;
        if self.document.get_element_by_id(id).is_some() {
            return Ok(());
        }
        let container = self
            .document
            .create_element("div")
            .map_err(|e| dom_error("container", e))?;
        container.set_id(id);
        body.append_child(&container)
            .map_err(|e| dom_error("container", e))?;
        Ok(())
    }

    fn inject_stylesheet(&self, rules: &str) -> Result<(), BootstrapError> {
        let style = self
            .document
            .create_element("style")
            .map_err(|e| dom_error("stylesheet", e))?;
        style.set_text_content(Some(rules));
        self.append_to_head("stylesheet", &style)
    }

    async fn inject_script(&self, source: &ScriptSource) -> Result<(), BootstrapError> {
        let script: HtmlScriptElement = self
            .document
            .create_element("script")
            .map_err(|e| dom_error("script", e))?
            .unchecked_into();

        match source {
            ScriptSource::Module(code) => {
                script.set_type("module");
                script.set_text(code).map_err(|e| dom_error("script", e))?;
                // Inline scripts fire no load event; they are queued on insert.
                self.append_to_head("script", &script)
            }
            ScriptSource::Url(src) => {
                // Wait for load/error before resolving.
                let promise = js_sys::Promise::new(&mut |resolve, reject| {
                    let onload = Closure::once_into_js(move || {
                        resolve.call0(&JsValue::NULL).ok();
                    });
                    let onerror = Closure::once_into_js(move || {
                        reject.call0(&JsValue::NULL).ok();
                    });
                    script.set_onload(Some(onload.unchecked_ref()));
                    script.set_onerror(Some(onerror.unchecked_ref()));
                });
                script.set_src(src);
                self.append_to_head("script", &script)?;

                JsFuture::from(promise)
                    .await
                    .map_err(|_| BootstrapError::ScriptLoad { src: src.clone() })?;
                tracing::debug!(%src, "script loaded");
                Ok(())
            }
        }
    }
}
