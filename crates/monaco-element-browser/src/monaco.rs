//! Bindings to the Monaco editor, loaded through its AMD loader.
//!
//! Only the handful of calls the sandbox needs are bound. Everything is
//! resolved against the sandbox frame's globals at call time, after
//! [`load_engine`] has resolved.

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlElement, Window};

use monaco_element_core::{EditorEngine, EditorHandle, EditorOptions, EngineError, SmolStr};

/// AMD module that defines the `monaco` global.
const EDITOR_MAIN: &str = "vs/editor/editor.main";

#[wasm_bindgen]
extern "C" {
    /// `monaco.editor.IStandaloneCodeEditor`
    pub type CodeEditor;

    #[wasm_bindgen(js_namespace = ["monaco", "editor"], js_name = create, catch)]
    fn create_code_editor(container: &HtmlElement, options: &JsValue) -> Result<CodeEditor, JsValue>;

    #[wasm_bindgen(js_namespace = ["monaco", "editor"], js_name = setModelLanguage)]
    fn set_model_language(model: &TextModel, language: &str);

    #[wasm_bindgen(js_namespace = ["monaco", "editor"], js_name = setTheme)]
    fn set_global_theme(theme: &str);

    #[wasm_bindgen(method, js_name = getModel)]
    fn get_model(this: &CodeEditor) -> Option<TextModel>;

    #[wasm_bindgen(method)]
    fn layout(this: &CodeEditor);

    /// `monaco.editor.ITextModel`
    pub type TextModel;

    #[wasm_bindgen(method, js_name = getValue)]
    fn get_value(this: &TextModel) -> String;

    #[wasm_bindgen(method, js_name = setValue)]
    fn set_value(this: &TextModel, value: &str);

    #[wasm_bindgen(method, js_name = getLineCount)]
    fn get_line_count(this: &TextModel) -> u32;

    #[wasm_bindgen(method, js_name = onDidChangeContent)]
    fn on_did_change_content(this: &TextModel, listener: &js_sys::Function) -> Disposable;

    /// `monaco.IDisposable`
    pub type Disposable;

    #[wasm_bindgen(method)]
    fn dispose(this: &Disposable);
}

/// Construction options in Monaco's own shape.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOptions<'a> {
    value: &'a str,
    language: &'a str,
    theme: &'a str,
    minimap: Minimap,
    scroll_beyond_last_line: bool,
    automatic_layout: bool,
}

#[derive(Serialize)]
struct Minimap {
    enabled: bool,
}

impl<'a> From<&'a EditorOptions> for CreateOptions<'a> {
    fn from(options: &'a EditorOptions) -> Self {
        Self {
            value: &options.initial_value,
            language: &options.language,
            theme: &options.theme,
            minimap: Minimap {
                enabled: options.minimap,
            },
            scroll_beyond_last_line: options.scroll_beyond_last_line,
            automatic_layout: options.automatic_layout,
        }
    }
}

fn js_reason(e: &JsValue) -> String {
    e.as_string()
        .or_else(|| {
            e.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{:?}", e))
}

/// Configure the AMD loader and wait for the editor bundle.
///
/// Fails if the loader script has not installed a global `require`, or if
/// the loader reports an error for the bundle.
pub async fn load_engine(window: &Window, vs_path: &str) -> Result<(), EngineError> {
    let require = js_sys::Reflect::get(window, &JsValue::from_str("require"))
        .ok()
        .and_then(|r| r.dyn_into::<js_sys::Function>().ok())
        .ok_or_else(|| EngineError::Load("AMD loader did not install `require`".into()))?;

    let paths = js_sys::Object::new();
    js_sys::Reflect::set(&paths, &"vs".into(), &vs_path.into())
        .map_err(|e| EngineError::Load(js_reason(&e)))?;
    let config = js_sys::Object::new();
    js_sys::Reflect::set(&config, &"paths".into(), &paths)
        .map_err(|e| EngineError::Load(js_reason(&e)))?;
    let configure = js_sys::Reflect::get(&require, &"config".into())
        .ok()
        .and_then(|c| c.dyn_into::<js_sys::Function>().ok())
        .ok_or_else(|| EngineError::Load("`require.config` is missing".into()))?;
    configure
        .call1(&require, &config)
        .map_err(|e| EngineError::Load(js_reason(&e)))?;

    let deps = js_sys::Array::of1(&JsValue::from_str(EDITOR_MAIN));
    let mut call_error = None;
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        if let Err(e) = require.call3(&JsValue::NULL, &deps, &resolve, &reject) {
            call_error = Some(e);
        }
    });
    if let Some(e) = call_error {
        return Err(EngineError::Load(js_reason(&e)));
    }

    JsFuture::from(promise)
        .await
        .map_err(|e| EngineError::Load(js_reason(&e)))?;
    tracing::debug!(vs_path, "editor engine loaded");
    Ok(())
}

/// The loaded engine, bound to the container it creates editors in.
pub struct MonacoEngine {
    container: HtmlElement,
    body: Option<HtmlElement>,
}

impl MonacoEngine {
    /// Engine mounting into the element with `container_id` in `document`.
    pub fn new(document: &Document, container_id: &str) -> Result<Self, EngineError> {
        let container = document
            .get_element_by_id(container_id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| EngineError::MissingContainer(SmolStr::new(container_id)))?;
        Ok(Self {
            container,
            body: document.body(),
        })
    }
}

impl EditorEngine for MonacoEngine {
    type Editor = MonacoEditor;

    fn create_editor(&self, options: &EditorOptions) -> Result<MonacoEditor, EngineError> {
        let js_options = serde_wasm_bindgen::to_value(&CreateOptions::from(options))
            .map_err(|e| EngineError::Create(e.to_string()))?;
        let editor = create_code_editor(&self.container, &js_options)
            .map_err(|e| EngineError::Create(js_reason(&e)))?;
        let model = editor
            .get_model()
            .ok_or_else(|| EngineError::Create("editor has no model".into()))?;
        Ok(MonacoEditor {
            editor,
            model,
            container: self.container.clone(),
            body: self.body.clone(),
        })
    }
}

/// One live Monaco editor and its text model.
pub struct MonacoEditor {
    editor: CodeEditor,
    model: TextModel,
    container: HtmlElement,
    body: Option<HtmlElement>,
}

impl MonacoEditor {
    /// Call `on_change` after every content change, including ones caused
    /// by [`EditorHandle::set_value`].
    pub fn on_content_changed(&self, on_change: impl FnMut() + 'static) -> ContentSubscription {
        let closure = Closure::<dyn FnMut()>::new(on_change);
        let disposable = self
            .model
            .on_did_change_content(closure.as_ref().unchecked_ref());
        ContentSubscription {
            disposable,
            _closure: closure,
        }
    }
}

impl EditorHandle for MonacoEditor {
    fn get_value(&self) -> String {
        self.model.get_value()
    }

    fn set_value(&self, value: &str) {
        self.model.set_value(value);
    }

    fn set_language(&self, language: &str) {
        set_model_language(&self.model, language);
    }

    fn set_theme(&self, theme: &str) {
        // Themes are global to the frame's engine instance.
        set_global_theme(theme);
    }

    fn line_count(&self) -> u32 {
        self.model.get_line_count()
    }

    fn relayout(&self) {
        self.editor.layout();
    }

    fn resize(&self, height: u32) {
        let px = format!("{height}px");
        let styled = std::iter::once(&self.container).chain(self.body.as_ref());
        for element in styled {
            if let Err(e) = element.style().set_property("height", &px) {
                tracing::warn!(error = ?e, "failed to set editor height");
            }
        }
        self.relayout();
    }
}

/// Keeps a content-change listener registered; disposes it on drop.
pub struct ContentSubscription {
    disposable: Disposable,
    _closure: Closure<dyn FnMut()>,
}

impl Drop for ContentSubscription {
    fn drop(&mut self) {
        self.disposable.dispose();
    }
}
