//! Custom element registration.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use monaco_element_browser::OBSERVED_ATTRIBUTES;

use crate::element::MonacoElement;
use crate::telemetry;
use crate::types::ElementOptions;

pub const DEFAULT_TAG: &str = "monaco-element";

// Custom elements must be JS classes extending HTMLElement. The class is a
// thin shim that forwards every callback and property to a MonacoElement
// built by `create`.
#[wasm_bindgen(inline_js = r#"
const PROPERTIES = ["value", "language", "theme", "autogrow", "maxHeight", "minHeight", "libPath"];

export function defineElement(tag, observed, create) {
    if (customElements.get(tag)) {
        return false;
    }
    class MonacoElementHost extends HTMLElement {
        static get observedAttributes() {
            return observed;
        }
        constructor() {
            super();
            this._inner = create(this);
            // Properties set before the element was upgraded.
            for (const prop of PROPERTIES) {
                if (Object.prototype.hasOwnProperty.call(this, prop)) {
                    const value = this[prop];
                    delete this[prop];
                    this[prop] = value;
                }
            }
        }
        connectedCallback() {
            this._inner.connected();
        }
        disconnectedCallback() {
            this._inner.disconnected();
        }
        attributeChangedCallback(name, _oldValue, newValue) {
            this._inner.attributeChanged(name, newValue);
        }
        get height() {
            return this._inner.height;
        }
        get isReady() {
            return this._inner.isReady;
        }
        get loadError() {
            return this._inner.loadError;
        }
        get state() {
            return this._inner.state;
        }
        flush() {
            return this._inner.flush();
        }
    }
    for (const prop of PROPERTIES) {
        Object.defineProperty(MonacoElementHost.prototype, prop, {
            get() { return this._inner[prop]; },
            set(value) { this._inner[prop] = value; },
            configurable: true,
            enumerable: true,
        });
    }
    customElements.define(tag, MonacoElementHost);
    return true;
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = defineElement, catch)]
    fn define_element(
        tag: &str,
        observed: js_sys::Array,
        create: &js_sys::Function,
    ) -> Result<bool, JsValue>;
}

/// Register the custom element under `tag` (default `monaco-element`).
///
/// Returns false if the tag is already defined. Every instance shares
/// `options`.
#[wasm_bindgen(js_name = defineMonacoElement)]
pub fn define_monaco_element(
    tag: Option<String>,
    options: Option<ElementOptions>,
) -> Result<bool, JsError> {
    telemetry::init(None);

    let tag = tag.unwrap_or_else(|| DEFAULT_TAG.to_owned());
    let config = options.unwrap_or_default().into_config();
    config.validate()?;

    let observed: js_sys::Array = OBSERVED_ATTRIBUTES
        .iter()
        .map(|name| JsValue::from_str(name))
        .collect();
    let factory = Closure::<dyn FnMut(HtmlElement) -> JsValue>::new(move |element| {
        JsValue::from(MonacoElement::with_config(element, config.clone()))
    });

    let defined = define_element(&tag, observed, factory.as_ref().unchecked_ref())
        .map_err(|e| JsError::new(&format!("failed to define <{}>: {:?}", tag, e)))?;
    if defined {
        // The registry holds the class for the life of the page.
        factory.forget();
        tracing::debug!(%tag, "custom element defined");
    } else {
        tracing::warn!(%tag, "custom element already defined");
    }
    Ok(defined)
}
