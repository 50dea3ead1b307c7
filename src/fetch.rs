use heartbeat_core::{AssetFetcher, LoadError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// `fetch()` with streamed body so progress can be reported.
pub struct WebFetcher;

fn js_reason(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

impl AssetFetcher for WebFetcher {
    async fn fetch(&self, path: &str, progress: &mut dyn FnMut(f32)) -> Result<Vec<u8>, LoadError> {
        let fail = |reason: String| LoadError::Fetch {
            path: path.to_string(),
            reason,
        };
        let window = web::window().ok_or_else(|| fail("no window".into()))?;

        let opts = web::RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(web::RequestMode::Cors);
        let request = web::Request::new_with_str_and_init(path, &opts)
            .map_err(|e| fail(js_reason(e)))?;
        let response: web::Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| fail(js_reason(e)))?
            .dyn_into()
            .map_err(|e| fail(js_reason(e)))?;
        if !response.ok() {
            return Err(LoadError::Http {
                path: path.to_string(),
                status: response.status(),
            });
        }

        let total = response
            .headers()
            .get("content-length")
            .ok()
            .flatten()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|n| *n > 0.0);
        let body = response.body().ok_or_else(|| fail("empty body".into()))?;
        let reader: web::ReadableStreamDefaultReader = body
            .get_reader()
            .dyn_into()
            .map_err(|e| fail(js_reason(e)))?;

        let mut bytes = Vec::new();
        loop {
            let chunk = JsFuture::from(reader.read())
                .await
                .map_err(|e| fail(js_reason(e)))?;
            let done = js_sys::Reflect::get(&chunk, &JsValue::from_str("done"))
                .map(|v| v.is_truthy())
                .unwrap_or(true);
            if done {
                break;
            }
            let value = js_sys::Reflect::get(&chunk, &JsValue::from_str("value"))
                .map_err(|e| fail(js_reason(e)))?;
            bytes.extend(js_sys::Uint8Array::new(&value).to_vec());
            if let Some(total) = total {
                progress((bytes.len() as f64 / total) as f32);
            }
        }
        progress(1.0);
        Ok(bytes)
    }
}
