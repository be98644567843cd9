//! Browser-side helpers for files: reading a picked file, saving a download.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, File, HtmlAnchorElement, Url};

use crate::error::ApiError;

/// Read the whole of a user-picked file.
pub async fn read_file(file: &File) -> Result<Vec<u8>, ApiError> {
	let buffer = JsFuture::from(file.array_buffer())
		.await
		.map_err(|e| ApiError::FileRead(format!("{}: {:?}", file.name(), e)))?;
	Ok(Uint8Array::new(&buffer).to_vec())
}

/// Offer `bytes` to the user as a download named `filename`.
///
/// The object URL is revoked right after the click.
pub fn save_bytes(filename: &str, bytes: &[u8]) -> Result<(), JsValue> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;

	let parts = Array::of1(&Uint8Array::from(bytes));
	let blob = Blob::new_with_u8_array_sequence(&parts)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let anchor: HtmlAnchorElement = document.create_element("a")?.unchecked_into();
	anchor.set_href(&url);
	anchor.set_download(filename);
	anchor.click();

	Url::revoke_object_url(&url)
}
