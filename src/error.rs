//! Structured error types for sheetgrid.
//!
//! The grid itself never fails on user input (bad sizes, missing cells and
//! unresolvable pointers all degrade to "nothing drawn"). Errors only come out
//! of option decoding and of acquiring a drawing surface from the host.

/// All errors that can occur while configuring or attaching a grid.
#[derive(Debug, thiserror::Error)]
pub enum SheetgridError {
    /// Options could not be decoded from JSON.
    #[error("Invalid options: {0}")]
    Options(#[from] serde_json::Error),

    /// Options passed as a JS value did not match the expected shape.
    #[error("Invalid options: {0}")]
    OptionsValue(String),

    /// The drawing surface could not be acquired or configured.
    #[error("Surface error: {0}")]
    Surface(String),

    /// The host element rejected an operation (DOM failure, missing window).
    #[error("Host error: {0}")]
    Host(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SheetgridError>;

impl From<String> for SheetgridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for SheetgridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<serde_wasm_bindgen::Error> for SheetgridError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self::OptionsValue(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SheetgridError> for wasm_bindgen::JsValue {
    fn from(e: SheetgridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
