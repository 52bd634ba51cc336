// Version information for the model-backed QR decoder

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-model-qr-decoder-2026-10-18";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 0;

/// Minor version number
pub const VERSION_MINOR: u32 = 1;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2026-10-18";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "model-artifact-fetch",
    "engine-storage-install",
    "guarded-initialization",
    "qr-only-format-validation",
    "first-candidate-decode",
    "rqrr-engine-adapter",
];

/// Get formatted version string for display
pub fn get_version_string() -> String {
    format!("Model QR Decoder {} ({})", VERSION_NUMBER, BUILD_DATE)
}
