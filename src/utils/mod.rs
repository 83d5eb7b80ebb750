pub mod logging;

use std::path::Path;

use uuid::Uuid;

/// Builds a collision resistant file name that keeps the original extension.
///
/// `report.final.PDF` becomes `<uuid>.PDF`; names without an extension, or
/// with a non alphanumeric one, get a bare `<uuid>`.
pub fn random_file_name(original_name: &str) -> String {
    let random = Uuid::new_v4();
    match file_extension(original_name) {
        Some(ext) => format!("{}.{}", random, ext),
        None => random.to_string(),
    }
}

pub fn file_extension(file_name: &str) -> Option<&str> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}
