/// Path prefix under which the service publishes uploaded media
pub const MEDIA_PREFIX: &str = "/media/";

/// Resolve a stored cover reference into a fetchable URL
///
/// - absolute `http://` / `https://` references are used verbatim
/// - references starting with the media prefix get the service origin prepended
/// - anything else is treated as relative to the media prefix
///
/// An empty reference resolves to an empty string.
pub fn resolve_image_url(reference: &str, origin: &str) -> String {
    let reference = reference.trim();
    if reference.is_empty() {
        return String::new();
    }

    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }

    let origin = origin.trim_end_matches('/');

    if reference.starts_with(MEDIA_PREFIX) {
        format!("{origin}{reference}")
    } else {
        format!(
            "{origin}{MEDIA_PREFIX}{}",
            reference.trim_start_matches('/')
        )
    }
}
