//! Derived names and links.

/// Longest visual-context file name, extension included.
const MAX_FILENAME_LEN: usize = 256;
const HTML_EXTENSION: &str = ".html";

/// File name for a visual-context upload of the page at `url`.
///
/// `https://www.example.com/test/` becomes `www-example-com-test.html`.
/// An empty URL gives an empty name.
#[must_use]
pub fn visual_context_filename(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);

    let mut slug = String::with_capacity(without_scheme.len());
    for c in without_scheme.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.truncate(MAX_FILENAME_LEN - HTML_EXTENSION.len());
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        return String::new();
    }

    format!("{slug}{HTML_EXTENSION}")
}

/// Dashboard link for a vendor job.
#[must_use]
pub fn job_dashboard_url(project_id: &str, job_uid: &str) -> String {
    let pid = url::form_urlencoded::byte_serialize(project_id.as_bytes()).collect::<String>();
    let jid = url::form_urlencoded::byte_serialize(job_uid.as_bytes()).collect::<String>();
    format!("https://dashboard.smartling.com/app/projects/{pid}/account-jobs/{pid}:{jid}")
}
