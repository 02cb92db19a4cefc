//! `core/*` error pages.

use yatube_core::domain::User;

use super::{e, layout};

pub fn page_not_found(path: &str, viewer: Option<&User>) -> String {
    let content = format!(
        r#"<h1>Error 404</h1>
<p>Page <code>{}</code> not found.</p>
<a href="/">Go to the home page</a>"#,
        e(path)
    );
    layout("core/404.html", "Page not found", viewer, &content)
}

pub fn csrf_failure() -> String {
    let content = r#"<h1>Error 403</h1>
<p>CSRF verification failed. The request was aborted.</p>"#;
    layout("core/403csrf.html", "Forbidden", None, content)
}

pub fn server_error() -> String {
    let content = r#"<h1>Error 500</h1>
<p>Something went wrong on our side. Please try again later.</p>"#;
    layout("core/500.html", "Server error", None, content)
}
