//! Static `about/*` pages.

use yatube_core::domain::User;

use super::layout;

pub fn author(viewer: Option<&User>) -> String {
    let content = r#"<h1>About the author</h1>
<p>Yatube is a small blogging platform built as a study project: authors
publish posts, group them by topic, discuss them in comments and follow each
other.</p>"#;
    layout("about/author.html", "About the author", viewer, content)
}

pub fn tech(viewer: Option<&User>) -> String {
    let content = r#"<h1>Technologies</h1>
<ul>
  <li>Rust and actix-web for the HTTP server</li>
  <li>PostgreSQL through SeaORM</li>
  <li>Redis for the shared page cache</li>
  <li>Argon2 password hashing and signed session tokens</li>
</ul>"#;
    layout("about/tech.html", "Technologies", viewer, content)
}
