//! Server-side HTML rendering.
//!
//! Every page goes through [`layout`], which stamps the template name on
//! `<body data-template="...">` so responses can be told apart in tests and
//! in the browser's inspector.

pub mod about;
pub mod errors;
pub mod posts;
pub mod users;

use std::borrow::Cow;

use chrono::{DateTime, Datelike, Utc};

use yatube_core::domain::User;
use yatube_core::pagination::Page;

pub fn e(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

pub fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Escaped text with line breaks kept.
pub fn multiline(text: &str) -> String {
    e(text).replace('\n', "<br>\n")
}

pub fn date(value: &DateTime<Utc>) -> String {
    value.format("%-d %B %Y").to_string()
}

/// Wrap page content in the site chrome.
pub fn layout(template: &str, title: &str, viewer: Option<&User>, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
</head>
<body data-template="{template}">
{nav}
<main class="container py-5">
{content}
</main>
{footer}
</body>
</html>
"#,
        title = e(title),
        template = attr(template),
        nav = nav(viewer),
        content = content,
        footer = footer(),
    )
}

fn nav(viewer: Option<&User>) -> String {
    let links = match viewer {
        Some(user) => format!(
            r#"<li><a href="/create/">New post</a></li>
    <li><a href="/follow/">Following</a></li>
    <li><a href="/auth/password_change/">Change password</a></li>
    <li><form method="post" action="/auth/logout/"><button type="submit">Log out</button></form></li>
    <li>Signed in as <a href="/profile/{username}/">{name}</a></li>"#,
            username = attr(&user.username),
            name = e(&user.display_name()),
        ),
        None => r#"<li><a href="/auth/login/">Log in</a></li>
    <li><a href="/auth/signup/">Sign up</a></li>"#
            .to_string(),
    };

    format!(
        r#"<header>
  <nav>
    <a class="navbar-brand" href="/">Yatube</a>
    <ul>
    <li><a href="/about/author/">About the author</a></li>
    <li><a href="/about/tech/">Technologies</a></li>
    {links}
    </ul>
  </nav>
</header>"#
    )
}

fn footer() -> String {
    format!(
        r#"<footer class="border-top text-center py-3">
  <p>&copy; {} Copyright <span style="color:red">Ya</span>tube</p>
</footer>"#,
        Utc::now().year()
    )
}

/// `<ul class="errorlist">` for a field, empty when there is nothing to say.
pub fn error_list(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", e(m)))
        .collect();
    format!(r#"<ul class="errorlist">{items}</ul>"#)
}

/// A labelled `<input>` with its errors.
pub fn input(name: &str, label: &str, kind: &str, value: &str, errors: &[String]) -> String {
    format!(
        r#"<div class="form-group">
  <label for="id_{name}">{label}</label>
  <input type="{kind}" name="{name}" id="id_{name}" value="{value}">
  {errors}
</div>"#,
        name = attr(name),
        label = e(label),
        kind = attr(kind),
        value = attr(value),
        errors = error_list(errors),
    )
}

/// Page links: first/previous, the current position, next/last.
pub fn paginator<T>(page: &Page<T>) -> String {
    if page.num_pages <= 1 {
        return String::new();
    }

    let mut links = String::new();
    if let Some(previous) = page.previous_page_number() {
        links.push_str(r#"<li><a href="?page=1">First</a></li>"#);
        links.push_str(&format!(r#"<li><a href="?page={previous}">Previous</a></li>"#));
    }
    for number in 1..=page.num_pages {
        if number == page.number {
            links.push_str(&format!(r#"<li class="active"><span>{number}</span></li>"#));
        } else {
            links.push_str(&format!(r#"<li><a href="?page={number}">{number}</a></li>"#));
        }
    }
    if let Some(next) = page.next_page_number() {
        links.push_str(&format!(r#"<li><a href="?page={next}">Next</a></li>"#));
        links.push_str(&format!(
            r#"<li><a href="?page={}">Last</a></li>"#,
            page.num_pages
        ));
    }

    format!(r#"<nav class="pagination"><ul>{links}</ul></nav>"#)
}
