//! `users/*` pages: sign-up, login, logout, password change.

use yatube_core::domain::User;
use yatube_core::forms::BoundForm;
use yatube_shared::dto::{LoginFormData, PasswordChangeFormData, SignupFormData};

use super::{attr, e, error_list, input, layout};

fn card(heading: &str, body: &str) -> String {
    format!(
        r#"<div class="card">
  <div class="card-header">{}</div>
  <div class="card-body">
{}
  </div>
</div>"#,
        e(heading),
        body
    )
}

pub fn signup(form: &BoundForm<SignupFormData>, viewer: Option<&User>) -> String {
    let data = &form.data;
    let errors = &form.errors;

    let fields = [
        input("first_name", "First name", "text", &data.first_name, errors.field("first_name")),
        input("last_name", "Last name", "text", &data.last_name, errors.field("last_name")),
        input("username", "Username", "text", &data.username, errors.field("username")),
        input("email", "Email address", "email", &data.email, errors.field("email")),
        input("password1", "Password", "password", "", errors.field("password1")),
        input("password2", "Password confirmation", "password", "", errors.field("password2")),
    ]
    .join("\n");

    let body = format!(
        r#"<form method="post" action="/auth/signup/">
  {non_field}
  {fields}
  <button type="submit" class="btn btn-primary">Sign up</button>
</form>"#,
        non_field = error_list(errors.non_field()),
        fields = fields,
    );

    layout("users/signup.html", "Sign up", viewer, &card("Sign up", &body))
}

pub fn login(form: &BoundForm<LoginFormData>, viewer: Option<&User>) -> String {
    let errors = &form.errors;
    let next = form
        .data
        .next
        .as_deref()
        .map(|next| format!(r#"<input type="hidden" name="next" value="{}">"#, attr(next)))
        .unwrap_or_default();

    let body = format!(
        r#"<form method="post" action="/auth/login/">
  {non_field}
  {next}
  {username}
  {password}
  <button type="submit" class="btn btn-primary">Log in</button>
</form>"#,
        non_field = error_list(errors.non_field()),
        next = next,
        username = input("username", "Username", "text", &form.data.username, errors.field("username")),
        password = input("password", "Password", "password", "", errors.field("password")),
    );

    layout("users/login.html", "Log in", viewer, &card("Log in", &body))
}

pub fn logged_out() -> String {
    let body = r#"<p>You have logged out.</p>
<a href="/auth/login/">Log in again</a>"#;
    layout("users/logged_out.html", "Logged out", None, &card("Logged out", body))
}

pub fn password_change(form: &BoundForm<PasswordChangeFormData>, viewer: Option<&User>) -> String {
    let errors = &form.errors;
    let body = format!(
        r#"<form method="post" action="/auth/password_change/">
  {non_field}
  {old}
  {new1}
  {new2}
  <button type="submit" class="btn btn-primary">Change password</button>
</form>"#,
        non_field = error_list(errors.non_field()),
        old = input("old_password", "Old password", "password", "", errors.field("old_password")),
        new1 = input("new_password1", "New password", "password", "", errors.field("new_password1")),
        new2 = input(
            "new_password2",
            "New password confirmation",
            "password",
            "",
            errors.field("new_password2")
        ),
    );

    layout(
        "users/password_change.html",
        "Change password",
        viewer,
        &card("Change password", &body),
    )
}

pub fn password_change_done(viewer: Option<&User>) -> String {
    layout(
        "users/password_change_done.html",
        "Password changed",
        viewer,
        &card("Password changed", "<p>Your password was changed.</p>"),
    )
}
