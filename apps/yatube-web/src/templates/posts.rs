//! `posts/*` pages.

use yatube_core::domain::User;
use yatube_core::pagination::Page;
use yatube_core::views::{
    CommentCard, GroupPage, PostCard, PostDetailPage, PostFormPage, ProfilePage,
};

use super::{attr, date, e, error_list, layout, multiline, paginator};

/// One post in a listing.
fn post_card(card: &PostCard, link_group: bool) -> String {
    let image = card
        .image
        .as_deref()
        .map(|path| format!(r#"<img class="card-img my-2" src="/media/{}">"#, attr(path)))
        .unwrap_or_default();

    let group = match (&card.group, link_group) {
        (Some(group), true) => format!(
            r#"<a href="/group/{}/">all posts of the group {}</a>"#,
            attr(&group.slug),
            e(&group.title)
        ),
        _ => String::new(),
    };

    format!(
        r#"<article>
  <ul>
    <li>Author: <a href="/profile/{username}/">{author}</a></li>
    <li>Published: {date}</li>
  </ul>
  {image}
  <p>{text}</p>
  <a href="/posts/{id}/">details</a>
  {group}
</article>
<hr>"#,
        username = attr(&card.author.username),
        author = e(&card.author.display_name),
        date = date(&card.pub_date),
        image = image,
        text = multiline(&card.text),
        id = card.id,
        group = group,
    )
}

fn post_list(page: &Page<PostCard>, link_group: bool) -> String {
    let mut html: String = page
        .items
        .iter()
        .map(|card| post_card(card, link_group))
        .collect();
    html.push_str(&paginator(page));
    html
}

pub fn index(page: &Page<PostCard>, viewer: Option<&User>) -> String {
    let content = format!(
        "<h1>Latest updates on the site</h1>\n{}",
        post_list(page, true)
    );
    layout("posts/index.html", "Yatube home page", viewer, &content)
}

pub fn follow(page: &Page<PostCard>, viewer: Option<&User>) -> String {
    let content = format!(
        "<h1>Posts by authors you follow</h1>\n{}",
        post_list(page, true)
    );
    layout("posts/follow.html", "Following", viewer, &content)
}

pub fn group_list(view: &GroupPage, viewer: Option<&User>) -> String {
    let content = format!(
        "<h1>{title}</h1>\n<p>{description}</p>\n{posts}",
        title = e(&view.group.title),
        description = multiline(&view.group.description),
        posts = post_list(&view.page, false),
    );
    let title = format!("Posts of the group {}", view.group.title);
    layout("posts/group_list.html", &title, viewer, &content)
}

pub fn profile(view: &ProfilePage, viewer: Option<&User>) -> String {
    let button = if !view.can_follow {
        String::new()
    } else if view.following {
        format!(
            r#"<form method="post" action="/profile/{}/unfollow/"><button type="submit" class="btn btn-light">Unfollow</button></form>"#,
            attr(&view.author.username)
        )
    } else {
        format!(
            r#"<form method="post" action="/profile/{}/follow/"><button type="submit" class="btn btn-primary">Follow</button></form>"#,
            attr(&view.author.username)
        )
    };

    let content = format!(
        "<h1>All posts of the user {name}</h1>\n<h3>Posts in total: {total}</h3>\n{button}\n{posts}",
        name = e(&view.author.display_name),
        total = view.page.total,
        button = button,
        posts = post_list(&view.page, true),
    );
    let title = format!("Profile of {}", view.author.display_name);
    layout("posts/profile.html", &title, viewer, &content)
}

fn comment(card: &CommentCard) -> String {
    format!(
        r#"<div class="media mb-4">
  <h5><a href="/profile/{username}/">{author}</a></h5>
  <p>{text}</p>
</div>"#,
        username = attr(&card.author.username),
        author = e(&card.author.display_name),
        text = multiline(&card.text),
    )
}

pub fn post_detail(view: &PostDetailPage, viewer: Option<&User>) -> String {
    let post = &view.post;

    let group = post
        .group
        .as_ref()
        .map(|g| {
            format!(
                r#"<li>Group: <a href="/group/{}/">all posts of the group {}</a></li>"#,
                attr(&g.slug),
                e(&g.title)
            )
        })
        .unwrap_or_default();

    let image = post
        .image
        .as_deref()
        .map(|path| format!(r#"<img class="card-img my-2" src="/media/{}">"#, attr(path)))
        .unwrap_or_default();

    let author_actions = if view.can_edit {
        format!(
            r#"<a class="btn btn-primary" href="/posts/{id}/edit/">Edit post</a>
<form method="post" action="/posts/{id}/delete/"><button type="submit" class="btn btn-danger">Delete post</button></form>"#,
            id = post.id
        )
    } else {
        String::new()
    };

    let comment_form = if viewer.is_some() {
        format!(
            r#"<div class="card my-4">
  <h5 class="card-header">Add a comment:</h5>
  <form method="post" action="/posts/{id}/comment/">
    <textarea name="text" id="id_text" required>{text}</textarea>
    {errors}
    <button type="submit" class="btn btn-primary">Send</button>
  </form>
</div>"#,
            id = post.id,
            text = e(&view.form.data.text),
            errors = error_list(view.form.errors.field("text")),
        )
    } else {
        String::new()
    };

    let comments: String = view.comments.iter().map(comment).collect();

    let content = format!(
        r#"<div class="row">
  <aside class="col-md-3">
    <ul class="list-group">
      <li>Published: {date}</li>
      {group}
      <li>Author: <a href="/profile/{username}/">{author}</a></li>
      <li>Posts by this author: <span>{count}</span></li>
    </ul>
  </aside>
  <article class="col-md-9">
    {image}
    <p>{text}</p>
    {author_actions}
    {comment_form}
    {comments}
  </article>
</div>"#,
        date = date(&post.pub_date),
        group = group,
        username = attr(&post.author.username),
        author = e(&post.author.display_name),
        count = view.author_post_count,
        image = image,
        text = multiline(&post.text),
        author_actions = author_actions,
        comment_form = comment_form,
        comments = comments,
    );

    let title: String = post.text.chars().take(30).collect();
    layout("posts/post_detail.html", &format!("Post {title}"), viewer, &content)
}

pub fn create_post(view: &PostFormPage, viewer: Option<&User>) -> String {
    let form = &view.form;
    let selected_group = form.data.group.trim();

    let mut options = format!(
        r#"<option value=""{}>---------</option>"#,
        if selected_group.is_empty() { " selected" } else { "" }
    );
    for group in &view.groups {
        let id = group.id.to_string();
        options.push_str(&format!(
            r#"<option value="{id}"{selected}>{title}</option>"#,
            selected = if id == selected_group { " selected" } else { "" },
            title = e(&group.title),
        ));
    }

    let current_image = match (&view.current_image, view.is_edit) {
        (Some(path), true) => format!(
            r#"<p>Currently: <a href="/media/{path}">{name}</a>
  <input type="checkbox" name="image-clear" id="image-clear_id"{checked}>
  <label for="image-clear_id">Clear</label></p>"#,
            path = attr(path),
            name = e(path),
            checked = if form.data.clear_image { " checked" } else { "" },
        ),
        _ => String::new(),
    };

    let (heading, action, submit) = match (view.is_edit, view.post_id) {
        (true, Some(id)) => ("Edit post", format!("/posts/{id}/edit/"), "Save"),
        _ => ("New post", "/create/".to_string(), "Add"),
    };

    let content = format!(
        r#"<div class="card">
  <div class="card-header">{heading}</div>
  <form method="post" action="{action}" enctype="multipart/form-data">
    {non_field}
    <div class="form-group">
      <label for="id_text">Post text</label>
      <textarea name="text" id="id_text" cols="40" rows="10" required>{text}</textarea>
      {text_errors}
    </div>
    <div class="form-group">
      <label for="id_group">Group</label>
      <select name="group" id="id_group">{options}</select>
      {group_errors}
    </div>
    <div class="form-group">
      <label for="id_image">Image</label>
      {current_image}
      <input type="file" name="image" accept="image/*" id="id_image">
      {image_errors}
    </div>
    <button type="submit" class="btn btn-primary">{submit}</button>
  </form>
</div>"#,
        heading = heading,
        action = attr(&action),
        non_field = error_list(form.errors.non_field()),
        text = e(&form.data.text),
        text_errors = error_list(form.errors.field("text")),
        options = options,
        group_errors = error_list(form.errors.field("group")),
        current_image = current_image,
        image_errors = error_list(form.errors.field("image")),
        submit = submit,
    );

    layout("posts/create_post.html", heading, viewer, &content)
}
