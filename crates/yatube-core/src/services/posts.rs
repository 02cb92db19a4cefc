use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use yatube_shared::dto::{CommentFormData, PostFormData};

use super::{Repositories, Submission};
use crate::domain::{Authored, Comment, NewComment, NewPost, Post, User};
use crate::error::DomainError;
use crate::forms::{self, BoundForm, FormErrors};
use crate::pagination::{Page, Paginator};
use crate::ports::{MediaStorage, PostFilter, Upload};
use crate::views::{
    AuthorRef, CommentCard, GroupPage, GroupRef, PostCard, PostDetailPage, PostFormPage,
    ProfilePage,
};

/// Folder under the media root that post images go to.
pub const POST_IMAGE_FOLDER: &str = "posts";

#[derive(Debug, Clone, Copy)]
pub struct PostSettings {
    pub page_size: u64,
    pub max_upload_bytes: usize,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            page_size: crate::pagination::DEFAULT_PAGE_SIZE,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

/// What happened to an edit request.
#[derive(Debug)]
pub enum EditOutcome {
    /// The editor is not the author; nothing was touched.
    NotAuthor,
    Saved(Post),
    Rejected(PostFormPage),
}

/// Listings, detail, create/edit/delete and comments.
#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
    media: Arc<dyn MediaStorage>,
    paginator: Paginator,
    max_upload_bytes: usize,
}

impl PostService {
    pub fn new(repos: Repositories, media: Arc<dyn MediaStorage>, settings: PostSettings) -> Self {
        Self {
            repos,
            media,
            paginator: Paginator::new(settings.page_size),
            max_upload_bytes: settings.max_upload_bytes,
        }
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Every post, newest first.
    pub async fn index(&self, page: Option<&str>) -> Result<Page<PostCard>, DomainError> {
        self.listing(PostFilter::All, page).await
    }

    pub async fn group_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<GroupPage, DomainError> {
        let group = self
            .repos
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Group", slug))?;

        let page = self.listing(PostFilter::Group(group.id), page).await?;
        Ok(GroupPage { group, page })
    }

    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&User>,
        page: Option<&str>,
    ) -> Result<ProfilePage, DomainError> {
        let author = self.find_user(username).await?;
        let page = self.listing(PostFilter::Author(author.id), page).await?;

        let following = match viewer {
            Some(viewer) => self
                .repos
                .follows
                .find(viewer.id, author.id)
                .await?
                .is_some(),
            None => false,
        };
        let can_follow = viewer.is_some_and(|v| v.id != author.id);

        Ok(ProfilePage {
            author: AuthorRef::from(&author),
            page,
            following,
            can_follow,
        })
    }

    /// Posts by everyone `viewer` follows.
    pub async fn follow_feed(
        &self,
        viewer: &User,
        page: Option<&str>,
    ) -> Result<Page<PostCard>, DomainError> {
        self.listing(PostFilter::FollowedBy(viewer.id), page).await
    }

    pub async fn post_detail(
        &self,
        post_id: i64,
        viewer: Option<&User>,
    ) -> Result<PostDetailPage, DomainError> {
        let post = self.find_post(post_id).await?;
        let author_post_count = self
            .repos
            .posts
            .count(PostFilter::Author(post.author_id()))
            .await?;

        let comments = self.repos.comments.list_for_post(post.id).await?;
        let comments = self.comment_cards(comments).await?;

        let can_edit = viewer.is_some_and(|v| post.content.is_by(v.id));
        let card = self
            .cards(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal(format!("post {} has no author", post_id)))?;

        Ok(PostDetailPage {
            post: card,
            author_post_count,
            comments,
            form: BoundForm::unbound(),
            can_edit,
        })
    }

    /// Empty create form.
    pub async fn new_post_form(&self) -> Result<PostFormPage, DomainError> {
        self.form_page(BoundForm::unbound(), None).await
    }

    pub async fn create_post(
        &self,
        author: &User,
        data: PostFormData,
        image: Option<Upload>,
    ) -> Result<Submission<Post, PostFormPage>, DomainError> {
        let (clean, image) = match self.clean_post_submission(&data, image.as_ref(), false).await? {
            Ok(clean) => clean,
            Err(errors) => {
                let page = self.form_page(BoundForm::new(data, errors), None).await?;
                return Ok(Submission::Rejected(page));
            }
        };

        let stored_image = match image {
            Some(upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let new_post = NewPost {
            content: Authored::new(author.id, clean.text),
            group_id: clean.group_id,
            image: stored_image.clone(),
        };

        match self.repos.posts.create(new_post).await {
            Ok(post) => {
                tracing::info!(post_id = post.id, author = %author.username, "Post created");
                Ok(Submission::Accepted(post))
            }
            Err(e) => {
                if let Some(path) = stored_image {
                    self.discard_image(&path).await;
                }
                Err(e.into())
            }
        }
    }

    /// The edit form pre-filled from the stored post, or `None` when
    /// `editor` is not the author.
    pub async fn edit_post_form(
        &self,
        editor: &User,
        post_id: i64,
    ) -> Result<Option<PostFormPage>, DomainError> {
        let post = self.find_post(post_id).await?;
        if !post.content.is_by(editor.id) {
            return Ok(None);
        }

        let data = PostFormData {
            text: post.content.text.clone(),
            group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
            ..Default::default()
        };
        let page = self.form_page(BoundForm::new(data, FormErrors::new()), Some(&post)).await?;
        Ok(Some(page))
    }

    pub async fn edit_post(
        &self,
        editor: &User,
        post_id: i64,
        data: PostFormData,
        image: Option<Upload>,
    ) -> Result<EditOutcome, DomainError> {
        let mut post = self.find_post(post_id).await?;
        if !post.content.is_by(editor.id) {
            tracing::warn!(post_id, editor = %editor.username, "Edit attempt by non-author");
            return Ok(EditOutcome::NotAuthor);
        }

        let (clean, image) = match self.clean_post_submission(&data, image.as_ref(), true).await? {
            Ok(clean) => clean,
            Err(errors) => {
                let page = self
                    .form_page(BoundForm::new(data, errors), Some(&post))
                    .await?;
                return Ok(EditOutcome::Rejected(page));
            }
        };

        let previous_image = post.image.clone();
        let replaced = match image {
            Some(upload) => {
                post.image = Some(self.store_image(upload).await?);
                true
            }
            None if clean.clear_image => {
                post.image = None;
                true
            }
            None => false,
        };
        post.content.text = clean.text;
        post.group_id = clean.group_id;

        let saved = self.repos.posts.update(&post).await?;
        if replaced {
            if let Some(old) = previous_image {
                self.discard_image(&old).await;
            }
        }

        tracing::info!(post_id, author = %editor.username, "Post updated");
        Ok(EditOutcome::Saved(saved))
    }

    /// Delete a post (and through the store, its comments). Returns `false`
    /// without touching anything when `user` is not the author.
    pub async fn delete_post(&self, user: &User, post_id: i64) -> Result<bool, DomainError> {
        let post = self.find_post(post_id).await?;
        if !post.content.is_by(user.id) {
            tracing::warn!(post_id, user = %user.username, "Delete attempt by non-author");
            return Ok(false);
        }

        self.repos.posts.delete(post.id).await?;
        if let Some(image) = &post.image {
            self.discard_image(image).await;
        }

        tracing::info!(post_id, author = %user.username, "Post deleted");
        Ok(true)
    }

    /// Attach a comment to a post. Invalid comments are dropped (`Ok(None)`);
    /// a missing post is an error.
    pub async fn add_comment(
        &self,
        author: &User,
        post_id: i64,
        data: CommentFormData,
    ) -> Result<Option<Comment>, DomainError> {
        let post = self.find_post(post_id).await?;

        let text = match forms::clean_comment(&data) {
            Ok(text) => text,
            Err(_) => {
                tracing::debug!(post_id, "Dropping blank comment");
                return Ok(None);
            }
        };

        let comment = self
            .repos
            .comments
            .create(NewComment::new(post.id, author.id, text))
            .await?;

        tracing::info!(post_id, comment_id = comment.id, author = %author.username, "Comment added");
        Ok(Some(comment))
    }

    async fn listing(
        &self,
        filter: PostFilter,
        page: Option<&str>,
    ) -> Result<Page<PostCard>, DomainError> {
        let total = self.repos.posts.count(filter).await?;
        let window = self.paginator.window(total, page);
        let posts = self
            .repos
            .posts
            .list(filter, window.offset, window.limit)
            .await?;

        Ok(Page::new(self.cards(posts).await?, window))
    }

    /// Join posts with their authors and groups, keeping order.
    async fn cards(&self, posts: Vec<Post>) -> Result<Vec<PostCard>, DomainError> {
        let author_ids: Vec<i64> = unique(posts.iter().map(Post::author_id));
        let group_ids: Vec<i64> = unique(posts.iter().filter_map(|p| p.group_id));

        let authors: HashMap<i64, AuthorRef> = self
            .repos
            .users
            .find_many(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id, AuthorRef::from(u)))
            .collect();

        let groups: HashMap<i64, GroupRef> = if group_ids.is_empty() {
            HashMap::new()
        } else {
            self.repos
                .groups
                .find_many(&group_ids)
                .await?
                .iter()
                .map(|g| (g.id, GroupRef::from(g)))
                .collect()
        };

        Ok(posts
            .iter()
            .filter_map(|post| {
                let Some(author) = authors.get(&post.author_id()) else {
                    tracing::warn!(post_id = post.id, "Skipping post with unknown author");
                    return None;
                };
                let group = post.group_id.and_then(|id| groups.get(&id).cloned());
                Some(PostCard::new(post, author.clone(), group))
            })
            .collect())
    }

    async fn comment_cards(&self, comments: Vec<Comment>) -> Result<Vec<CommentCard>, DomainError> {
        let author_ids = unique(comments.iter().map(|c| c.content.author_id));
        let authors: HashMap<i64, AuthorRef> = self
            .repos
            .users
            .find_many(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id, AuthorRef::from(u)))
            .collect();

        Ok(comments
            .iter()
            .filter_map(|c| {
                authors
                    .get(&c.content.author_id)
                    .map(|author| CommentCard::new(c, author.clone()))
            })
            .collect())
    }

    /// Field validation plus the checks that need storage. The upload is
    /// returned renamed after its detected format.
    async fn clean_post_submission(
        &self,
        data: &PostFormData,
        image: Option<&Upload>,
        is_edit: bool,
    ) -> Result<Result<(forms::CleanPost, Option<Upload>), FormErrors>, DomainError> {
        let (clean, mut errors) = match forms::clean_post(data) {
            Ok(clean) => (Some(clean), FormErrors::new()),
            Err(errors) => (None, errors),
        };

        if let Some(group_id) = clean.as_ref().and_then(|c| c.group_id) {
            if self.repos.groups.find_by_id(group_id).await?.is_none() {
                errors.add("group", forms::invalid_choice());
            }
        }

        let mut stored_upload = None;
        if let Some(upload) = image {
            if is_edit && data.clear_image {
                errors.add(
                    "image",
                    "Please either submit a file or check the clear checkbox, not both.",
                );
            }
            match forms::clean_image(upload, self.max_upload_bytes) {
                Ok(format) => {
                    stored_upload = Some(Upload {
                        filename: format!("upload.{}", format.extension()),
                        content_type: upload.content_type.clone(),
                        data: upload.data.clone(),
                    });
                }
                Err(message) => errors.add("image", message),
            }
        }

        match clean {
            Some(clean) if errors.is_empty() => Ok(Ok((clean, stored_upload))),
            _ => Ok(Err(errors)),
        }
    }

    async fn form_page(
        &self,
        form: BoundForm<PostFormData>,
        post: Option<&Post>,
    ) -> Result<PostFormPage, DomainError> {
        Ok(PostFormPage {
            form,
            groups: self.repos.groups.list().await?,
            is_edit: post.is_some(),
            post_id: post.map(|p| p.id),
            current_image: post.and_then(|p| p.image.clone()),
        })
    }

    async fn store_image(&self, upload: Upload) -> Result<String, DomainError> {
        self.media
            .save(POST_IMAGE_FOLDER, &upload)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    async fn discard_image(&self, path: &str) {
        if let Err(e) = self.media.delete(path).await {
            tracing::warn!(path, error = %e, "Failed to remove stored image");
        }
    }

    async fn find_post(&self, post_id: i64) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))
    }

    async fn find_user(&self, username: &str) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))
    }
}

fn unique(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
