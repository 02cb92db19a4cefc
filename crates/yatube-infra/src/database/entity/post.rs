//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use yatube_core::domain::{Authored, NewPost, Post};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub author_id: i64,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub created: DateTimeWithTimeZone,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Group,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            content: Authored {
                author_id: model.author_id,
                text: model.text,
                created: model.created.into(),
            },
            group_id: model.group_id,
            image: model.image,
        }
    }
}

/// A fresh row; the id is assigned by the database.
impl From<NewPost> for ActiveModel {
    fn from(post: NewPost) -> Self {
        Self {
            author_id: Set(post.content.author_id),
            text: Set(post.content.text),
            created: Set(post.content.created.into()),
            group_id: Set(post.group_id),
            image: Set(post.image),
            ..Default::default()
        }
    }
}
