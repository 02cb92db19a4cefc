//! Comment entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use yatube_core::domain::{Authored, Comment, NewComment};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub created: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Comment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            content: Authored {
                author_id: model.author_id,
                text: model.text,
                created: model.created.into(),
            },
        }
    }
}

impl From<NewComment> for ActiveModel {
    fn from(comment: NewComment) -> Self {
        Self {
            post_id: Set(comment.post_id),
            author_id: Set(comment.content.author_id),
            text: Set(comment.content.text),
            created: Set(comment.content.created.into()),
            ..Default::default()
        }
    }
}
