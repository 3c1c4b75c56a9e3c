//! SeaORM entity models
//!
//! Database entities for PaperHub

mod bookmark;
mod comment;
mod notification;
mod paper;
mod review;
mod user;

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
};

pub use paper::{
    Entity as PaperEntity,
    Model as Paper,
    ActiveModel as PaperActiveModel,
    Column as PaperColumn,
    PaperSource,
    PaperStatus,
    ResearchStory,
    StoryLevel,
};

pub use comment::{
    Entity as CommentEntity,
    Model as Comment,
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
};

pub use review::{
    Entity as ReviewEntity,
    Model as Review,
    ActiveModel as ReviewActiveModel,
    Column as ReviewColumn,
    Recommendation,
};

pub use bookmark::{
    Entity as BookmarkEntity,
    Model as Bookmark,
    ActiveModel as BookmarkActiveModel,
    Column as BookmarkColumn,
};

pub use notification::{
    Entity as NotificationEntity,
    Model as Notification,
    ActiveModel as NotificationActiveModel,
    Column as NotificationColumn,
    NotificationKind,
};
