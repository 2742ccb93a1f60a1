mod comment;
mod interaction;

pub(crate) use comment::CommentFields;
pub use comment::{Comment, CommentCount, CommentThread, CreateComment, NewComment};
pub use interaction::{field, Interaction, InteractionKind, InteractionStatus, INTERACTIONS};
