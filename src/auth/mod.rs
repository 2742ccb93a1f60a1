mod extractor;

pub use extractor::{ActingUser, USER_ID_HEADER};
