mod article;
mod category;
mod comment;
mod favorite;
mod user;

pub use article::*;
pub use category::*;
pub use comment::*;
pub use favorite::*;
pub use user::*;
