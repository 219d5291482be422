pub mod application;
pub mod meeting;
pub mod notification;
pub mod user;

pub use application::*;
pub use meeting::*;
pub use notification::*;
pub use user::*;
