pub mod color;
pub mod draft;
pub mod task;
pub mod user;
pub mod view;
