pub mod admin_editor;
pub mod config;
pub mod logger;
pub mod newsletter_view;
pub mod notifier;
pub mod paginator;
pub mod post;
pub mod post_store;
pub mod signup;
pub mod storage;
pub mod text_utils;
pub mod util;
pub mod view;
mod test_data;
