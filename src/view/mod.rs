pub mod newsletter_renderer;
