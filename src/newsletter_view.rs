use std::cell::RefCell;
use std::cmp::Reverse;
use std::rc::{Rc, Weak};

use spdlog::debug;

use crate::notifier::Subscription;
use crate::paginator::Paginator;
use crate::post::Post;
use crate::post_store::PostStore;
use crate::text_utils::parse_date;
use crate::view::newsletter_renderer::NewsletterRenderer;

/// Read-only newsletter over the posts snapshot.
///
/// The cached list is reloaded on `mount`, on every store notification while
/// mounted, and on `on_focus`.
pub struct NewsletterView {
    store: Rc<PostStore>,
    posts: Rc<RefCell<Vec<Post>>>,
    subscription: Option<Subscription>,
}

impl NewsletterView {
    pub fn new(store: Rc<PostStore>) -> NewsletterView {
        NewsletterView {
            store,
            posts: Rc::new(RefCell::new(vec![])),
            subscription: None,
        }
    }

    pub fn mount(&mut self) {
        self.refresh();
        if self.subscription.is_some() {
            return;
        }

        // Weak, so the store's notifier does not keep the store alive
        let store: Weak<PostStore> = Rc::downgrade(&self.store);
        let posts = self.posts.clone();
        self.subscription = Some(self.store.subscribe(move || {
            let store = store.upgrade().ok_or("post store dropped")?;
            *posts.try_borrow_mut().map_err(|e| e.to_string())? = store.load();
            debug!("Newsletter refreshed after change");
            Ok(())
        }));
    }

    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// The view became visible again, e.g. after navigating back to it.
    pub fn on_focus(&mut self) {
        self.refresh();
    }

    fn refresh(&self) {
        *self.posts.borrow_mut() = self.store.load();
    }

    /// Posts in stored order.
    pub fn posts(&self) -> Vec<Post> {
        self.posts.borrow().clone()
    }

    /// Up to `count` posts, newest date first. Posts with an unreadable date
    /// come last, in stored order.
    pub fn most_recent(&self, count: usize) -> Vec<Post> {
        let mut posts = self.posts();
        posts.sort_by_key(|p| Reverse(parse_date(&p.date).ok()));
        posts.truncate(count);
        posts
    }

    pub fn page_count(&self, page_size: u32) -> u32 {
        let posts = self.posts.borrow();
        Paginator::from(posts.as_slice(), page_size).page_count()
    }

    /// Renders `page` (1-based). An empty newsletter renders as page 1 with
    /// no posts.
    pub fn render(&self, renderer: &NewsletterRenderer, page: u32, page_size: u32) -> Result<String, String> {
        let posts = self.posts.borrow();
        let paginator = Paginator::from(posts.as_slice(), page_size);
        if paginator.page_count() == 0 && page <= 1 {
            return Ok(renderer.render(&[], 1, 0));
        }

        let page_posts = paginator.get_page(page)?;
        Ok(renderer.render(page_posts, page, paginator.page_count()))
    }
}

impl Drop for NewsletterView {
    fn drop(&mut self) {
        self.unmount();
    }
}
