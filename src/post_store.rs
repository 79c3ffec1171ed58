use std::io;
use std::rc::Rc;

use spdlog::{debug, error, warn};

use crate::notifier::{ChangeNotifier, Subscription};
use crate::post::Post;
use crate::storage::{Storage, POSTS_KEY};

/// Reads and replaces the posts snapshot kept in the `capvalis_blog_posts` slot.
///
/// Views never share an in-memory list: they hold a `PostStore` and re-`load`
/// when the notifier fires.
pub struct PostStore {
    storage: Rc<dyn Storage>,
    notifier: ChangeNotifier,
}

impl PostStore {
    pub fn new(storage: Rc<dyn Storage>, notifier: ChangeNotifier) -> PostStore {
        PostStore {
            storage,
            notifier,
        }
    }

    /// Current snapshot. A missing, unreadable or malformed slot yields an
    /// empty list.
    pub fn load(&self) -> Vec<Post> {
        let raw = match self.storage.get(POSTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return vec![],
            Err(e) => {
                error!("Error reading posts snapshot: {}", e);
                return vec![];
            }
        };

        match serde_json::from_str::<Vec<Post>>(&raw) {
            Ok(posts) => posts,
            Err(e) => {
                warn!("Discarding malformed posts snapshot: {}", e);
                vec![]
            }
        }
    }

    /// Whether a snapshot was ever written, malformed or not. A slot that
    /// exists but cannot be read is an error, not a missing snapshot.
    pub fn has_snapshot(&self) -> io::Result<bool> {
        Ok(self.storage.get(POSTS_KEY)?.is_some())
    }

    /// Replaces the snapshot with `posts`, then notifies listeners.
    pub fn save_all(&self, posts: &[Post]) -> io::Result<()> {
        let json = serde_json::to_string(posts)?;
        self.storage.set(POSTS_KEY, &json)?;
        debug!("Saved {} posts", posts.len());

        self.notifier.publish();
        Ok(())
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() -> Result<(), String> + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}
