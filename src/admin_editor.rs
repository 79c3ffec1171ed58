use std::io;
use std::rc::Rc;

use spdlog::{info, warn};
use thiserror::Error;

use crate::post::{seed_post, FormMode, Post, PostFields, PostId, RelatedPost, ValidationErrors};
use crate::post_store::PostStore;
use crate::text_utils::{contains_ignore_case, parse_date};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Post not found: {0}")]
    NotFound(PostId),

    #[error("Related post title is required")]
    EmptyRelatedTitle,

    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),
}

/// Dashboard summary of the admin list.
#[derive(Debug, Clone, PartialEq)]
pub struct PostStats {
    pub total: usize,
    /// Newest post by date. Equal dates keep the first in stored order and
    /// unreadable dates lose to any readable one.
    pub latest: Option<Post>,
    /// Most used category and its post count. Ties go to the category seen
    /// first in stored order.
    pub top_category: Option<(String, usize)>,
}

/// Admin list and form state over a [`PostStore`].
///
/// `posts` is a cache rebuilt from the store; every mutation re-reads the
/// snapshot first and writes the whole list back.
pub struct AdminEditor {
    store: Rc<PostStore>,
    posts: Vec<Post>,
    form: PostFields,
}

impl AdminEditor {
    /// Hydrates the list, writing the sample post when the slot was never
    /// written. An unreadable slot fails with `EditorError::Storage` and is
    /// left untouched.
    pub fn open(store: Rc<PostStore>) -> Result<AdminEditor, EditorError> {
        let posts = if store.has_snapshot()? {
            store.load()
        } else {
            info!("No posts snapshot found, seeding sample post");
            let posts = vec![seed_post(PostId::generate())];
            store.save_all(&posts)?;
            posts
        };

        Ok(AdminEditor {
            store,
            posts,
            form: PostFields::default(),
        })
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn stats(&self) -> PostStats {
        let mut latest: Option<&Post> = None;
        for post in &self.posts {
            let newer = match latest {
                None => true,
                Some(cur) => parse_date(&post.date).ok() > parse_date(&cur.date).ok(),
            };
            if newer {
                latest = Some(post);
            }
        }

        let mut counts: Vec<(&str, usize)> = vec![];
        for post in &self.posts {
            match counts.iter_mut().find(|(category, _)| *category == post.category) {
                Some((_, count)) => *count += 1,
                None => counts.push((post.category.as_str(), 1)),
            }
        }
        let mut top_category: Option<(&str, usize)> = None;
        for (category, count) in counts {
            if top_category.map_or(true, |(_, top)| count > top) {
                top_category = Some((category, count));
            }
        }

        PostStats {
            total: self.posts.len(),
            latest: latest.cloned(),
            top_category: top_category.map(|(category, count)| (category.to_string(), count)),
        }
    }

    pub fn create(&mut self, fields: PostFields) -> Result<Post, EditorError> {
        fields.validate().map_err(EditorError::Validation)?;

        let mut posts = self.store.load();
        let id = Self::unique_id(&posts);
        let post = Post::from_fields(id, fields);

        posts.insert(0, post.clone());
        self.store.save_all(&posts)?;
        self.posts = posts;

        info!("Created post {} ({})", post.id, post.title);
        Ok(post)
    }

    /// Replaces the post with `id` wholesale. The id in `fields` is ignored.
    pub fn update(&mut self, id: &PostId, fields: PostFields) -> Result<Post, EditorError> {
        fields.validate().map_err(EditorError::Validation)?;

        let mut posts = self.store.load();
        let Some(index) = posts.iter().position(|p| &p.id == id) else {
            warn!("Update of missing post {}", id);
            self.posts = posts;
            return Err(EditorError::NotFound(id.clone()));
        };

        let post = Post::from_fields(id.clone(), fields);
        posts[index] = post.clone();
        self.store.save_all(&posts)?;
        self.posts = posts;

        info!("Updated post {}", id);
        Ok(post)
    }

    /// Removes the post with `id` once `confirm` agrees. Returns whether a
    /// post was removed; an unknown id or a declined confirmation writes
    /// nothing.
    pub fn delete<F>(&mut self, id: &PostId, confirm: F) -> Result<bool, EditorError>
    where
        F: FnOnce(&Post) -> bool,
    {
        let mut posts = self.store.load();
        let Some(index) = posts.iter().position(|p| &p.id == id) else {
            self.posts = posts;
            return Ok(false);
        };

        if !confirm(&posts[index]) {
            self.posts = posts;
            return Ok(false);
        }

        posts.remove(index);
        self.store.save_all(&posts)?;
        self.posts = posts;

        if self.form.id.as_ref() == Some(id) {
            self.reset_form();
        }

        info!("Deleted post {}", id);
        Ok(true)
    }

    /// Case-insensitive match on title, content and category. Does not touch
    /// the store.
    pub fn filter(&self, term: &str) -> Vec<&Post> {
        let term = term.to_lowercase();
        self.posts.iter()
            .filter(|p| {
                contains_ignore_case(&p.title, &term)
                    || contains_ignore_case(&p.content, &term)
                    || contains_ignore_case(&p.category, &term)
            })
            .collect()
    }

    pub fn form(&self) -> &PostFields {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PostFields {
        &mut self.form
    }

    pub fn form_mode(&self) -> FormMode {
        self.form.mode()
    }

    /// Loads a post into the form buffer for editing.
    pub fn edit(&mut self, id: &PostId) -> Result<(), EditorError> {
        let post = self.posts.iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| EditorError::NotFound(id.clone()))?;
        self.form = post.to_fields();
        Ok(())
    }

    pub fn reset_form(&mut self) {
        self.form = PostFields::default();
    }

    /// Creates or updates from the form buffer depending on its mode, then
    /// clears the buffer. A failed submit keeps the buffer as it was.
    pub fn submit(&mut self) -> Result<Post, EditorError> {
        let fields = self.form.clone();
        let post = match fields.id.clone() {
            Some(id) => self.update(&id, fields)?,
            None => self.create(fields)?,
        };
        self.reset_form();
        Ok(post)
    }

    /// Appends to the form's related posts. Not persisted until submit.
    pub fn add_related_post(&mut self, title: &str, url: &str) -> Result<(), EditorError> {
        if title.trim().is_empty() {
            return Err(EditorError::EmptyRelatedTitle);
        }
        self.form.related_posts.push(RelatedPost {
            title: title.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    pub fn remove_related_post(&mut self, index: usize) -> Option<RelatedPost> {
        if index < self.form.related_posts.len() {
            Some(self.form.related_posts.remove(index))
        } else {
            None
        }
    }

    fn unique_id(posts: &[Post]) -> PostId {
        loop {
            let id = PostId::generate();
            if !posts.iter().any(|p| p.id == id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::fs;

    use crate::notifier::ChangeNotifier;
    use crate::storage::{FileStorage, MemoryStorage, Storage, POSTS_KEY};
    use crate::test_data::sample_fields;

    use super::*;

    fn yes(_: &Post) -> bool {
        true
    }

    fn no(_: &Post) -> bool {
        false
    }

    fn empty_store() -> Rc<PostStore> {
        let storage = Rc::new(MemoryStorage::new());
        storage.set(POSTS_KEY, "[]").unwrap();
        Rc::new(PostStore::new(storage, ChangeNotifier::new()))
    }

    fn store_with(posts: &[Post]) -> Rc<PostStore> {
        let store = empty_store();
        store.save_all(posts).unwrap();
        store
    }

    fn post(id: &str, title: &str) -> Post {
        Post::from_fields(PostId::from(id), sample_fields(title))
    }

    #[test]
    fn test_open_seeds_first_run() -> Result<(), EditorError> {
        let storage = Rc::new(MemoryStorage::new());
        let store = Rc::new(PostStore::new(storage, ChangeNotifier::new()));

        let editor = AdminEditor::open(store.clone())?;
        assert_eq!(editor.posts().len(), 1);
        assert_eq!(store.load(), editor.posts());

        // Opening again does not seed twice
        let editor = AdminEditor::open(store.clone())?;
        assert_eq!(editor.posts().len(), 1);
        Ok(())
    }

    #[test]
    fn test_open_does_not_seed_malformed_snapshot() -> Result<(), EditorError> {
        let storage = Rc::new(MemoryStorage::new());
        storage.set(POSTS_KEY, "garbage")?;
        let store = Rc::new(PostStore::new(storage, ChangeNotifier::new()));

        let editor = AdminEditor::open(store)?;
        assert!(editor.posts().is_empty());
        Ok(())
    }

    #[test]
    fn test_open_keeps_unreadable_snapshot() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let slot = dir.path().join("capvalis_blog_posts.json");
        // Latin-1 encoded title, not valid UTF-8
        let raw: &[u8] = b"[{\"id\":\"p1\",\"title\":\"caf\xe9\"}]";
        fs::write(&slot, raw)?;

        let store = Rc::new(PostStore::new(Rc::new(FileStorage::new(dir.path())), ChangeNotifier::new()));
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _ = store.subscribe(move || {
            h.set(h.get() + 1);
            Ok(())
        });

        match AdminEditor::open(store) {
            Err(EditorError::Storage(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            other => panic!("unexpected result {:?}", other.map(|e| e.posts().len())),
        }
        assert_eq!(fs::read(&slot)?, raw);
        assert_eq!(hits.get(), 0);
        Ok(())
    }

    #[test]
    fn test_create_on_empty_store() -> Result<(), EditorError> {
        let store = empty_store();
        let mut editor = AdminEditor::open(store.clone())?;

        let created = editor.create(sample_fields("A"))?;

        let posts = store.load();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "A");
        assert!(!posts[0].id.as_str().is_empty());
        assert_eq!(posts[0], created);
        Ok(())
    }

    #[test]
    fn test_create_prepends_with_unique_ids() -> Result<(), EditorError> {
        let store = empty_store();
        let mut editor = AdminEditor::open(store.clone())?;

        for i in 0..20 {
            editor.create(sample_fields(&format!("post {}", i)))?;
        }

        let posts = store.load();
        assert_eq!(posts.len(), 20);
        assert_eq!(posts[0].title, "post 19");
        let ids: HashSet<&PostId> = posts.iter().map(|p| &p.id).collect();
        assert_eq!(ids.len(), 20);
        Ok(())
    }

    #[test]
    fn test_create_rejects_invalid_fields() -> Result<(), EditorError> {
        let store = empty_store();
        let mut editor = AdminEditor::open(store.clone())?;

        let mut fields = sample_fields("A");
        fields.author = String::new();
        match editor.create(fields) {
            Err(EditorError::Validation(errors)) => assert_eq!(errors.fields(), ["author"]),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(store.load().is_empty());
        Ok(())
    }

    #[test]
    fn test_create_sees_other_writers() -> Result<(), EditorError> {
        let store = empty_store();
        let mut editor = AdminEditor::open(store.clone())?;
        let mut other = AdminEditor::open(store.clone())?;

        editor.create(sample_fields("A"))?;
        other.create(sample_fields("B"))?;

        let titles: Vec<String> = store.load().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, ["B", "A"]);
        Ok(())
    }

    #[test]
    fn test_update_replaces_entry() -> Result<(), EditorError> {
        let store = store_with(&[post("p1", "one"), post("p2", "two")]);
        let mut editor = AdminEditor::open(store.clone())?;

        let mut fields = sample_fields("two, revised");
        fields.id = Some(PostId::from("ignored"));
        fields.related_posts.push(RelatedPost { title: "See also".to_string(), url: "#".to_string() });
        let updated = editor.update(&PostId::from("p2"), fields)?;

        let posts = store.load();
        assert_eq!(posts.len(), 2);
        let matching: Vec<&Post> = posts.iter().filter(|p| p.id == PostId::from("p2")).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0], &updated);
        assert_eq!(matching[0].title, "two, revised");
        assert_eq!(matching[0].related_posts.len(), 1);
        assert_eq!(posts[1].id, PostId::from("p2"));
        Ok(())
    }

    #[test]
    fn test_update_missing_post() -> Result<(), EditorError> {
        let store = store_with(&[post("p1", "one")]);
        let mut editor = AdminEditor::open(store.clone())?;

        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _ = store.subscribe(move || {
            h.set(h.get() + 1);
            Ok(())
        });

        let res = editor.update(&PostId::from("gone"), sample_fields("x"));
        assert!(matches!(res, Err(EditorError::NotFound(id)) if id == PostId::from("gone")));
        assert_eq!(store.load(), vec![post("p1", "one")]);
        assert_eq!(hits.get(), 0);
        Ok(())
    }

    #[test]
    fn test_update_after_concurrent_delete() -> Result<(), EditorError> {
        let store = store_with(&[post("p1", "one")]);
        let mut editor = AdminEditor::open(store.clone())?;
        let mut other_tab = AdminEditor::open(store.clone())?;

        editor.edit(&PostId::from("p1"))?;
        other_tab.delete(&PostId::from("p1"), yes)?;

        editor.form_mut().title = "changed".to_string();
        assert!(matches!(editor.submit(), Err(EditorError::NotFound(_))));
        assert!(store.load().is_empty());
        // The failed submit keeps the buffer
        assert_eq!(editor.form().title, "changed");
        Ok(())
    }

    #[test]
    fn test_delete() -> Result<(), EditorError> {
        let store = store_with(&[post("p1", "one"), post("p2", "two")]);
        let mut editor = AdminEditor::open(store.clone())?;

        assert!(editor.delete(&PostId::from("p1"), yes)?);
        assert_eq!(store.load(), vec![post("p2", "two")]);
        assert_eq!(editor.posts(), store.load());
        Ok(())
    }

    #[test]
    fn test_delete_missing_is_noop() -> Result<(), EditorError> {
        let store = store_with(&[post("p1", "one")]);
        let mut editor = AdminEditor::open(store.clone())?;

        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _ = store.subscribe(move || {
            h.set(h.get() + 1);
            Ok(())
        });

        assert!(!editor.delete(&PostId::from("p9"), yes)?);
        assert!(!editor.delete(&PostId::from("p9"), yes)?);
        assert_eq!(store.load(), vec![post("p1", "one")]);
        assert_eq!(hits.get(), 0);
        Ok(())
    }

    #[test]
    fn test_delete_needs_confirmation() -> Result<(), EditorError> {
        let store = store_with(&[post("p1", "one")]);
        let mut editor = AdminEditor::open(store.clone())?;

        assert!(!editor.delete(&PostId::from("p1"), no)?);
        assert_eq!(store.load().len(), 1);

        let asked = Cell::new(String::new());
        let confirm = |p: &Post| {
            asked.set(p.title.clone());
            true
        };
        assert!(editor.delete(&PostId::from("p1"), confirm)?);
        assert_eq!(asked.take(), "one");
        assert!(store.load().is_empty());
        Ok(())
    }

    #[test]
    fn test_delete_clears_form_of_deleted_post() -> Result<(), EditorError> {
        let store = store_with(&[post("p1", "one")]);
        let mut editor = AdminEditor::open(store)?;

        editor.edit(&PostId::from("p1"))?;
        assert_eq!(editor.form_mode(), FormMode::Editing);
        editor.delete(&PostId::from("p1"), yes)?;
        assert_eq!(editor.form_mode(), FormMode::Creating);
        Ok(())
    }

    #[test]
    fn test_form_submit_create_then_edit() -> Result<(), EditorError> {
        let store = empty_store();
        let mut editor = AdminEditor::open(store.clone())?;

        *editor.form_mut() = sample_fields("draft");
        assert_eq!(editor.form_mode(), FormMode::Creating);
        let created = editor.submit()?;
        assert_eq!(editor.form(), &PostFields::default());

        editor.edit(&created.id)?;
        assert_eq!(editor.form_mode(), FormMode::Editing);
        editor.form_mut().title = "final".to_string();
        let updated = editor.submit()?;

        assert_eq!(updated.id, created.id);
        assert_eq!(store.load(), vec![updated]);
        assert_eq!(editor.form_mode(), FormMode::Creating);
        Ok(())
    }

    #[test]
    fn test_edit_unknown_post() -> Result<(), EditorError> {
        let mut editor = AdminEditor::open(empty_store())?;
        assert!(matches!(editor.edit(&PostId::from("nope")), Err(EditorError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_related_posts() -> Result<(), EditorError> {
        let store = empty_store();
        let mut editor = AdminEditor::open(store.clone())?;

        editor.add_related_post("First", "https://a")?;
        assert!(matches!(editor.add_related_post("  ", "https://b"), Err(EditorError::EmptyRelatedTitle)));
        editor.add_related_post("Second", "")?;
        editor.add_related_post("First", "https://a")?;
        assert_eq!(editor.form().related_posts.len(), 3);

        let removed = editor.remove_related_post(0);
        assert_eq!(removed.map(|r| r.title), Some("First".to_string()));
        assert!(editor.remove_related_post(7).is_none());

        // Nothing is stored until submit
        assert!(store.load().is_empty());

        let related = editor.form().related_posts.clone();
        let fields = PostFields { related_posts: related, ..sample_fields("with links") };
        *editor.form_mut() = fields;
        let post = editor.submit()?;
        let titles: Vec<&str> = post.related_posts.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Second", "First"]);
        Ok(())
    }

    #[test]
    fn test_filter() -> Result<(), EditorError> {
        let mut ipo = post("p1", "SME listings");
        ipo.category = "IPO News".to_string();
        let mut crash = post("p2", "Weekly wrap");
        crash.content = "Markets CRASHED on Friday".to_string();
        let store = store_with(&[ipo, crash]);
        let editor = AdminEditor::open(store.clone())?;

        let ids = |posts: Vec<&Post>| posts.into_iter().map(|p| p.id.0.clone()).collect::<Vec<_>>();
        assert_eq!(ids(editor.filter("ipo")), ["p1"]);
        assert_eq!(ids(editor.filter("crashed")), ["p2"]);
        assert_eq!(ids(editor.filter("WEEKLY")), ["p2"]);
        assert_eq!(ids(editor.filter("")), ["p1", "p2"]);

        assert!(editor.filter("bitcoin").is_empty());
        assert_eq!(store.load().len(), 2);
        Ok(())
    }

    fn dated(id: &str, category: &str, date: &str) -> Post {
        let mut p = post(id, id);
        p.category = category.to_string();
        p.date = date.to_string();
        p
    }

    #[test]
    fn test_stats_empty_store() -> Result<(), EditorError> {
        let editor = AdminEditor::open(empty_store())?;
        let stats = editor.stats();
        assert_eq!(stats.total, 0);
        assert!(stats.latest.is_none());
        assert!(stats.top_category.is_none());
        Ok(())
    }

    #[test]
    fn test_stats() -> Result<(), EditorError> {
        let store = store_with(&[
            dated("a", "Market Analysis", "2024-01-01"),
            dated("b", "IPO News", "2025-06-01"),
            dated("c", "IPO News", "2023-03-03"),
            dated("d", "Economy", "not a date"),
        ]);
        let editor = AdminEditor::open(store)?;

        let stats = editor.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.latest.map(|p| p.id.0), Some("b".to_string()));
        assert_eq!(stats.top_category, Some(("IPO News".to_string(), 2)));
        Ok(())
    }

    #[test]
    fn test_stats_ties_keep_stored_order() -> Result<(), EditorError> {
        let store = store_with(&[
            dated("undated", "Economy", ""),
            dated("a", "Economy", "2025-02-02"),
            dated("b", "IPO News", "2025-02-02"),
            dated("c", "IPO News", "2024-01-01"),
        ]);
        let editor = AdminEditor::open(store)?;

        let stats = editor.stats();
        assert_eq!(stats.latest.map(|p| p.id.0), Some("a".to_string()));
        assert_eq!(stats.top_category, Some(("Economy".to_string(), 2)));

        let editor = AdminEditor::open(store_with(&[
            dated("x", "IPO News", "someday"),
            dated("y", "Economy", "2020-01-01"),
            dated("z", "Economy", "later"),
            dated("w", "IPO News", "never"),
        ]))?;
        let stats = editor.stats();
        assert_eq!(stats.latest.map(|p| p.id.0), Some("y".to_string()));
        assert_eq!(stats.top_category, Some(("IPO News".to_string(), 2)));
        Ok(())
    }
}
