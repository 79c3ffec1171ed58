use std::io;
use std::io::{BufRead, Write};

use anyhow::Result;

use capvalis::admin_editor::{AdminEditor, EditorError};
use capvalis::post::{is_known_category, Post, PostFields, PostId, CATEGORIES};
use capvalis::util::os_helper::default_author;

use crate::{DeleteArgs, EditArgs, PostArgs, Session};

fn stdin_confirm(post: &Post) -> bool {
    print!("Are you sure you want to delete \"{}\"? [y/N] ", post.title);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_summary(post: &Post) {
    println!("{}  {}  [{}]  {}", post.id, post.date, post.category, post.title);
}

fn report(err: EditorError) -> Result<()> {
    match err {
        EditorError::Validation(errors) => {
            eprintln!("Post not saved:");
            for error in errors.0 {
                eprintln!("  - {}", error.message);
            }
            Ok(())
        }
        EditorError::NotFound(id) => {
            eprintln!("Post {} does not exist (it may have been deleted)", id);
            Ok(())
        }
        EditorError::EmptyRelatedTitle => {
            eprintln!("Related posts need a title: use --related \"title|url\"");
            Ok(())
        }
        EditorError::Storage(e) => Err(e.into()),
    }
}

fn apply_args(editor: &mut AdminEditor, args: &PostArgs) -> Result<(), EditorError> {
    if let Some(category) = args.category.as_deref().filter(|c| !is_known_category(c)) {
        eprintln!("Note: \"{}\" is not a listed category ({})", category, CATEGORIES.join(", "));
    }

    let form = editor.form_mut();
    let overrides = [
        (&mut form.title, &args.title),
        (&mut form.category, &args.category),
        (&mut form.author, &args.author),
        (&mut form.content, &args.content),
        (&mut form.date, &args.date),
        (&mut form.image_url, &args.image_url),
        (&mut form.source, &args.source),
        (&mut form.source_url, &args.source_url),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            *field = value.clone();
        }
    }

    for related in &args.related {
        let (title, url) = related.split_once('|').unwrap_or((related.as_str(), ""));
        editor.add_related_post(title.trim(), url.trim())?;
    }

    Ok(())
}

pub fn list_cmd(session: &Session, search: Option<String>) -> Result<()> {
    let editor = AdminEditor::open(session.store.clone())?;
    let posts = editor.filter(search.as_deref().unwrap_or(""));

    if posts.is_empty() {
        println!("No posts found");
    }
    for post in posts {
        print_summary(post);
    }
    Ok(())
}

pub fn show_cmd(session: &Session, id: String) -> Result<()> {
    let editor = AdminEditor::open(session.store.clone())?;
    let id = PostId(id);
    match editor.posts().iter().find(|p| p.id == id) {
        Some(post) => {
            println!("{}", post);
            for related in &post.related_posts {
                println!("related: {} <{}>", related.title, related.url);
            }
        }
        None => eprintln!("Post {} does not exist", id),
    }
    Ok(())
}

pub fn create_cmd(session: &Session, args: PostArgs) -> Result<()> {
    let mut editor = AdminEditor::open(session.store.clone())?;
    *editor.form_mut() = PostFields {
        author: default_author(),
        ..PostFields::default()
    };

    let res = apply_args(&mut editor, &args).and_then(|_| editor.submit());
    match res {
        Ok(post) => {
            println!("Created post {}", post.id);
            Ok(())
        }
        Err(e) => report(e),
    }
}

pub fn edit_cmd(session: &Session, args: EditArgs) -> Result<()> {
    let mut editor = AdminEditor::open(session.store.clone())?;
    if let Err(e) = editor.edit(&PostId(args.id)) {
        return report(e);
    }

    if args.clear_related {
        while editor.remove_related_post(0).is_some() {}
    }

    let res = apply_args(&mut editor, &args.post).and_then(|_| editor.submit());
    match res {
        Ok(post) => {
            println!("Updated post {}", post.id);
            Ok(())
        }
        Err(e) => report(e),
    }
}

pub fn delete_cmd(session: &Session, args: DeleteArgs) -> Result<()> {
    let mut editor = AdminEditor::open(session.store.clone())?;
    let id = PostId(args.id);

    let res = if args.yes {
        editor.delete(&id, |_| true)
    } else {
        editor.delete(&id, stdin_confirm)
    };

    match res {
        Ok(true) => println!("Deleted post {}", id),
        Ok(false) => println!("Nothing deleted"),
        Err(e) => return report(e),
    }
    Ok(())
}

pub fn stats_cmd(session: &Session) -> Result<()> {
    let editor = AdminEditor::open(session.store.clone())?;
    let stats = editor.stats();

    println!("Total posts:  {}", stats.total);
    match stats.latest {
        Some(post) => println!("Latest post:  {} ({})", post.title, post.date),
        None => println!("Latest post:  No posts yet"),
    }
    match stats.top_category {
        Some((category, count)) => println!("Top category: {} ({} posts)", category, count),
        None => println!("Top category: -"),
    }
    Ok(())
}

pub fn recent_cmd(session: &Session, count: Option<usize>) -> Result<()> {
    let mut view = session.newsletter();
    view.mount();
    let count = count.unwrap_or(session.config.defaults.recent_count);
    for post in view.most_recent(count) {
        print_summary(&post);
    }
    Ok(())
}
