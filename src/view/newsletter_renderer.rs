use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post::{Post, DEFAULT_IMAGE_URL};
use crate::text_utils::{format_long_date, paragraphs};

pub const DEFAULT_TEMPLATE: &str = include_str!("../../res/newsletter.html");

#[derive(ramhorns::Content)]
struct NewsletterPage<'a> {
    post_list: Vec<PostItem<'a>>,
    no_posts: bool,
    page_list: Vec<ViewPagination>,
    show_pagination: bool,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    id: &'a str,
    title: &'a str,
    author: &'a str,
    category: &'a str,
    date: String,
    image_url: &'a str,
    paragraphs: Vec<ViewParagraph<'a>>,
    related_posts: Vec<ViewRelated<'a>>,
    has_related: bool,
    source: &'a str,
    source_url: &'a str,
    has_source: bool,
}

#[derive(ramhorns::Content)]
struct ViewParagraph<'a> {
    text: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewRelated<'a> {
    title: &'a str,
    url: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewPagination {
    current: bool,
    number: u32,
}

pub struct NewsletterRenderer<'a> {
    pub template: Template<'a>,
}

impl NewsletterRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<NewsletterRenderer> {
        let template = match Template::new(tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing newsletter template: {}", e)));
            }
        };

        Ok(NewsletterRenderer {
            template,
        })
    }

    /// Renders one page of posts. `page_count` drives the page links.
    pub fn render(&self, posts: &[Post], cur_page: u32, page_count: u32) -> String {
        let post_list: Vec<PostItem> = posts.iter().map(Self::to_item).collect();

        let page_list: Vec<ViewPagination> = (1..=page_count)
            .map(|number| ViewPagination {
                current: number == cur_page,
                number,
            })
            .collect();

        self.template.render(&NewsletterPage {
            no_posts: post_list.is_empty(),
            post_list,
            page_list,
            show_pagination: page_count > 1,
        })
    }

    fn to_item(post: &Post) -> PostItem {
        let image_url = if post.image_url.is_empty() {
            DEFAULT_IMAGE_URL
        } else {
            post.image_url.as_str()
        };

        let related_posts: Vec<ViewRelated> = post.related_posts.iter()
            .map(|r| ViewRelated { title: r.title.as_str(), url: r.url.as_str() })
            .collect();

        PostItem {
            id: post.id.as_str(),
            title: post.title.as_str(),
            author: post.author.as_str(),
            category: post.category.as_str(),
            date: format_long_date(&post.date),
            image_url,
            paragraphs: paragraphs(&post.content).into_iter().map(|text| ViewParagraph { text }).collect(),
            has_related: !related_posts.is_empty(),
            related_posts,
            source: post.source.as_str(),
            source_url: post.source_url.as_str(),
            has_source: !post.source.is_empty(),
        }
    }
}
