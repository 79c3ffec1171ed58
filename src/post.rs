use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::text_utils::today;

pub const DEFAULT_CATEGORY: &str = "Market Analysis";
pub const DEFAULT_IMAGE_URL: &str = "https://images.moneycontrol.com/static-mcnews/2025/02/20250219011951_IPO-main-pic.jpg?impolicy=website&width=770&height=431";
pub const TITLE_MAX_LEN: usize = 100;

pub const CATEGORIES: [&str; 7] = [
    "Market Analysis",
    "IPO News",
    "Trading Strategies",
    "Investment Opportunities",
    "Risk Management",
    "Tech Insights",
    "Regulatory Updates",
];

/// Whether `category` is one of the editor's suggested categories. Other
/// categories are still accepted.
pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn generate() -> Self {
        PostId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        PostId(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedPost {
    pub title: String,
    pub url: String,
}

/// A blog post as stored in the `capvalis_blog_posts` slot.
///
/// Field names are serialized in camelCase, so a snapshot looks like
/// `[{"id": "...", "title": "...", "imageUrl": "...", "relatedPosts": [...]}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub author: String,
    pub category: String,
    #[serde(default)]
    pub date: String,
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub related_posts: Vec<RelatedPost>,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, date={}, author={}, category={}\ntitle={}\ncontent:\n{}",
               self.id,
               self.date,
               self.author,
               self.category,
               self.title,
               self.content
        )
    }
}

impl Post {
    /// Builds a post from the form buffer, keeping `id` as the identity.
    /// An empty date falls back to today.
    pub fn from_fields(id: PostId, fields: PostFields) -> Post {
        let date = if fields.date.trim().is_empty() {
            today()
        } else {
            fields.date
        };

        Post {
            id,
            title: fields.title,
            author: fields.author,
            category: fields.category,
            date,
            content: fields.content,
            image_url: fields.image_url,
            source: fields.source,
            source_url: fields.source_url,
            related_posts: fields.related_posts,
        }
    }

    pub fn to_fields(&self) -> PostFields {
        PostFields {
            id: Some(self.id.clone()),
            title: self.title.clone(),
            author: self.author.clone(),
            category: self.category.clone(),
            date: self.date.clone(),
            content: self.content.clone(),
            image_url: self.image_url.clone(),
            source: self.source.clone(),
            source_url: self.source_url.clone(),
            related_posts: self.related_posts.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Creating,
    Editing,
}

/// Editable post form. `id` is only set while editing an existing post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFields {
    pub id: Option<PostId>,
    pub title: String,
    pub author: String,
    pub category: String,
    pub date: String,
    pub content: String,
    pub image_url: String,
    pub source: String,
    pub source_url: String,
    pub related_posts: Vec<RelatedPost>,
}

impl Default for PostFields {
    fn default() -> Self {
        PostFields {
            id: None,
            title: String::new(),
            author: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            date: today(),
            content: String::new(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            source: String::new(),
            source_url: String::new(),
            related_posts: vec![],
        }
    }
}

impl PostFields {
    pub fn mode(&self) -> FormMode {
        match self.id {
            Some(_) => FormMode::Editing,
            None => FormMode::Creating,
        }
    }

    /// Returns the names of the fields that block a save.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = vec![];

        let required = [
            ("title", &self.title),
            ("category", &self.category),
            ("author", &self.author),
            ("content", &self.content),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                errors.push(FieldError { field: name, message: format!("{} is required", name) });
            }
        }

        if self.title.chars().count() > TITLE_MAX_LEN {
            errors.push(FieldError {
                field: "title",
                message: format!("title must be at most {} characters", TITLE_MAX_LEN),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join(", "))
    }
}

/// Sample post written on first run so the newsletter is never empty.
pub fn seed_post(id: PostId) -> Post {
    Post {
        id,
        title: "Spinaroo Commercial IPO closes with 1.49 times subscription".to_string(),
        category: "IPO News".to_string(),
        author: "Moneycontrol News".to_string(),
        date: "2025-04-03".to_string(),
        content: SEED_CONTENT.to_string(),
        image_url: DEFAULT_IMAGE_URL.to_string(),
        source: "Moneycontrol".to_string(),
        source_url: "https://www.moneycontrol.com/news/business/ipo/spinaroo-commercial-ipo-closes-with-1-49-times-subscription-with-retail-non-institutional-investors-support-12984134.html".to_string(),
        related_posts: vec![
            RelatedPost {
                title: "Trump tariffs to impact growth of Indian medical devices exports".to_string(),
                url: "#".to_string(),
            },
            RelatedPost {
                title: "Indian startups began to walk despite the system; to fly they need support".to_string(),
                url: "#".to_string(),
            },
        ],
    }
}

const SEED_CONTENT: &str = "Spinaroo Commercial's initial public offering closed with 1.49 times subscription on April 3, backed by support from the retail and non-institutional investors.

The company that manufactures aluminum foil containers and paper cups & plates along with offering paper cup-related machinery is raising Rs 10.17 crore via maiden public issue at a price of Rs 51 per share.

Investors have subscribed for 29.78 lakh equity shares during March 28-April 3 compared to the offer size of 19.94 lakh shares via 605 applications, the subscription data on the BSE showed.

Non-institutional investors topped subscription numbers, buying 1.94 times their reserved portion, while the allotted quota of retail investors was subscribed 1.2 times.

West Bengal-based Spinaroo Commercial will finalise the IPO share allotment by April 4, and the trading in its equity shares will commence on the BSE SME effective April 8.

The company is going to spend Rs 7.12 crore out of net IPO proceeds mainly for working capital requirements, and Rs 2 crore for general corporate expenses.

Finshore Management Services acted as the sole merchant banker for the issue.";
