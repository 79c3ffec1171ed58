#[cfg(test)]
use crate::post::PostFields;

#[cfg(test)]
pub const SNAPSHOT_DATA: &str = r##"[
  {
    "id": "p1",
    "title": "Nifty closes higher on banking rally",
    "author": "Research Desk",
    "category": "Market Analysis",
    "date": "2025-03-28",
    "content": "Banks led the gains.\n\nIT stocks were flat.",
    "imageUrl": "https://example.com/a.jpg",
    "source": "Capvalis",
    "sourceUrl": "https://capvalis.com",
    "relatedPosts": [{"title": "More", "url": "#"}]
  },
  {
    "id": "p2",
    "title": "SME IPO calendar for April",
    "author": "IPO Desk",
    "category": "IPO News",
    "date": "2025-04-01",
    "content": "Five issues open this week."
  }
]"##;

#[cfg(test)]
pub fn sample_fields(title: &str) -> PostFields {
    PostFields {
        title: title.to_string(),
        author: "X".to_string(),
        category: "Market Analysis".to_string(),
        content: "body".to_string(),
        ..PostFields::default()
    }
}
