use rand::Rng;

use crate::remote::RawArticle;
use crate::storage::{LayoutKind, NewArticle};

/// Gallery cards repeat the single upstream image this many times; the API
/// never supplies more than one image per article.
const GALLERY_IMAGE_COUNT: usize = 3;

/// Convert a raw payload into a cacheable record, or drop it.
///
/// Payloads missing `url` or `title` (absent or empty) yield `None` and are
/// never persisted. The layout kind is a presentation-variety draw, not
/// derived from content: uniform in [0,10), 0-6 Standard (70%), 7-8 Gallery
/// (20%), 9 TextOnly (10%). `inserted_at` is left at zero; the mediator
/// assigns it when the batch order is final.
///
/// Pure function of the payload plus the entropy source.
pub fn map_article<R: Rng>(raw: &RawArticle, rng: &mut R) -> Option<NewArticle> {
    let url = raw.url.as_deref().filter(|s| !s.is_empty())?.to_string();
    let title = raw.title.as_deref().filter(|s| !s.is_empty())?.to_string();

    let layout_kind = match rng.gen_range(0..10) {
        0..=6 => LayoutKind::Standard,
        7 | 8 => LayoutKind::Gallery,
        _ => LayoutKind::TextOnly,
    };

    let gallery_images = match (&layout_kind, raw.image_url.as_deref()) {
        (LayoutKind::Gallery, Some(image)) if !image.is_empty() => {
            vec![image.to_string(); GALLERY_IMAGE_COUNT]
        }
        _ => Vec::new(),
    };

    Some(NewArticle {
        url,
        title,
        description: raw.description.clone(),
        body: raw.content.clone(),
        image_url: raw.image_url.clone(),
        published_at: raw.published_at.clone(),
        source_name: raw.source.as_ref().and_then(|s| s.name.clone()),
        source_origin: raw.source.as_ref().and_then(|s| s.url.clone()),
        layout_kind,
        gallery_images,
        is_liked: false,
        inserted_at: 0,
    })
}
