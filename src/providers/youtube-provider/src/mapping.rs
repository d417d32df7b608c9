use pace_core::{ListingItem, ListingPage, PageToken};

use crate::models::{PlaylistItem, PlaylistItemListResponse};

pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";

/// Titles the API substitutes for entries that cannot be played.
const PLACEHOLDER_TITLES: &[&str] = &["Private video", "Deleted video"];

pub fn map_page(response: PlaylistItemListResponse) -> ListingPage {
    let total_count = response
        .page_info
        .as_ref()
        .map(|info| info.total_results)
        .unwrap_or(0);
    let items = response.items.iter().filter_map(map_item).collect();
    ListingPage {
        items,
        next_page_token: response
            .next_page_token
            .filter(|token| !token.is_empty())
            .map(PageToken::new),
        total_count,
    }
}

pub fn map_item(item: &PlaylistItem) -> Option<ListingItem> {
    let video_id = item
        .content_details
        .as_ref()
        .and_then(|details| details.video_id.clone())
        .or_else(|| {
            item.snippet
                .as_ref()
                .and_then(|snippet| snippet.resource_id.as_ref())
                .and_then(|resource| resource.video_id.clone())
        })
        .filter(|id| !id.is_empty())?;

    let url = format!("{WATCH_URL_BASE}{video_id}");
    let title = item
        .snippet
        .as_ref()
        .and_then(|snippet| snippet.title.clone())
        .filter(|title| !PLACEHOLDER_TITLES.contains(&title.as_str()));

    Some(match title {
        Some(title) => ListingItem::with_title(url, title),
        None => ListingItem::new(url),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PlaylistItemListResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn maps_video_ids_to_watch_urls() {
        let page = map_page(parse(
            r#"{
                "nextPageToken": "CAEQAA",
                "pageInfo": {"totalResults": 12, "resultsPerPage": 1},
                "items": [{
                    "snippet": {"title": "First", "resourceId": {"videoId": "abc"}},
                    "contentDetails": {"videoId": "abc"}
                }]
            }"#,
        ));

        assert_eq!(page.total_count, 12);
        assert_eq!(page.next_page_token, Some(PageToken::from("CAEQAA")));
        assert_eq!(
            page.items,
            vec![ListingItem::with_title(
                "https://www.youtube.com/watch?v=abc",
                "First"
            )]
        );
    }

    #[test]
    fn falls_back_to_snippet_resource_id() {
        let page = map_page(parse(
            r#"{"items": [{"snippet": {"resourceId": {"videoId": "xyz"}}}]}"#,
        ));
        assert_eq!(page.items[0].url.as_str(), "https://www.youtube.com/watch?v=xyz");
        assert_eq!(page.items[0].title, None);
        assert_eq!(page.next_page_token, None);
    }

    #[test]
    fn skips_items_without_video_and_placeholder_titles() {
        let page = map_page(parse(
            r#"{"items": [
                {"contentDetails": {}},
                {"snippet": {"title": "Private video"}, "contentDetails": {"videoId": "p1"}}
            ]}"#,
        ));
        assert_eq!(page.items, vec![ListingItem::new("https://www.youtube.com/watch?v=p1")]);
    }
}
