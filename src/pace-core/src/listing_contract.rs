use crate::listing::{ListingError, PlaylistListing};
use crate::models::{PageToken, PlaylistId, SongUrl};
use thiserror::Error;

/// Upper bound on pages walked by the contract suite, so a listing that never
/// stops returning tokens fails instead of looping.
const MAX_CONTRACT_PAGES: usize = 1_000;

/// Expectations supplied by a listing implementation to run the shared contract suite.
#[derive(Debug, Clone)]
pub struct ListingContractExpectations {
    /// A playlist that exists in the test fixture.
    pub playlist_id: PlaylistId,
    /// Page size to request on every call.
    pub page_size: u32,
    /// Total count the remote reports for `playlist_id`.
    pub expected_total_count: u32,
    /// Every item URL of `playlist_id`, in playlist order.
    pub expected_urls: Vec<SongUrl>,
    /// A playlist id the fixture does not know about.
    pub missing_playlist_id: PlaylistId,
}

/// Errors surfaced by the listing contract test harness.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingContractError {
    #[error("first page of {playlist_id} was empty")]
    EmptyFirstPage { playlist_id: PlaylistId },
    #[error("page returned {actual} items, more than the requested {page_size}")]
    PageTooLarge { page_size: u32, actual: usize },
    #[error("total count mismatch: expected {expected}, got {actual}")]
    TotalCountMismatch { expected: u32, actual: u32 },
    #[error("walked item urls differ from the expected playlist order")]
    ItemOrderMismatch {
        expected: Vec<SongUrl>,
        actual: Vec<SongUrl>,
    },
    #[error("listing kept returning page tokens after {pages} pages")]
    Unterminated { pages: usize },
    #[error("unknown playlist should fail with http 404, got {actual:?}")]
    MissingPlaylistNotReported { actual: Option<ListingError> },
    #[error("listing error while running contract: {0}")]
    ListingFailure(ListingError),
}

/// Run the shared listing contract suite against a listing implementation.
///
/// Listing crates should call this from their tests with fixtures served by
/// their test setup.
pub async fn run_listing_contract<L: PlaylistListing + ?Sized>(
    listing: &L,
    expectations: &ListingContractExpectations,
) -> Result<(), ListingContractError> {
    verify_pagination(listing, expectations).await?;
    verify_missing_playlist(listing, expectations).await?;
    Ok(())
}

async fn verify_pagination<L: PlaylistListing + ?Sized>(
    listing: &L,
    expectations: &ListingContractExpectations,
) -> Result<(), ListingContractError> {
    let mut token: Option<PageToken> = None;
    let mut urls = Vec::new();
    let mut pages = 0usize;

    loop {
        let page = listing
            .fetch_page(
                &expectations.playlist_id,
                token.as_ref(),
                expectations.page_size,
            )
            .await
            .map_err(ListingContractError::ListingFailure)?;

        if pages == 0 {
            if page.items.is_empty() {
                return Err(ListingContractError::EmptyFirstPage {
                    playlist_id: expectations.playlist_id.clone(),
                });
            }
            if page.total_count != expectations.expected_total_count {
                return Err(ListingContractError::TotalCountMismatch {
                    expected: expectations.expected_total_count,
                    actual: page.total_count,
                });
            }
        }

        if page.items.len() > expectations.page_size as usize {
            return Err(ListingContractError::PageTooLarge {
                page_size: expectations.page_size,
                actual: page.items.len(),
            });
        }

        urls.extend(page.item_urls().cloned());
        pages += 1;

        match page.next_page_token {
            Some(next) if pages < MAX_CONTRACT_PAGES => token = Some(next),
            Some(_) => return Err(ListingContractError::Unterminated { pages }),
            None => break,
        }
    }

    if urls != expectations.expected_urls {
        return Err(ListingContractError::ItemOrderMismatch {
            expected: expectations.expected_urls.clone(),
            actual: urls,
        });
    }

    Ok(())
}

async fn verify_missing_playlist<L: PlaylistListing + ?Sized>(
    listing: &L,
    expectations: &ListingContractExpectations,
) -> Result<(), ListingContractError> {
    match listing
        .fetch_page(
            &expectations.missing_playlist_id,
            None,
            expectations.page_size,
        )
        .await
    {
        Err(err) if err.http_status() == Some(404) => Ok(()),
        Err(err) => Err(ListingContractError::MissingPlaylistNotReported { actual: Some(err) }),
        Ok(_) => Err(ListingContractError::MissingPlaylistNotReported { actual: None }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ListingResult;
    use crate::models::{ListingItem, ListingPage};

    /// In-memory listing paging over a fixed list of urls with numeric tokens.
    struct VecListing {
        id: PlaylistId,
        urls: Vec<&'static str>,
        report_total: u32,
    }

    #[async_trait::async_trait]
    impl PlaylistListing for VecListing {
        fn id(&self) -> &str {
            "vec"
        }

        async fn fetch_page(
            &self,
            playlist_id: &PlaylistId,
            page_token: Option<&PageToken>,
            page_size: u32,
        ) -> ListingResult<ListingPage> {
            if *playlist_id != self.id {
                return Err(ListingError::api(404, "playlist not found"));
            }
            let start: usize = page_token
                .map(|t| t.as_ref().parse().unwrap_or(0))
                .unwrap_or(0);
            let end = (start + page_size as usize).min(self.urls.len());
            let items = self.urls[start..end]
                .iter()
                .map(|u| ListingItem::new(*u))
                .collect();
            let next_page_token =
                (end < self.urls.len()).then(|| PageToken::new(end.to_string()));
            Ok(ListingPage {
                items,
                next_page_token,
                total_count: self.report_total,
            })
        }
    }

    fn expectations() -> ListingContractExpectations {
        ListingContractExpectations {
            playlist_id: PlaylistId::new("PL1"),
            page_size: 2,
            expected_total_count: 3,
            expected_urls: vec!["a".into(), "b".into(), "c".into()],
            missing_playlist_id: PlaylistId::new("nope"),
        }
    }

    #[tokio::test]
    async fn well_behaved_listing_passes() {
        let listing = VecListing {
            id: PlaylistId::new("PL1"),
            urls: vec!["a", "b", "c"],
            report_total: 3,
        };
        run_listing_contract(&listing, &expectations())
            .await
            .expect("contract should pass");
    }

    #[tokio::test]
    async fn wrong_total_is_reported() {
        let listing = VecListing {
            id: PlaylistId::new("PL1"),
            urls: vec!["a", "b", "c"],
            report_total: 7,
        };
        let err = run_listing_contract(&listing, &expectations())
            .await
            .expect_err("total mismatch");
        assert_eq!(
            err,
            ListingContractError::TotalCountMismatch {
                expected: 3,
                actual: 7
            }
        );
    }

    #[tokio::test]
    async fn wrong_order_is_reported() {
        let listing = VecListing {
            id: PlaylistId::new("PL1"),
            urls: vec!["a", "c", "b"],
            report_total: 3,
        };
        let err = run_listing_contract(&listing, &expectations())
            .await
            .expect_err("order mismatch");
        assert!(matches!(err, ListingContractError::ItemOrderMismatch { .. }));
    }
}
