// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Cursor-following pagination over paged listing calls.
//!
//! [`paginate`] turns "call with a cursor, get a page and maybe the next
//! cursor" into a lazy stream of pages. It knows nothing about the shape of
//! the request or response; callers supply how to inject a cursor into a
//! request and how to read one from a page.

use std::future::Future;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::cancel::{is_cancelled, CancellationFlag};
use crate::error::{CatalogError, CatalogResult};

enum Cursor {
    First,
    Next(String),
    Exhausted,
}

struct Pager<Req, Call, SetCursor, NextCursor> {
    template: Req,
    call: Call,
    set_cursor: SetCursor,
    next_cursor: NextCursor,
    cancel: Option<CancellationFlag>,
    cursor: Cursor,
}

/// Lazily drain a paged listing.
///
/// Each poll that needs a new page clones `template`, applies the current
/// cursor with `set_cursor` (`None` for the first page) and awaits `call`.
/// The stream ends after a page for which `next_cursor` returns `None` (an
/// empty token counts as none), or right after the first error. Pages are
/// fetched strictly one after another.
///
/// If `cancel` is set, it is checked before every call except the first;
/// once cancelled the stream yields [`CatalogError::Cancelled`] and ends.
///
/// The stream is not restartable: build a new one to list again.
pub fn paginate<'a, Req, Page, Call, Fut, SetCursor, NextCursor>(
    template: Req,
    set_cursor: SetCursor,
    next_cursor: NextCursor,
    call: Call,
    cancel: Option<CancellationFlag>,
) -> BoxStream<'a, CatalogResult<Page>>
where
    Req: Clone + Send + 'a,
    Page: Send + 'a,
    Call: Fn(Req) -> Fut + Send + 'a,
    Fut: Future<Output = CatalogResult<Page>> + Send + 'a,
    SetCursor: Fn(&mut Req, Option<String>) + Send + 'a,
    NextCursor: Fn(&Page) -> Option<String> + Send + 'a,
{
    let pager = Pager {
        template,
        call,
        set_cursor,
        next_cursor,
        cancel,
        cursor: Cursor::First,
    };

    stream::unfold(pager, |mut pager| async move {
        let cursor = match std::mem::replace(&mut pager.cursor, Cursor::Exhausted) {
            Cursor::Exhausted => return None,
            Cursor::First => None,
            Cursor::Next(token) => {
                if is_cancelled(pager.cancel.as_ref()) {
                    return Some((Err(CatalogError::Cancelled), pager));
                }
                Some(token)
            }
        };

        let mut request = pager.template.clone();
        (pager.set_cursor)(&mut request, cursor);

        let response = (pager.call)(request);
        match response.await {
            Ok(page) => {
                if let Some(token) = (pager.next_cursor)(&page).filter(|t| !t.is_empty()) {
                    pager.cursor = Cursor::Next(token);
                }
                Some((Ok(page), pager))
            }
            Err(e) => Some((Err(e), pager)),
        }
    })
    .boxed()
}

/// Drain a page stream into a vector, stopping at the first error.
pub async fn collect_pages<Page>(
    pages: BoxStream<'_, CatalogResult<Page>>,
) -> CatalogResult<Vec<Page>> {
    pages.try_collect().await
}
