//! Print session state and page replay

use std::sync::{Mutex, PoisonError};

use log::{debug, error, warn};

use super::device::{PageAdvance, PageCanvas};
use super::geometry::{destination_geometry, Orientation, PlacementPolicy};
use super::metafile::Metafile;
use super::store::PageStore;

/// State for one print job: the rendered pages plus the page cursor the
/// host's page-advance callbacks move forward.
///
/// The cursor only ever increases, by exactly one per successfully drawn
/// page; once it passes the last page the session is terminal.
pub struct PrintSession {
    pages: PageStore,
    current_page: usize,
    last_page: usize,
    policy: PlacementPolicy,
    orientation: Orientation,
    /// At most one decoded page handle alive at a time. The mutex keeps the
    /// draw path a critical section should the host ever call back from a
    /// printing worker thread.
    handle: Mutex<Option<Metafile>>,
}

impl PrintSession {
    #[must_use]
    pub fn new(pages: PageStore, policy: PlacementPolicy, orientation: Orientation) -> Self {
        let last_page = pages.len();
        Self {
            pages,
            current_page: 1,
            last_page,
            policy,
            orientation,
            handle: Mutex::new(None),
        }
    }

    /// Total pages in the job.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.last_page
    }

    /// 1-based cursor of the next page to print.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// True once every page has been drawn.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.current_page > self.last_page
    }

    /// One host page-advance callback step: draw the page under the cursor,
    /// move the cursor, and answer whether more pages are pending.
    ///
    /// A failed draw stops the job: the cursor stays put and the answer is
    /// done.
    pub fn advance(&mut self, canvas: &mut dyn PageCanvas) -> PageAdvance {
        if self.current_page <= self.last_page && self.draw_page(self.current_page, canvas) {
            self.current_page += 1;
            if self.current_page <= self.last_page {
                return PageAdvance::MorePages;
            }
        }
        PageAdvance::Done
    }

    /// Replay one stored page into the canvas.
    ///
    /// Returns false — nothing drawn, no error surfaced — when the page is
    /// absent from the store or its buffer cannot be decoded.
    pub fn draw_page(&self, page: usize, canvas: &mut dyn PageCanvas) -> bool {
        let Some(bytes) = self.pages.page(page) else {
            warn!("Page {page} missing from the rendered store, nothing drawn");
            return false;
        };

        let mut slot = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Release the previous page's handle before decoding the next.
        *slot = None;
        let metafile = match Metafile::decode(bytes) {
            Ok(metafile) => metafile,
            Err(e) => {
                warn!("Page {page}: undecodable page stream: {e}");
                return false;
            }
        };
        debug!(
            "Page {page}: {}x{} native units, {} record(s)",
            metafile.width(),
            metafile.height(),
            metafile.record_count()
        );

        let placement = destination_geometry(self.policy, self.orientation);
        let metafile = slot.insert(metafile);
        if let Err(e) = metafile.replay_into(&placement, canvas) {
            error!("Page {page}: device rejected replay: {e}");
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spool::device::{DeviceFault, PlayedRecord};
    use crate::spool::geometry::Placement;
    use crate::spool::metafile::StreamBuilder;

    #[derive(Default)]
    struct CountingCanvas {
        placements: Vec<Placement>,
        records: Vec<PlayedRecord>,
    }

    impl PageCanvas for CountingCanvas {
        fn place(&mut self, placement: &Placement) -> Result<(), DeviceFault> {
            self.placements.push(*placement);
            Ok(())
        }

        fn play_record(&mut self, record: &PlayedRecord) -> Result<(), DeviceFault> {
            self.records.push(record.clone());
            Ok(())
        }
    }

    fn page_with_marker(marker: u8) -> Vec<u8> {
        let mut builder = StreamBuilder::new(100, 200);
        builder.push_record(40, 0, &[marker]);
        builder.finish()
    }

    fn store_with_pages(markers: &[u8]) -> PageStore {
        let mut store = PageStore::new();
        for &marker in markers {
            store.push(page_with_marker(marker));
        }
        store
    }

    #[test]
    fn advance_visits_every_page_in_order_exactly_once() {
        let mut session = PrintSession::new(
            store_with_pages(&[1, 2, 3]),
            PlacementPolicy::Original,
            Orientation::Portrait,
        );
        let mut canvas = CountingCanvas::default();

        let mut visited = Vec::new();
        loop {
            visited.push(session.current_page());
            let advance = session.advance(&mut canvas);
            if advance == PageAdvance::Done {
                break;
            }
        }

        assert_eq!(visited, vec![1, 2, 3]);
        assert!(session.is_done());
        // One marker record per page, replayed in page order.
        let markers: Vec<u8> = canvas
            .records
            .iter()
            .filter(|r| r.record_type == 40)
            .map(|r| r.payload[0])
            .collect();
        assert_eq!(markers, vec![1, 2, 3]);
    }

    #[test]
    fn done_is_signalled_only_after_the_last_page() {
        let mut session = PrintSession::new(
            store_with_pages(&[1, 2]),
            PlacementPolicy::Original,
            Orientation::Portrait,
        );
        let mut canvas = CountingCanvas::default();

        assert_eq!(session.advance(&mut canvas), PageAdvance::MorePages);
        assert_eq!(session.advance(&mut canvas), PageAdvance::Done);
        assert_eq!(session.current_page(), 3);
    }

    #[test]
    fn missing_page_stops_without_moving_the_cursor() {
        let mut store = store_with_pages(&[1]);
        store.push(Vec::new());
        store.push(page_with_marker(3));
        let mut session =
            PrintSession::new(store, PlacementPolicy::Original, Orientation::Portrait);
        let mut canvas = CountingCanvas::default();

        assert_eq!(session.advance(&mut canvas), PageAdvance::MorePages);
        assert_eq!(session.advance(&mut canvas), PageAdvance::Done);
        assert_eq!(session.current_page(), 2);
        assert!(!session.is_done());
        assert_eq!(canvas.placements.len(), 1);
    }

    #[test]
    fn undecodable_page_draws_nothing() {
        let mut store = PageStore::new();
        store.push(vec![0xFF; 5]);
        let session =
            PrintSession::new(store, PlacementPolicy::ForceLetter, Orientation::Portrait);
        let mut canvas = CountingCanvas::default();

        assert!(!session.draw_page(1, &mut canvas));
        assert!(canvas.placements.is_empty());
        assert!(canvas.records.is_empty());
    }

    #[test]
    fn draw_carries_the_policy_placement() {
        let session = PrintSession::new(
            store_with_pages(&[7]),
            PlacementPolicy::ForceHalfLetter,
            Orientation::Landscape,
        );
        let mut canvas = CountingCanvas::default();

        assert!(session.draw_page(1, &mut canvas));
        assert_eq!(
            canvas.placements,
            vec![destination_geometry(
                PlacementPolicy::ForceHalfLetter,
                Orientation::Landscape
            )]
        );
    }
}
