use crate::datasource::DataSource;
use crate::error::{AtlasError, Result};
use crate::layer::Ticket;
use crate::query::QueryParams;
use crate::region::RegionLevel;
use crate::theme::Theme;
use geojson::FeatureCollection;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Clone, Debug)]
pub enum FetchKind {
    Features { theme: Theme, params: QueryParams },
    Boundaries(RegionLevel),
}

#[derive(Clone, Debug)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub kind: FetchKind,
}

pub struct FetchResponse {
    pub ticket: Ticket,
    pub result: Result<FeatureCollection>,
}

/// Background worker answering fetch requests in arrival order.
pub struct Fetcher {
    req_tx: mpsc::Sender<FetchRequest>,
    res_rx: mpsc::Receiver<FetchResponse>,
}

impl Fetcher {
    pub fn spawn(source: Arc<dyn DataSource>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<FetchRequest>();
        let (res_tx, res_rx) = mpsc::channel::<FetchResponse>();
        thread::spawn(move || {
            while let Ok(req) = req_rx.recv() {
                let result = match &req.kind {
                    FetchKind::Features { theme, params } => source.features(*theme, params),
                    FetchKind::Boundaries(level) => source.boundaries(*level),
                };
                if let Err(e) = &result {
                    log::warn!("fetch {} failed: {}", req.ticket.name, e);
                }
                if res_tx.send(FetchResponse { ticket: req.ticket, result }).is_err() {
                    break;
                }
            }
            log::debug!("fetch worker exiting");
        });
        Self { req_tx, res_rx }
    }

    pub fn request(&self, req: FetchRequest) -> Result<()> {
        log::debug!("fetch {} requested", req.ticket.name);
        self.req_tx.send(req).map_err(|_| AtlasError::WorkerGone)
    }

    /// Responses ready now, without blocking.
    pub fn drain(&self) -> Vec<FetchResponse> {
        self.res_rx.try_iter().collect()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FetchResponse> {
        self.res_rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerManager;
    use std::sync::Mutex;

    struct Canned {
        seen: Mutex<Vec<String>>,
    }

    impl DataSource for Canned {
        fn features(&self, theme: Theme, params: &QueryParams) -> Result<FeatureCollection> {
            self.seen.lock().unwrap().push(format!("{theme}?{}", params.to_query_string()));
            Ok(FeatureCollection { bbox: None, features: Vec::new(), foreign_members: None })
        }

        fn boundaries(&self, level: RegionLevel) -> Result<FeatureCollection> {
            Err(AtlasError::Config(format!("no outlines for {level}")))
        }
    }

    #[test]
    fn answers_in_order_with_tickets() {
        let source = Arc::new(Canned { seen: Mutex::new(Vec::new()) });
        let fetcher = Fetcher::spawn(source.clone());
        let mut mgr = LayerManager::new();
        let first = mgr.begin("a");
        let second = mgr.begin("b");
        for ticket in [first.clone(), second.clone()] {
            let kind = FetchKind::Features { theme: Theme::Disaster, params: QueryParams::default() };
            fetcher.request(FetchRequest { ticket, kind }).unwrap();
        }
        let a = fetcher.recv_timeout(Duration::from_secs(5)).unwrap();
        let b = fetcher.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(a.ticket, first);
        assert_eq!(b.ticket, second);
        assert_eq!(source.seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn source_errors_come_back_as_results() {
        let fetcher = Fetcher::spawn(Arc::new(Canned { seen: Mutex::new(Vec::new()) }));
        let ticket = LayerManager::new().begin("outline");
        fetcher
            .request(FetchRequest { ticket, kind: FetchKind::Boundaries(RegionLevel::Town) })
            .unwrap();
        let res = fetcher.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(res.result.is_err());
    }
}
