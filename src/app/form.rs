use crate::core::resolver::{LocationResolver, Notice, ResolveRequest, Resolution};
use crate::core::rings::format_ring_minutes;
use crate::core::store::ProjectStore;
use crate::domain::model::{Project, TravelMode};
use crate::domain::ports::{Geocoder, SuggesterFactory};
use crate::utils::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 已有一次送出正在處理
    Busy,
    Applied { notices: Vec<Notice> },
    Unchanged { notices: Vec<Notice> },
    /// 處理期間有更新的送出，這次結果被丟棄
    Superseded { notices: Vec<Notice> },
}

/// 表單欄位的編輯暫存；送出時交給 resolver，結果寫回 store
#[derive(Debug)]
pub struct InputForm {
    pub name: String,
    pub address: String,
    pub ring_option: String,
    /// 會收集但目前不影響車程圈或設施
    pub travel_mode: TravelMode,
    pub poi_count: usize,
    pub ai_credential: Option<String>,
    submitting: AtomicBool,
}

struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl InputForm {
    pub fn from_project(project: &Project, poi_count: usize) -> Self {
        Self {
            name: project.name.clone(),
            address: project.address.clone(),
            ring_option: format_ring_minutes(&project.ring_minutes),
            travel_mode: TravelMode::default(),
            poi_count,
            ai_credential: None,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn to_request(&self) -> ResolveRequest {
        ResolveRequest {
            name: self.name.clone(),
            address: self.address.clone(),
            ring_option: self.ring_option.clone(),
            travel_mode: self.travel_mode,
            ai_credential: self.ai_credential.clone(),
            poi_count: self.poi_count,
        }
    }

    pub async fn submit<G, F>(
        &self,
        resolver: &LocationResolver<G, F>,
        store: &ProjectStore,
    ) -> Result<SubmitOutcome>
    where
        G: Geocoder,
        F: SuggesterFactory,
    {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Submit ignored, a resolution is already in flight");
            return Ok(SubmitOutcome::Busy);
        }
        let _guard = SubmittingGuard(&self.submitting);

        let ticket = store.begin_request();
        let prior = store.current();
        tracing::info!("⚡ Generating sales map for '{}'", self.name);

        match resolver.resolve(&prior, &self.to_request()).await? {
            Resolution::Updated { project, notices } => {
                if store.commit(ticket, project) {
                    Ok(SubmitOutcome::Applied { notices })
                } else {
                    Ok(SubmitOutcome::Superseded { notices })
                }
            }
            Resolution::Unchanged { notices } => Ok(SubmitOutcome::Unchanged { notices }),
        }
    }
}
