use crate::core::mock_pois::generate_mock_pois;
use crate::core::rings::parse_ring_minutes;
use crate::domain::model::{Coord, Poi, PoiSuggestion, Project, TravelMode};
use crate::domain::ports::{Geocoder, SuggesterFactory};
use crate::utils::error::Result;
use futures::future::join_all;
use std::fmt;

/// 表單一次送出的內容
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRequest {
    pub name: String,
    pub address: String,
    pub ring_option: String,
    pub travel_mode: TravelMode,
    pub ai_credential: Option<String>,
    pub poi_count: usize,
}

/// 需要讓使用者看到的訊息；逐筆座標校正失敗不會出現在這裡
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    AddressNotFound { address: String },
    GeocodingFailed { message: String },
    AiGenerationError { message: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressNotFound { address } => write!(f, "找不到地址：{}", address),
            Self::GeocodingFailed { message } => write!(f, "地址查詢失敗：{}", message),
            Self::AiGenerationError { message } => write!(f, "AI 生成錯誤：{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Updated {
        project: Project,
        notices: Vec<Notice>,
    },
    /// 原本的專案維持不變
    Unchanged { notices: Vec<Notice> },
}

impl Resolution {
    pub fn notices(&self) -> &[Notice] {
        match self {
            Self::Updated { notices, .. } | Self::Unchanged { notices } => notices,
        }
    }

    pub fn project(&self) -> Option<&Project> {
        match self {
            Self::Updated { project, .. } => Some(project),
            Self::Unchanged { .. } => None,
        }
    }
}

/// 地址 → 中心座標 → 設施建議 → 逐筆校正
pub struct LocationResolver<G: Geocoder, F: SuggesterFactory> {
    geocoder: G,
    suggesters: F,
}

impl<G: Geocoder, F: SuggesterFactory> LocationResolver<G, F> {
    pub fn new(geocoder: G, suggesters: F) -> Self {
        Self {
            geocoder,
            suggesters,
        }
    }

    pub async fn resolve(&self, prior: &Project, request: &ResolveRequest) -> Result<Resolution> {
        let address = request.address.trim();
        let ring_minutes = parse_ring_minutes(&request.ring_option);
        let mut notices = Vec::new();

        tracing::debug!(
            "Travel mode '{}' is collected but does not affect rings or POIs",
            request.travel_mode.label()
        );

        if address.is_empty() {
            tracing::info!("📍 Empty address, keeping previous center and POIs");
            return Ok(Resolution::Updated {
                project: Project {
                    name: request.name.clone(),
                    address: request.address.clone(),
                    center: prior.center,
                    ring_minutes,
                    pois: prior.pois.clone(),
                },
                notices,
            });
        }

        tracing::info!("🔎 Geocoding address: {}", address);
        let center = match self.geocoder.forward(address).await {
            Ok(Some(center)) => center,
            Ok(None) => {
                tracing::warn!("❌ Address not found: {}", address);
                notices.push(Notice::AddressNotFound {
                    address: address.to_string(),
                });
                return Ok(Resolution::Unchanged { notices });
            }
            Err(e) => {
                tracing::error!("❌ Geocoding failed: {}", e);
                notices.push(Notice::GeocodingFailed {
                    message: e.to_string(),
                });
                return Ok(Resolution::Unchanged { notices });
            }
        };
        tracing::info!("📍 Resolved center: {}", center);

        let mut pois = None;
        if let Some(credential) = request
            .ai_credential
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            let suggester = self.suggesters.with_credential(credential);
            match suggester.suggest(address, center, request.poi_count).await {
                Ok(suggestions) if suggestions.is_empty() => {
                    tracing::warn!("⚠️ AI returned no POIs, falling back to mock POIs");
                    notices.push(Notice::AiGenerationError {
                        message: "AI returned no POIs".to_string(),
                    });
                }
                Ok(suggestions) => {
                    tracing::info!("🤖 AI suggested {} POIs", suggestions.len());
                    pois = Some(self.correct_all(suggestions, address, center).await);
                }
                Err(e) => {
                    tracing::warn!("⚠️ AI generation failed, falling back to mock POIs: {}", e);
                    notices.push(Notice::AiGenerationError {
                        message: e.to_string(),
                    });
                }
            }
        }

        let pois = match pois {
            Some(pois) => pois,
            None => generate_mock_pois(center, request.poi_count),
        };

        Ok(Resolution::Updated {
            project: Project {
                name: request.name.clone(),
                address: request.address.clone(),
                center,
                ring_minutes,
                pois,
            },
            notices,
        })
    }

    /// 全部同時送出，等最慢的一筆完成
    async fn correct_all(
        &self,
        suggestions: Vec<PoiSuggestion>,
        project_address: &str,
        center: Coord,
    ) -> Vec<Poi> {
        let corrections = suggestions
            .into_iter()
            .map(|suggestion| self.correct(suggestion, project_address, center));
        let pois = join_all(corrections).await;

        let manual = pois.iter().filter(|p| p.manual).count();
        tracing::info!(
            "🧭 Corrected {} of {} POIs via geocoder",
            pois.len() - manual,
            pois.len()
        );
        pois
    }

    async fn correct(
        &self,
        suggestion: PoiSuggestion,
        project_address: &str,
        center: Coord,
    ) -> Poi {
        let query = format!(
            "{} {}",
            suggestion.name,
            suggestion.address.as_deref().unwrap_or(project_address)
        );

        let (coord, manual) = match self.geocoder.search_near(&query, center).await {
            Ok(Some(coord)) => (coord, false),
            Ok(None) => {
                tracing::debug!("No geocoder match for '{}', keeping AI coordinate", query);
                (suggestion.coord, true)
            }
            Err(e) => {
                tracing::debug!("Correction lookup for '{}' failed: {}", query, e);
                (suggestion.coord, true)
            }
        };

        Poi {
            name: suggestion.name,
            kind: suggestion.kind,
            minutes: suggestion.minutes,
            coord,
            manual,
        }
    }
}
