use crate::domain::model::{Coord, PoiSuggestion};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 地理編碼服務。查無結果回傳 `Ok(None)`，只有傳輸或格式問題才是 `Err`
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// 文字地址轉座標，取第一筆
    async fn forward(&self, address: &str) -> Result<Option<Coord>>;

    /// 以 `proximity` 為偏好中心搜尋名稱或地址
    async fn search_near(&self, query: &str, proximity: Coord) -> Result<Option<Coord>>;
}

/// 生成式 AI 設施建議
#[async_trait]
pub trait PoiSuggester: Send + Sync {
    async fn suggest(
        &self,
        address: &str,
        center: Coord,
        count: usize,
    ) -> Result<Vec<PoiSuggestion>>;
}

/// AI 金鑰由使用者在表單輸入，每次送出才建立對應的 client
pub trait SuggesterFactory: Send + Sync {
    fn with_credential(&self, credential: &str) -> Box<dyn PoiSuggester>;
}
