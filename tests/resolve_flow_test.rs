use anyhow::Result;
use httpmock::prelude::*;
use salesmap::core::resolver::Notice;
use salesmap::{
    GeminiFactory, InputForm, LocationResolver, MapboxGeocoder, Project, ProjectStore,
    SubmitOutcome,
};

fn resolver(server: &MockServer) -> LocationResolver<MapboxGeocoder, GeminiFactory> {
    LocationResolver::new(
        MapboxGeocoder::new(
            server.url("/geocoding/v5/mapbox.places"),
            "pk.test".to_string(),
            "tw".to_string(),
        ),
        GeminiFactory::new(server.url("/v1beta"), "gemini-1.5-flash-latest".to_string()),
    )
}

fn feature(lon: f64, lat: f64) -> serde_json::Value {
    serde_json::json!({ "features": [{ "center": [lon, lat], "place_name": "match" }] })
}

fn gemini_text(text: &str) -> serde_json::Value {
    serde_json::json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

/// 沒有 AI 金鑰：地址定位後產生 4 筆固定偏移的示意設施
#[tokio::test]
async fn test_xinyi_address_without_ai_credential() -> Result<()> {
    let server = MockServer::start();
    let geocode_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("/geocoding/v5/mapbox.places/")
            .query_param("country", "tw")
            .query_param("limit", "1");
        then.status(200).json_body(feature(121.565, 25.0375));
    });

    let store = ProjectStore::default();
    let mut form = InputForm::from_project(&store.current(), 4);
    form.address = "台北市信義區市府路45號".to_string();
    form.ring_option = "5,10,15".to_string();

    let outcome = form.submit(&resolver(&server), &store).await?;

    geocode_mock.assert_hits(1);
    assert_eq!(outcome, SubmitOutcome::Applied { notices: vec![] });

    let project = store.current();
    assert!((project.center.lon() - 121.565).abs() < 1e-9);
    assert!((project.center.lat() - 25.0375).abs() < 1e-9);
    assert_eq!(project.ring_minutes, vec![5, 10, 15]);
    assert_eq!(project.pois.len(), 4);

    let offsets: Vec<(f64, f64)> = project
        .pois
        .iter()
        .map(|p| {
            (
                p.coord.lon() - project.center.lon(),
                p.coord.lat() - project.center.lat(),
            )
        })
        .collect();
    let expected = [
        (-0.0009, 0.0035),
        (0.0011, -0.0020),
        (-0.0056, 0.0065),
        (-0.0014, -0.0045),
    ];
    for ((dx, dy), (ex, ey)) in offsets.iter().zip(expected) {
        assert!((dx - ex).abs() < 1e-9 && (dy - ey).abs() < 1e-9);
    }
    assert!(project.pois.iter().all(|p| !p.manual));
    Ok(())
}

/// AI 建議的設施逐筆以地理編碼校正，查不到的保留 AI 座標並標記 manual
#[tokio::test]
async fn test_ai_suggestions_are_corrected_by_geocoder() -> Result<()> {
    let server = MockServer::start();

    let forward_mock = server.mock(|when, then| {
        when.method(GET).path_contains("TaipeiCityHall");
        then.status(200).json_body(feature(121.5644, 25.0374));
    });
    let station_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("Station1")
            .query_param("proximity", "121.5644,25.0374");
        then.status(200).json_body(feature(121.5676, 25.0409));
    });
    let mall_mock = server.mock(|when, then| {
        when.method(GET).path_contains("Mall2");
        then.status(200).json_body(serde_json::json!({ "features": [] }));
    });
    let park_mock = server.mock(|when, then| {
        when.method(GET).path_contains("Park3");
        then.status(503).body("upstream unavailable");
    });
    let ai_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-1.5-flash-latest:generateContent")
            .query_param("key", "user-key")
            .body_contains("TaipeiCityHall");
        then.status(200).json_body(gemini_text(
            "```json\n[\
             {\"name\":\"Station1\",\"type\":\"捷運\",\"minutes\":3,\"address\":\"Xinyi\",\"lat\":25.0411,\"lng\":121.5651},\
             {\"name\":\"Mall2\",\"type\":\"商圈\",\"minutes\":5,\"address\":\"Xinyi\",\"lat\":25.0360,\"lng\":121.5670},\
             {\"name\":\"Park3\",\"type\":\"公園\",\"minutes\":8,\"address\":\"Xinyi\",\"lat\":25.0300,\"lng\":121.5700}\
             ]\n```",
        ));
    });

    let store = ProjectStore::default();
    let mut form = InputForm::from_project(&store.current(), 3);
    form.address = "TaipeiCityHall".to_string();
    form.ai_credential = Some("user-key".to_string());

    let outcome = form.submit(&resolver(&server), &store).await?;

    forward_mock.assert_hits(1);
    ai_mock.assert_hits(1);
    station_mock.assert_hits(1);
    mall_mock.assert_hits(1);
    park_mock.assert_hits(1);
    assert_eq!(outcome, SubmitOutcome::Applied { notices: vec![] });

    let pois = store.current().pois;
    assert_eq!(pois.len(), 3);

    assert_eq!(pois[0].name, "Station1");
    assert!(!pois[0].manual);
    assert!((pois[0].coord.lon() - 121.5676).abs() < 1e-9);

    assert!(pois[1].manual);
    assert!((pois[1].coord.lat() - 25.0360).abs() < 1e-9);

    assert!(pois[2].manual);
    assert!((pois[2].coord.lon() - 121.5700).abs() < 1e-9);
    Ok(())
}

/// AI 呼叫失敗：顯示錯誤原文並改用示意設施
#[tokio::test]
async fn test_ai_failure_falls_back_to_mock_pois() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("mapbox.places");
        then.status(200).json_body(feature(121.5, 25.0));
    });
    let ai_mock = server.mock(|when, then| {
        when.method(POST).path_contains(":generateContent");
        then.status(403).json_body(serde_json::json!({
            "error": { "code": 403, "message": "Method doesn't allow unregistered callers." }
        }));
    });

    let store = ProjectStore::default();
    let mut form = InputForm::from_project(&store.current(), 6);
    form.address = "Somewhere".to_string();
    form.ai_credential = Some("revoked".to_string());

    let outcome = form.submit(&resolver(&server), &store).await?;

    ai_mock.assert_hits(1);
    match outcome {
        SubmitOutcome::Applied { notices } => {
            assert_eq!(notices.len(), 1);
            match &notices[0] {
                Notice::AiGenerationError { message } => {
                    assert!(message.contains("unregistered callers"))
                }
                other => panic!("unexpected notice: {:?}", other),
            }
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let project = store.current();
    assert_eq!(project.pois.len(), 6);
    assert_eq!(project.pois[4].kind, project.pois[0].kind);
    assert_eq!(project.pois[5].kind, project.pois[1].kind);
    Ok(())
}

/// AI 回傳空陣列：視同生成失敗，補上示意設施
#[tokio::test]
async fn test_empty_ai_list_falls_back_to_mock_pois() -> Result<()> {
    let server = MockServer::start();
    let geocode_mock = server.mock(|when, then| {
        when.method(GET).path_contains("mapbox.places");
        then.status(200).json_body(feature(121.5644, 25.0374));
    });
    let ai_mock = server.mock(|when, then| {
        when.method(POST).path_contains(":generateContent");
        then.status(200).json_body(gemini_text("```json\n[]\n```"));
    });

    let store = ProjectStore::default();
    let mut form = InputForm::from_project(&store.current(), 4);
    form.address = "TaipeiCityHall".to_string();
    form.ai_credential = Some("user-key".to_string());

    let outcome = form.submit(&resolver(&server), &store).await?;

    ai_mock.assert_hits(1);
    // 只有地址定位，沒有任何校正查詢
    geocode_mock.assert_hits(1);
    match outcome {
        SubmitOutcome::Applied { notices } => {
            assert!(matches!(notices.as_slice(), [Notice::AiGenerationError { .. }]));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let project = store.current();
    assert_eq!(project.pois.len(), 4);
    assert!(project.pois.iter().all(|p| !p.manual));
    Ok(())
}

/// 查無地址：中心點與設施完全不變
#[tokio::test]
async fn test_address_not_found_leaves_project_untouched() -> Result<()> {
    let server = MockServer::start();
    let geocode_mock = server.mock(|when, then| {
        when.method(GET).path_contains("mapbox.places");
        then.status(200).json_body(serde_json::json!({ "features": [] }));
    });

    let store = ProjectStore::default();
    let before = store.current();
    let mut form = InputForm::from_project(&before, 4);
    form.address = "Nowhere".to_string();
    form.name = "Renamed".to_string();
    form.ai_credential = Some("key".to_string());

    let outcome = form.submit(&resolver(&server), &store).await?;

    geocode_mock.assert_hits(1);
    assert_eq!(
        outcome,
        SubmitOutcome::Unchanged {
            notices: vec![Notice::AddressNotFound {
                address: "Nowhere".to_string()
            }]
        }
    );
    assert_eq!(store.current(), before);
    assert_eq!(
        serde_json::to_string(&store.current())?,
        serde_json::to_string(&Project::default())?
    );
    Ok(())
}
