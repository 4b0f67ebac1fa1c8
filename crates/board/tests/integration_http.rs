//! Integration-Tests fuer die HTTP-Board-API (Mock-Server)

use podium_board::{BoardApi, BoardError, BoardSource, HttpBoardApi, HttpBoardConfig, TrelloBoard};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> HttpBoardApi {
    HttpBoardApi::neu(HttpBoardConfig {
        api_base: server.uri(),
        key: "schluessel".into(),
        token: "geheim".into(),
        ..Default::default()
    })
    .expect("HTTP-Client muss gebaut werden")
}

fn board_json() -> serde_json::Value {
    json!({
        "id": "b1",
        "lists": [{"id": "l1", "name": "Vortrag"}],
        "cards": [
            {"id": "c1", "idList": "l1", "name": "Start", "labels": [{"id": "la", "name": "active"}]},
            {"id": "c2", "idList": "l1", "name": "Ende"}
        ],
        "labels": [{"id": "la", "name": "active"}]
    })
}

#[tokio::test]
async fn board_laden_ueber_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/b/board.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(board_json()))
        .expect(1)
        .mount(&server)
        .await;

    let quelle = TrelloBoard::neu(api(&server));
    let p = quelle
        .load(&format!("{}/b/board.json", server.uri()))
        .await
        .unwrap();

    assert_eq!(p.slide_sets.len(), 1);
    assert_eq!(p.slide_sets[0].slides.len(), 2);
    assert_eq!(p.active_slide_id.as_deref(), Some("c1"));
}

#[tokio::test]
async fn http_fehler_wird_gemeldet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("board not found"))
        .mount(&server)
        .await;

    let fehler = api(&server)
        .fetch_board(&format!("{}/b/fehlt.json", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(fehler, BoardError::Status { status: 404, ref text } if text == "board not found"));
}

#[tokio::test]
async fn kaputtes_json_wird_gemeldet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let fehler = api(&server).fetch_board(&server.uri()).await.unwrap_err();
    assert!(matches!(fehler, BoardError::Serialisierung(_)));
}

#[tokio::test]
async fn ungueltige_url_ohne_anfrage() {
    let server = MockServer::start().await;
    let fehler = api(&server).fetch_board("board.json").await.unwrap_err();
    assert!(matches!(fehler, BoardError::UngueltigeUrl(_)));
}

#[tokio::test]
async fn label_aufrufe_mit_zugangsdaten() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/cards/c2/idLabels"))
        .and(query_param("value", "la"))
        .and(query_param("key", "schluessel"))
        .and(query_param("token", "geheim"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["la"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/1/cards/c1/idLabels/la"))
        .and(query_param("key", "schluessel"))
        .and(query_param("token", "geheim"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = api(&server);
    client.add_label("c2", "la").await.unwrap();
    client.remove_label("c1", "la").await.unwrap();
}

#[tokio::test]
async fn persist_ueberlebt_serverfehler() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/board.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(board_json()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let quelle = TrelloBoard::neu(api(&server));
    quelle
        .load(&format!("{}/board.json", server.uri()))
        .await
        .unwrap();

    assert!(quelle.persist_active_slide(Some("c2")).await.is_ok());
}
