#![cfg(feature = "http")]

use std::sync::{Arc, Mutex};

use tiny_http::{Header, Response, Server};

use newsflash::api::{HttpNewsApi, NewsApi, PageCursor, TOP30};
use newsflash::{ArticleId, Error, NewsflashConfig};

/// News API stub serving `total` numbered articles per category.
fn start_api(total: usize) -> (String, Arc<Mutex<Vec<String>>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let url = request.url().to_string();
            log.lock().unwrap().push(url.clone());
            let json = "Content-Type: application/json".parse::<Header>().unwrap();
            let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
            let param = |name: &str| {
                query
                    .split('&')
                    .find_map(|kv| kv.strip_prefix(&format!("{}=", name)))
                    .and_then(|v| v.parse::<usize>().ok())
            };
            let body = match path {
                "/top30" | "/top" | "/v1.1/summary" => {
                    let page = param("page").unwrap_or(1);
                    let per_page = param("per_page").unwrap_or(6);
                    let start = (page - 1) * per_page;
                    let items: Vec<_> = (start..(start + per_page).min(total))
                        .map(|i| serde_json::json!({"article_id": i, "title": format!("Story {}", i)}))
                        .collect();
                    serde_json::to_string(&items).unwrap()
                }
                "/categories" => r#"["sports","business"]"#.to_string(),
                "/similar/7" | "/v2/similar/7" => r#"[{"id":"s-1","title":"Related"}]"#.to_string(),
                _ => {
                    let _ = request.respond(Response::from_string("nope").with_status_code(404));
                    continue;
                }
            };
            let _ = request.respond(Response::from_string(body).with_header(json));
        }
    });
    (format!("http://127.0.0.1:{}", port), seen)
}

fn api(base: String) -> HttpNewsApi {
    HttpNewsApi::new(&NewsflashConfig {
        api_url: base,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn routes_categories_to_endpoints() {
    let (base, seen) = start_api(20);
    let api = api(base);
    assert_eq!(api.fetch_news(TOP30, 1, 5).await.unwrap().len(), 5);
    api.fetch_news("top-news", 2, 5).await.unwrap();
    api.fetch_news("sports", 1, 6).await.unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "/top30?page=1&per_page=5".to_string(),
            "/top?category=top-news&page=2&per_page=5".to_string(),
            "/v1.1/summary?categories=sports&day=2&page=1&per_page=6".to_string(),
        ]
    );
}

#[tokio::test]
async fn similar_and_categories() {
    let (base, _) = start_api(0);
    let api = api(base);
    let id = ArticleId::Number(7);
    assert_eq!(api.similar(&id).await.unwrap()[0].article_id, Some(ArticleId::from("s-1")));
    assert_eq!(api.similar_v2(&id).await.unwrap()[0].title, "Related");
    assert_eq!(api.categories().await.unwrap(), serde_json::json!(["sports", "business"]));
    assert!(matches!(api.similar(&ArticleId::Number(8)).await, Err(Error::Network(_))));
}

#[tokio::test]
async fn cursor_stops_after_short_page() {
    let (base, _) = start_api(14);
    let api = api(base);
    let mut cursor = PageCursor::new("sports", 6);

    let mut total = 0;
    while let Some(items) = cursor.load_next(&api).await.unwrap() {
        total += items.len();
    }
    assert_eq!(total, 14);
    assert_eq!(cursor.next_page(), 4);
    assert!(!cursor.has_more());
    assert!(cursor.load_next(&api).await.unwrap().is_none());

    cursor.reset("business");
    assert_eq!(cursor.load_next(&api).await.unwrap().unwrap().len(), 6);
}

#[tokio::test]
async fn unreachable_api_keeps_cursor_retryable() {
    let api = api("http://127.0.0.1:9".to_string());
    let mut cursor = PageCursor::new("sports", 6);
    assert!(cursor.load_next(&api).await.is_err());
    assert!(!cursor.is_loading());
    assert_eq!(cursor.next_page(), 1);
}
