use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use torrent::{
    AddTorrentForm, ContentLayout, Credentials, QBittorrentSession, QBittorrentWebApiError, Url,
};

#[derive(Clone, Default)]
struct Stub {
    login_body: &'static str,
    add_status: u16,
    logins: Arc<Mutex<Vec<HashMap<String, String>>>>,
    adds: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn login(
    State(stub): State<Stub>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    stub.logins.lock().unwrap().push(form);
    (
        [(header::SET_COOKIE, "SID=stub-session; path=/")],
        stub.login_body,
    )
}

async fn add(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> StatusCode {
    let has_session = headers
        .get(header::COOKIE)
        .and_then(|cookie| cookie.to_str().ok())
        .is_some_and(|cookie| cookie.contains("SID=stub-session"));
    if !has_session {
        return StatusCode::FORBIDDEN;
    }

    stub.adds.lock().unwrap().push(form);
    StatusCode::from_u16(stub.add_status).unwrap()
}

async fn spawn_stub(stub: Stub) -> Url {
    let app = Router::new()
        .route("/api/v2/auth/login", post(login))
        .route("/api/v2/torrents/add", post(add))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    Url::parse(&format!("http://{address}")).unwrap()
}

fn credentials() -> Credentials {
    Credentials {
        username: "admin".into(),
        password: "adminadmin".into(),
    }
}

#[tokio::test]
async fn test_login_then_add() {
    let stub = Stub {
        login_body: "Ok.",
        add_status: 200,
        ..Default::default()
    };
    let url = spawn_stub(stub.clone()).await;

    let session = QBittorrentSession::try_new(&url).unwrap();
    session.login(&credentials()).await.unwrap();
    session
        .add_torrent(
            &AddTorrentForm::new("magnet:?xt=urn:btih:abc", "/media/Series/Show/Season01")
                .with_content_layout(ContentLayout::NoSubfolder),
        )
        .await
        .unwrap();

    let logins = stub.logins.lock().unwrap();
    assert_eq!(logins[0]["username"], "admin");
    assert_eq!(logins[0]["password"], "adminadmin");

    let adds = stub.adds.lock().unwrap();
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0]["urls"], "magnet:?xt=urn:btih:abc");
    assert_eq!(adds[0]["savepath"], "/media/Series/Show/Season01");
    assert_eq!(adds[0]["autoTMM"], "false");
    assert_eq!(adds[0]["contentLayout"], "NoSubfolder");
}

#[tokio::test]
async fn test_add_without_layout() {
    let stub = Stub {
        login_body: "Ok.",
        add_status: 200,
        ..Default::default()
    };
    let url = spawn_stub(stub.clone()).await;

    let session = QBittorrentSession::try_new(&url).unwrap();
    session.login(&credentials()).await.unwrap();
    session
        .add_torrent(&AddTorrentForm::new("magnet:?xt=urn:btih:abc", "/downloads"))
        .await
        .unwrap();

    assert!(!stub.adds.lock().unwrap()[0].contains_key("contentLayout"));
}

#[tokio::test]
async fn test_login_rejected() {
    let stub = Stub {
        login_body: "Fails.",
        add_status: 200,
        ..Default::default()
    };
    let url = spawn_stub(stub).await;

    let session = QBittorrentSession::try_new(&url).unwrap();

    assert!(matches!(
        session.login(&credentials()).await,
        Err(QBittorrentWebApiError::LoginRejected(_))
    ));
}

#[tokio::test]
async fn test_add_failure_carries_status() {
    let stub = Stub {
        login_body: "Ok.",
        add_status: 415,
        ..Default::default()
    };
    let url = spawn_stub(stub).await;

    let session = QBittorrentSession::try_new(&url).unwrap();
    session.login(&credentials()).await.unwrap();

    match session
        .add_torrent(&AddTorrentForm::new("magnet:?xt=urn:btih:abc", "/downloads"))
        .await
    {
        Err(QBittorrentWebApiError::CantAddTorrent { status }) => assert_eq!(status.as_u16(), 415),
        other => panic!("Expected CantAddTorrent, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let session =
        QBittorrentSession::try_new(&Url::parse(&format!("http://{address}")).unwrap()).unwrap();

    assert!(matches!(
        session.login(&credentials()).await,
        Err(QBittorrentWebApiError::CouldntCallApi(_))
    ));
}
