#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use sched2cal_core::{HttpConfig, HuflitConfig, PortalError};
use sched2cal_schools::{Credentials, HuflitPortal, SchoolPortal, SemesterSelection};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCHEDULES_PAGE: &str = include_str!("fixtures/huflit_schedules_page.html");
const SCHEDULE: &str = include_str!("fixtures/huflit_schedule.html");
const SCHEDULE_EMPTY: &str = include_str!("fixtures/huflit_schedule_empty.html");

const LOGIN_PAGE: &str = "<html><body><form id=\"login\"></form></body></html>";

fn portal(server: &MockServer, username: &str) -> HuflitPortal {
    portal_at(&server.uri(), username)
}

fn portal_at(base_url: &str, username: &str) -> HuflitPortal {
    let config = HuflitConfig {
        base_url: base_url.to_string(),
    };
    HuflitPortal::new(
        &config,
        &HttpConfig::default(),
        Credentials::new(username, "secret"),
    )
    .unwrap()
}

fn redirect_to(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("Location", location)
}

/// Login page, a login POST that redirects home, and a home page that
/// answers once before bouncing back to the login page.
async fn mount_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/Login"))
        .and(body_string_contains("txtTaiKhoan=22DH110001"))
        .and(body_string_contains("txtMatKhau=secret"))
        .respond_with(redirect_to("/Home"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Home"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Home</html>"))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Home"))
        .respond_with(redirect_to("/Login"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Home/Schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULES_PAGE))
        .mount(server)
        .await;
}

async fn logged_in(server: &MockServer) -> HuflitPortal {
    mount_session(server).await;
    let mut portal = portal(server, "22DH110001");
    portal.login().await.unwrap();
    portal
}

#[tokio::test]
async fn test_login_follows_redirect() {
    let server = MockServer::start().await;
    let portal = logged_in(&server).await;
    assert!(portal.is_logged_in());
}

#[tokio::test]
async fn test_login_without_redirect_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(&server)
        .await;

    let mut portal = portal(&server, "22DH110001");

    assert!(matches!(
        portal.login().await,
        Err(PortalError::AuthenticationFailed(_))
    ));
    assert!(!portal.is_logged_in());
}

#[tokio::test]
async fn test_login_under_path_prefix_without_redirect_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/Login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let mut portal = portal_at(&format!("{}/portal", server.uri()), "22DH110001");

    assert!(matches!(
        portal.login().await,
        Err(PortalError::AuthenticationFailed(_))
    ));
    assert!(!portal.is_logged_in());
}

#[tokio::test]
async fn test_login_under_path_prefix_follows_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/portal/Login"))
        .respond_with(redirect_to("/portal/Home"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/portal/Home"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Home</html>"))
        .mount(&server)
        .await;

    let mut portal = portal_at(&format!("{}/portal", server.uri()), "22DH110001");

    portal.login().await.unwrap();
    assert!(portal.is_logged_in());
}

#[tokio::test]
async fn test_blank_username() {
    let server = MockServer::start().await;
    let mut portal = portal(&server, "");

    assert!(matches!(
        portal.login().await,
        Err(PortalError::BlankUsername)
    ));
}

#[tokio::test]
async fn test_semesters_and_years() {
    let server = MockServer::start().await;
    let portal = logged_in(&server).await;

    let options = portal.semesters().await.unwrap();

    assert_eq!(options.semesters, vec!["HK01", "HK02", "HK03"]);
    assert_eq!(
        options.years,
        Some(vec!["2023-2024".to_string(), "2022-2023".to_string()])
    );
}

#[tokio::test]
async fn test_fetch_schedule() {
    let server = MockServer::start().await;
    let portal = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/Home/DrawingStudentSchedule_Perior"))
        .and(query_param("YearStudy", "2023-2024"))
        .and(query_param("TermID", "HK01"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULE))
        .expect(1)
        .mount(&server)
        .await;

    let entries = portal
        .fetch(&SemesterSelection::new("HK01", Some("2023-2024".to_string())))
        .await
        .unwrap()
        .expect("schedule should be published");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].code.as_deref(), Some("AI1001"));
    assert_eq!(entries[0].from_date.to_string(), "2023-09-04 06:45:00");
    assert_eq!(entries[0].to_date.to_string(), "2023-12-18 08:25:00");
    assert_eq!(entries[1].name, "Tiếng Anh 3");
    assert_eq!(entries[1].lecturer, None);
}

#[tokio::test]
async fn test_fetch_defaults_to_first_options() {
    let server = MockServer::start().await;
    let portal = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/Home/DrawingStudentSchedule_Perior"))
        .and(query_param("YearStudy", "2023-2024"))
        .and(query_param("TermID", "HK01"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULE))
        .expect(1)
        .mount(&server)
        .await;

    let entries = portal
        .fetch(&SemesterSelection::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_fetch_no_schedule() {
    let server = MockServer::start().await;
    let portal = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/Home/DrawingStudentSchedule_Perior"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULE_EMPTY))
        .mount(&server)
        .await;

    let result = portal
        .fetch(&SemesterSelection::new("HK03", Some("2023-2024".to_string())))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_fetch_rejects_unknown_year() {
    let server = MockServer::start().await;
    let portal = logged_in(&server).await;

    let result = portal
        .fetch(&SemesterSelection::new("HK01", Some("1999-2000".to_string())))
        .await;

    match result {
        Err(PortalError::InvalidSelection { field, valid, .. }) => {
            assert_eq!(field, "year");
            assert_eq!(valid, vec!["2023-2024", "2022-2023"]);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_logout_requires_redirect_from_home() {
    let server = MockServer::start().await;
    let mut portal = logged_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/Login/Logout"))
        .respond_with(redirect_to("/Login"))
        .expect(1)
        .mount(&server)
        .await;

    portal.logout().await.unwrap();
    assert!(!portal.is_logged_in());
}
