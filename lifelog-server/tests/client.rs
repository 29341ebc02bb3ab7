//! Drives the library client and views against a real listener.

use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use lifelog_lib::{
    Repository,
    client::{Client, Error},
    repository::TimeBlockWrite,
    timebox::Slot,
    views::{Field, ProfileView, TimeBoxView},
};
use lifelog_server::{config::Config, router, state::AppState};
use tokio::net::TcpListener;
use uuid::Uuid;

async fn serve() -> (String, std::sync::Arc<AppState>) {
    let state = AppState::new(Repository::in_memory().unwrap(), Config::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{address}"), state)
}

async fn client_for(user: Uuid) -> Client {
    let (url, state) = serve().await;
    let token = state.sessions.issue(user, TimeDelta::hours(1)).unwrap().token;

    Client::new(url).with_session(token)
}

#[tokio::test]
async fn test_client_round_trip() {
    let client = client_for(Uuid::new_v4()).await;
    let nine = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

    let created = client
        .create_time_block(&TimeBlockWrite {
            time_block: nine,
            description: Some("Deep Work".into()),
        })
        .await
        .unwrap();
    assert_eq!(created.time_block, nine);

    let blocks = client
        .fetch_time_blocks(NaiveDate::from_ymd_opt(2024, 1, 1))
        .await
        .unwrap();
    assert_eq!(blocks, vec![created.clone()]);

    client.delete_time_block(created.id).await.unwrap();
    assert!(client.fetch_time_blocks(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_client_surfaces_server_errors() {
    let (url, _) = serve().await;
    let anonymous = Client::new(url);

    let err = anonymous.fetch_profile().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.to_string(), "Unauthorized");
    assert!(matches!(err, Error::Api { .. }));
}

#[tokio::test]
async fn test_timebox_view_over_http() {
    let client = client_for(Uuid::new_v4()).await;
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let slot: Slot = "09:00".parse().unwrap();

    let mut view = TimeBoxView::new(client.clone(), day);
    view.load().await.unwrap();
    assert!(view.rows().iter().all(|r| r.block.is_none()));

    view.select(slot);
    view.set_buffer("Deep Work");
    assert!(view.save().await.unwrap());

    // A fresh view sees what the first one saved
    let mut reloaded = TimeBoxView::new(client, day);
    reloaded.load().await.unwrap();
    assert_eq!(reloaded.row(slot).unwrap().description(), Some("Deep Work"));

    reloaded.delete(slot).await.unwrap();
    reloaded.load().await.unwrap();
    assert!(reloaded.row(slot).unwrap().block.is_none());
}

#[tokio::test]
async fn test_profile_view_over_http() {
    let user = Uuid::new_v4();
    let client = client_for(user).await;

    let mut view = ProfileView::new(client.clone());
    view.load().await.unwrap();
    assert_eq!(view.profile().unwrap().id, user);

    view.input(Field::FirstName, "Grace");
    view.input(Field::LastName, "Hopper");
    view.input(Field::Gender, "F");
    assert!(view.submit().await.unwrap());

    let fetched = client.fetch_profile().await.unwrap();
    assert_eq!(fetched.first_name, "Grace");
    assert_eq!(Some(&fetched), view.profile());
}
