use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn subscribe_returns_the_author_card() {
    let app = TestApp::spawn().await;
    let (alice_id, alice) = app.create_user("alice").await;
    let (_, bob) = app.create_user("bob").await;
    let flour = app.ingredient_id("flour", "g").await;
    for name in ["One", "Two", "Three"] {
        app.create_recipe(&alice, name, &[(flour, 1)], &[]).await;
    }

    let res = app
        .post_with_token(
            &format!("{}?recipes_limit=2", routes::subscribe(alice_id)),
            &json!({}),
            &bob,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.id(), alice_id);
    assert_eq!(res.body["username"], "alice");
    assert_eq!(res.body["is_subscribed"], true);
    assert_eq!(res.body["recipes_count"], 3);
    let recipes: Vec<&str> = res.body["recipes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(recipes, ["Three", "Two"]);
}

#[tokio::test]
async fn self_follow_is_rejected() {
    let app = TestApp::spawn().await;
    let (alice_id, alice) = app.create_user("alice").await;

    let res = app
        .post_with_token(&routes::subscribe(alice_id), &json!({}), &alice)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "self-follow");
}

#[tokio::test]
async fn duplicate_subscription_is_a_conflict() {
    let app = TestApp::spawn().await;
    let (alice_id, _) = app.create_user("alice").await;
    let (_, bob) = app.create_user("bob").await;
    app.post_with_token(&routes::subscribe(alice_id), &json!({}), &bob).await;

    let res = app
        .post_with_token(&routes::subscribe(alice_id), &json!({}), &bob)
        .await;

    assert_eq!(res.status, 409);
}

#[tokio::test]
async fn unknown_target_is_not_found() {
    let app = TestApp::spawn().await;
    let (_, bob) = app.create_user("bob").await;

    let add = app
        .post_with_token(&routes::subscribe(424_242), &json!({}), &bob)
        .await;
    let remove = app.delete_with_token(&routes::subscribe(424_242), &bob).await;

    assert_eq!(add.status, 404);
    assert_eq!(remove.status, 404);
}

#[tokio::test]
async fn unsubscribe_then_unsubscribe_again() {
    let app = TestApp::spawn().await;
    let (alice_id, _) = app.create_user("alice").await;
    let (_, bob) = app.create_user("bob").await;
    app.post_with_token(&routes::subscribe(alice_id), &json!({}), &bob).await;

    let first = app.delete_with_token(&routes::subscribe(alice_id), &bob).await;
    let second = app.delete_with_token(&routes::subscribe(alice_id), &bob).await;

    assert_eq!(first.status, 204);
    assert_eq!(second.status, 400);
    assert_eq!(second.body["code"], "NOT_A_MEMBER");
    let profile = app.get_with_token(&routes::user(alice_id), &bob).await;
    assert_eq!(profile.body["is_subscribed"], false);
}

#[tokio::test]
async fn listing_shows_followed_authors_with_limited_recipes() {
    let app = TestApp::spawn().await;
    let (alice_id, alice) = app.create_user("alice").await;
    let (carol_id, carol) = app.create_user("carol").await;
    let (bob_id, bob) = app.create_user("bob").await;
    let (_, dave) = app.create_user("dave").await;
    let flour = app.ingredient_id("flour", "g").await;
    for name in ["A1", "A2", "A3"] {
        app.create_recipe(&alice, name, &[(flour, 1)], &[]).await;
    }
    app.create_recipe(&carol, "C1", &[(flour, 1)], &[]).await;
    app.post_with_token(&routes::subscribe(carol_id), &json!({}), &bob).await;
    app.post_with_token(&routes::subscribe(alice_id), &json!({}), &bob).await;
    // Dave follows Bob; that must not show up in Bob's listing.
    app.post_with_token(&routes::subscribe(bob_id), &json!({}), &dave).await;

    let res = app
        .get_with_token(&format!("{}?recipes_limit=1", routes::SUBSCRIPTIONS), &bob)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let data = res.body["data"].as_array().unwrap();
    let usernames: Vec<&str> = data.iter().map(|u| u["username"].as_str().unwrap()).collect();
    assert_eq!(usernames, ["alice", "carol"]);
    assert_eq!(data[0]["recipes_count"], 3);
    assert_eq!(data[0]["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(data[0]["recipes"][0]["name"], "A3");
    assert_eq!(data[0]["is_subscribed"], true);
    assert_eq!(data[1]["recipes_count"], 1);
    assert_eq!(res.body["pagination"]["total"], 2);
}

#[tokio::test]
async fn listing_requires_a_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::SUBSCRIPTIONS).await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn user_list_marks_followed_users() {
    let app = TestApp::spawn().await;
    let (alice_id, _) = app.create_user("alice").await;
    let (_, bob) = app.create_user("bob").await;
    app.post_with_token(&routes::subscribe(alice_id), &json!({}), &bob).await;

    let res = app.get_with_token(routes::USERS, &bob).await;

    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data[0]["username"], "alice");
    assert_eq!(data[0]["is_subscribed"], true);
    assert_eq!(data[1]["username"], "bob");
    assert_eq!(data[1]["is_subscribed"], false);
}
