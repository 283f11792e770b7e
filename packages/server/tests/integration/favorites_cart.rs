use serde_json::json;

use crate::common::{TestApp, routes};

/// Alice authors one recipe; returns `(app, recipe_id, alice_token, bob_token)`.
async fn setup() -> (TestApp, i32, String, String) {
    let app = TestApp::spawn().await;
    let (_, alice) = app.create_user("alice").await;
    let (_, bob) = app.create_user("bob").await;
    let flour = app.ingredient_id("flour", "g").await;
    let id = app.create_recipe(&alice, "Bread", &[(flour, 500)], &[]).await;
    (app, id, alice, bob)
}

mod favorites {
    use super::*;

    #[tokio::test]
    async fn add_returns_the_short_card() {
        let (app, id, _, bob) = setup().await;

        let res = app.post_with_token(&routes::favorite(id), &json!({}), &bob).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.id(), id);
        assert_eq!(res.body["name"], "Bread");
        assert_eq!(res.body["cooking_time"], 15);
        assert!(res.body["image"].as_str().unwrap().starts_with("/media/"));
        assert!(res.body.get("ingredients").is_none());

        let recipe = app.get_with_token(&routes::recipe(id), &bob).await;
        assert_eq!(recipe.body["is_favorited"], true);
    }

    #[tokio::test]
    async fn second_add_is_a_conflict() {
        let (app, id, _, bob) = setup().await;
        app.post_with_token(&routes::favorite(id), &json!({}), &bob).await;

        let res = app.post_with_token(&routes::favorite(id), &json!({}), &bob).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn authors_may_favorite_their_own_recipe() {
        let (app, id, alice, _) = setup().await;

        let res = app.post_with_token(&routes::favorite(id), &json!({}), &alice).await;

        assert_eq!(res.status, 201);
    }

    #[tokio::test]
    async fn remove_then_remove_again() {
        let (app, id, _, bob) = setup().await;
        app.post_with_token(&routes::favorite(id), &json!({}), &bob).await;

        let first = app.delete_with_token(&routes::favorite(id), &bob).await;
        let second = app.delete_with_token(&routes::favorite(id), &bob).await;

        assert_eq!(first.status, 204);
        assert_eq!(second.status, 400);
        assert_eq!(second.body["code"], "NOT_A_MEMBER");
        let recipe = app.get_with_token(&routes::recipe(id), &bob).await;
        assert_eq!(recipe.body["is_favorited"], false);
    }

    #[tokio::test]
    async fn missing_recipe_is_not_found() {
        let (app, _, _, bob) = setup().await;

        let add = app.post_with_token(&routes::favorite(424_242), &json!({}), &bob).await;
        let remove = app.delete_with_token(&routes::favorite(424_242), &bob).await;

        assert_eq!(add.status, 404);
        assert_eq!(remove.status, 404);
    }

    #[tokio::test]
    async fn anonymous_add_is_unauthorized() {
        let (app, id, _, _) = setup().await;

        let res = app.post_without_token(&routes::favorite(id), &json!({})).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn favorites_are_per_user() {
        let (app, id, alice, bob) = setup().await;
        app.post_with_token(&routes::favorite(id), &json!({}), &bob).await;

        let as_alice = app.get_with_token(&routes::recipe(id), &alice).await;

        assert_eq!(as_alice.body["is_favorited"], false);
    }
}

mod shopping_cart {
    use super::*;

    #[tokio::test]
    async fn add_conflict_remove_cycle() {
        let (app, id, _, bob) = setup().await;

        let added = app.post_with_token(&routes::shopping_cart(id), &json!({}), &bob).await;
        assert_eq!(added.status, 201);
        assert_eq!(added.id(), id);

        let again = app.post_with_token(&routes::shopping_cart(id), &json!({}), &bob).await;
        assert_eq!(again.status, 409);

        let recipe = app.get_with_token(&routes::recipe(id), &bob).await;
        assert_eq!(recipe.body["is_in_shopping_cart"], true);

        let removed = app.delete_with_token(&routes::shopping_cart(id), &bob).await;
        assert_eq!(removed.status, 204);

        let not_member = app.delete_with_token(&routes::shopping_cart(id), &bob).await;
        assert_eq!(not_member.status, 400);
        assert_eq!(not_member.body["code"], "NOT_A_MEMBER");
    }

    #[tokio::test]
    async fn cart_and_favorites_are_independent() {
        let (app, id, _, bob) = setup().await;
        app.post_with_token(&routes::shopping_cart(id), &json!({}), &bob).await;

        let res = app.delete_with_token(&routes::favorite(id), &bob).await;

        assert_eq!(res.status, 400);
        let recipe = app.get_with_token(&routes::recipe(id), &bob).await;
        assert_eq!(recipe.body["is_favorited"], false);
        assert_eq!(recipe.body["is_in_shopping_cart"], true);
    }

    #[tokio::test]
    async fn missing_recipe_is_not_found() {
        let (app, _, _, bob) = setup().await;

        let res = app
            .post_with_token(&routes::shopping_cart(424_242), &json!({}), &bob)
            .await;

        assert_eq!(res.status, 404);
    }
}
