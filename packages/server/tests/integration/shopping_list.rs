use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn text_list_sums_amounts_per_ingredient_and_unit() {
    let app = TestApp::spawn_with_text_shopping_list().await;
    let (_, alice) = app.create_user("alice").await;
    let flour = app.ingredient_id("flour", "g").await;
    let sugar = app.ingredient_id("sugar", "g").await;
    let milk_ml = app.ingredient_id("milk", "ml").await;
    let milk_cup = app.ingredient_id("milk", "cup").await;
    let bread = app
        .create_recipe(&alice, "Bread", &[(flour, 100), (milk_ml, 200)], &[])
        .await;
    let cake = app
        .create_recipe(&alice, "Cake", &[(flour, 50), (sugar, 20), (milk_cup, 1)], &[])
        .await;
    app.post_with_token(&routes::shopping_cart(bread), &json!({}), &alice).await;
    app.post_with_token(&routes::shopping_cart(cake), &json!({}), &alice).await;

    let res = app.get_raw(routes::DOWNLOAD_SHOPPING_CART, Some(&alice)).await;

    assert_eq!(res.status, 200);
    assert!(res.content_type.starts_with("text/plain"));
    assert_eq!(
        res.content_disposition,
        "attachment; filename=\"shopping_list.txt\""
    );
    let text = String::from_utf8(res.bytes).unwrap();
    let lines: Vec<&str> = text.lines().skip(2).collect();
    assert_eq!(
        lines,
        ["flour (g) - 150", "milk (cup) - 1", "milk (ml) - 200", "sugar (g) - 20"]
    );
}

#[tokio::test]
async fn only_the_callers_cart_counts() {
    let app = TestApp::spawn_with_text_shopping_list().await;
    let (_, alice) = app.create_user("alice").await;
    let (_, bob) = app.create_user("bob").await;
    let flour = app.ingredient_id("flour", "g").await;
    let egg = app.ingredient_id("egg", "pcs").await;
    let bread = app.create_recipe(&alice, "Bread", &[(flour, 100)], &[]).await;
    let omelette = app.create_recipe(&alice, "Omelette", &[(egg, 3)], &[]).await;
    app.post_with_token(&routes::shopping_cart(bread), &json!({}), &alice).await;
    app.post_with_token(&routes::shopping_cart(omelette), &json!({}), &bob).await;

    let res = app.get_raw(routes::DOWNLOAD_SHOPPING_CART, Some(&bob)).await;

    let text = String::from_utf8(res.bytes).unwrap();
    assert!(text.contains("egg (pcs) - 3"));
    assert!(!text.contains("flour"));
}

#[tokio::test]
async fn shared_recipe_is_summed_once_per_cart() {
    let app = TestApp::spawn_with_text_shopping_list().await;
    let (_, alice) = app.create_user("alice").await;
    let (_, bob) = app.create_user("bob").await;
    let flour = app.ingredient_id("flour", "g").await;
    let sugar = app.ingredient_id("sugar", "g").await;
    let bread = app.create_recipe(&alice, "Bread", &[(flour, 100)], &[]).await;
    let cake = app
        .create_recipe(&bob, "Cake", &[(sugar, 30), (flour, 40)], &[])
        .await;
    for token in [&alice, &bob] {
        app.post_with_token(&routes::shopping_cart(bread), &json!({}), token).await;
        app.post_with_token(&routes::shopping_cart(cake), &json!({}), token).await;
    }

    let res = app.get_raw(routes::DOWNLOAD_SHOPPING_CART, Some(&bob)).await;

    let text = String::from_utf8(res.bytes).unwrap();
    let lines: Vec<&str> = text.lines().skip(2).collect();
    assert_eq!(lines, ["flour (g) - 140", "sugar (g) - 30"]);
}

#[tokio::test]
async fn empty_cart_still_downloads() {
    let app = TestApp::spawn_with_text_shopping_list().await;
    let (_, alice) = app.create_user("alice").await;

    let res = app.get_raw(routes::DOWNLOAD_SHOPPING_CART, Some(&alice)).await;

    assert_eq!(res.status, 200);
    let text = String::from_utf8(res.bytes).unwrap();
    assert_eq!(text.lines().filter(|l| !l.is_empty()).count(), 1);
}

#[tokio::test]
async fn pdf_is_the_default_format() {
    let app = TestApp::spawn().await;
    let (_, alice) = app.create_user("alice").await;
    let flour = app.ingredient_id("flour", "g").await;
    let bread = app.create_recipe(&alice, "Bread", &[(flour, 100)], &[]).await;
    app.post_with_token(&routes::shopping_cart(bread), &json!({}), &alice).await;

    let res = app.get_raw(routes::DOWNLOAD_SHOPPING_CART, Some(&alice)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.content_type, "application/pdf");
    assert_eq!(
        res.content_disposition,
        "attachment; filename=\"shopping_list.pdf\""
    );
    assert!(res.bytes.starts_with(b"%PDF-"));
    assert!(res.bytes.len() > 1024, "font should be embedded");
}

#[tokio::test]
async fn anonymous_download_is_unauthorized() {
    let app = TestApp::spawn().await;

    let res = app.get_raw(routes::DOWNLOAD_SHOPPING_CART, None).await;

    assert_eq!(res.status, 401);
}
