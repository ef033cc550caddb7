mod common;

use anyhow::Result;
use chrono::Utc;
use nutrical_api::goals::compute_default_goals;
use nutrical_api::testing::test_token;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn first_get_seeds_from_biometrics_and_is_stable() -> Result<()> {
    let user = common::male_with_profile();
    let expected = compute_default_goals(&user, Utc::now().date_naive());
    let server = common::TestServer::spawn(vec![user.clone()]).await?;
    let client = reqwest::Client::new();
    let token = test_token(user.id);

    let first: Value = client
        .get(server.url("/users/dietary-settings"))
        .bearer_auth(&token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let data = &first["data"];
    assert_eq!(data["userId"], user.id.to_string());
    assert_eq!(data["waterGoal"], 2000);
    assert_eq!(data["calorieGoal"], expected.calorie_goal.to_string());
    assert_eq!(data["carbsGoal"], expected.carbs_goal.to_string());

    let second: Value = client
        .get(server.url("/users/dietary-settings"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(second["data"], first["data"]);
    assert_eq!(server.store.len(), 1);
    Ok(())
}

#[tokio::test]
async fn patch_updates_only_given_fields() -> Result<()> {
    let user = common::female_without_profile();
    let server = common::TestServer::spawn(vec![user.clone()]).await?;
    let client = reqwest::Client::new();
    let token = test_token(user.id);

    let res = client
        .patch(server.url("/users/dietary-settings"))
        .bearer_auth(&token)
        .json(&json!({ "waterGoal": 2750, "proteinGoal": 410.5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    let rows = body["data"].as_array().expect("array of rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["waterGoal"], 2750);
    assert_eq!(rows[0]["proteinGoal"], "410.5");
    // Untouched columns keep their defaults
    assert_eq!(rows[0]["calorieGoal"], "2000");

    let after: Value = client
        .get(server.url("/users/dietary-settings"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(after["data"], rows[0]);
    Ok(())
}

#[tokio::test]
async fn fallback_goals_for_incomplete_profile() -> Result<()> {
    let user = common::female_without_profile();
    let server = common::TestServer::spawn(vec![user.clone()]).await?;

    let body: Value = reqwest::Client::new()
        .get(server.url("/users/dietary-settings"))
        .bearer_auth(test_token(user.id))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["data"]["calorieGoal"], "1600");
    assert_eq!(body["data"]["fatGoal"], "320");
    assert_eq!(body["data"]["proteinGoal"], "320");
    assert_eq!(body["data"]["carbsGoal"], "960");
    Ok(())
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() -> Result<()> {
    let user = common::male_with_profile();
    let server = common::TestServer::spawn(vec![user]).await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/users/dietary-settings")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["message"], "Unauthorized");

    let res = client
        .patch(server.url("/users/dietary-settings"))
        .bearer_auth("not-a-jwt")
        .json(&json!({ "waterGoal": 1000 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(server.store.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_field_is_rejected() -> Result<()> {
    let user = common::male_with_profile();
    let server = common::TestServer::spawn(vec![user.clone()]).await?;

    let res = reqwest::Client::new()
        .patch(server.url("/users/dietary-settings"))
        .bearer_auth(test_token(user.id))
        .json(&json!({ "sugarGoal": 50 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(server.store.writes(), 0);
    Ok(())
}
