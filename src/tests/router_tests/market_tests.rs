// src/tests/router_tests/market_tests.rs

use crate::config::Environment;
use crate::db::test_support::{seed_property, PropertySeed};
use crate::router::respond;
use crate::tests::utils::{body_json, get, test_state};

#[test]
fn market_stats_with_visualizations() {
    let (_dir, state) = test_state(Environment::Development);
    for (label, price) in [("condo", 100_000.0), ("condo", 200_000.0), ("townhouse", 300_000.0)] {
        seed_property(
            &state.db,
            PropertySeed {
                zip: 2114,
                price: Some(price),
                property_type: Some(label),
                building_style: Some("Colonial"),
                ..PropertySeed::default()
            },
        );
    }

    let resp = respond(get("/api/market/02114"), &state);
    assert_eq!(resp.status(), 200);
    let body = body_json(resp);

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["zipCode"], "02114");
    assert_eq!(
        body["data"]["propertyTypes"],
        serde_json::json!([
            { "type": "condo", "count": 2, "avgPrice": 150000 },
            { "type": "townhouse", "count": 1, "avgPrice": 300000 }
        ])
    );
    assert_eq!(body["data"]["overview"]["totalProperties"], 3);
    assert_eq!(body["data"]["overview"]["totalSales"], 3);
    assert_eq!(body["data"]["overview"]["avgPrice"], 200000);

    let viz = &body["visualizations"];
    assert_eq!(viz["propertyTypes"]["type"], "pie");
    assert_eq!(
        viz["propertyTypes"]["data"][0],
        serde_json::json!({ "label": "condo", "value": 2, "avgPrice": 150000 })
    );
    assert_eq!(viz["buildingStyles"]["type"], "bar");
    assert_eq!(viz["buildingStyles"]["data"][0]["value"], 3);
    assert_eq!(viz["priceDistribution"]["data"]["totalProperties"], 3);
    assert_eq!(
        viz["priceDistribution"]["data"]["averagePrice"],
        body["data"]["overview"]["avgPrice"]
    );
}

#[test]
fn market_for_unknown_zip_is_zero_filled() {
    let (_dir, state) = test_state(Environment::Development);

    let body = body_json(respond(get("/api/market/99950"), &state));
    assert_eq!(
        body["data"]["overview"],
        serde_json::json!({
            "totalProperties": 0,
            "avgPrice": 0,
            "avgPricePerSqFt": 0,
            "totalSales": 0
        })
    );
    assert_eq!(body["data"]["propertyTypes"], serde_json::json!([]));
    assert_eq!(body["data"]["buildingStyles"], serde_json::json!([]));
}

#[test]
fn market_rejects_invalid_zip() {
    let (_dir, state) = test_state(Environment::Development);

    for uri in ["/api/market/2114", "/api/market/021145", "/api/market/abcde"] {
        let resp = respond(get(uri), &state);
        assert_eq!(resp.status(), 400, "{uri}");
        assert_eq!(body_json(resp)["error"], "Valid 5-digit ZIP code is required");
    }
}

#[test]
fn metrics_route_returns_row_or_not_found() {
    let (_dir, state) = test_state(Environment::Development);
    state
        .db
        .with_conn(|conn| {
            conn.execute(
                "INSERT INTO zip_code_data (regionid_x, region, avg_sale_to_list) VALUES (1, 2116, 0.98)",
                [],
            )?;
            Ok(())
        })
        .unwrap();

    let body = body_json(respond(get("/api/market/02116/metrics"), &state));
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["zipCode"], "02116");
    assert_eq!(body["data"]["metrics"]["avgSaleToList"], 0.98);

    let resp = respond(get("/api/market/02114/metrics"), &state);
    assert_eq!(resp.status(), 404);
}

#[test]
fn storage_failure_is_generic_in_production() {
    let (_dir, state) = test_state(Environment::Production);
    state
        .db
        .with_conn(|conn| {
            conn.execute_batch("DROP TABLE property_data")?;
            Ok(())
        })
        .unwrap();

    let resp = respond(get("/api/market/02116"), &state);
    assert_eq!(resp.status(), 500);
    let body = body_json(resp);
    assert_eq!(body["error"], "Internal server error");
    assert!(body.get("message").is_none());
    assert_eq!(state.db.connections_in_use(), 0);
}

#[test]
fn storage_failure_carries_detail_in_development() {
    let (_dir, state) = test_state(Environment::Development);
    state
        .db
        .with_conn(|conn| {
            conn.execute_batch("DROP TABLE property_data")?;
            Ok(())
        })
        .unwrap();

    let body = body_json(respond(get("/api/properties/search?zipCode=02116"), &state));
    assert_eq!(body["error"], "Internal server error");
    assert!(body["message"].as_str().unwrap().contains("property_data"));
}
