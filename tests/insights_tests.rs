//! getActivityInsights: lookup by name, report comparison and the
//! in-payload failure convention.

mod common;

use serde_json::{json, Value};

use common::{dispatcher_with, payload, test_config, FakeTransport};

fn activities() -> Value {
    json!({
        "activities": [
            { "id": 101, "name": "Homepage Hero Test", "type": "ab", "state": "approved", "priority": 5 },
            { "id": 102, "name": "Checkout Banner", "type": "xt", "state": "saved" },
            { "id": 103, "name": "Checkout Button", "type": "ab", "state": "saved" },
            { "id": 104, "name": "Recs Widget", "type": "recommendations", "state": "approved" },
        ]
    })
}

fn counters(visitors: u64, conversions: u64) -> Value {
    json!({
        "visitor": { "totals": { "entries": visitors, "conversions": conversions } },
        "visit": { "totals": { "entries": visitors + 10 } },
        "impression": { "totals": { "entries": visitors * 2 } },
        "landing": { "totals": { "entries": visitors } },
    })
}

fn report() -> Value {
    json!({
        "reportParameters": { "reportInterval": "2024-01-01T00:00Z/2024-02-01T00:00Z" },
        "activity": {
            "experiences": [
                { "name": "Control", "experienceLocalId": 0 },
                { "experienceLocalId": 1 },
            ]
        },
        "report": {
            "statistics": {
                "totals": counters(1200, 90),
                "experiences": [
                    { "totals": counters(600, 30) },
                    { "totals": counters(600, 60) },
                ],
            }
        }
    })
}

#[tokio::test]
async fn compares_experiences_of_a_single_match() {
    let transport = FakeTransport::new();
    transport.respond_json(200, activities());
    transport.respond_json(200, report());
    let dispatcher = dispatcher_with(test_config(), transport.clone());

    let value = payload(
        &dispatcher
            .call_tool("getActivityInsights", Some(json!({"activityName": "hero"})))
            .await,
    );

    assert_eq!(value["success"], true);
    assert_eq!(value["activity"]["id"], 101);
    assert_eq!(value["activity"]["typeDisplay"], "A/B Test");
    assert_eq!(value["summary"]["totalVisitors"], 1200);

    let comparisons = value["experienceComparisons"].as_array().unwrap();
    assert_eq!(comparisons[0]["isControl"], true);
    assert_eq!(comparisons[0]["metrics"]["conversionRate"], "5.00%");
    assert_eq!(comparisons[1]["experienceName"], "Experience B");
    assert_eq!(comparisons[1]["performance"], json!({"lift": "100.00%", "isWinning": true}));

    let insights: Vec<&str> = value["insights"].as_array().unwrap().iter().filter_map(Value::as_str).collect();
    assert!(insights.iter().any(|i| i.contains("Winner: Experience B")));

    assert_eq!(transport.request(0).header("Accept"), Some("application/vnd.adobe.target.v3+json"));
    assert!(transport.request(1).url.ends_with("/target/activities/ab/101/report/performance"));
    assert_eq!(transport.request(1).header("Accept"), Some("application/vnd.adobe.target.v1+json"));
}

#[tokio::test]
async fn several_matches_are_listed_without_fetching_a_report() {
    let transport = FakeTransport::new();
    transport.respond_json(200, activities());
    let dispatcher = dispatcher_with(test_config(), transport.clone());

    let value = payload(
        &dispatcher
            .call_tool("getActivityInsights", Some(json!({"activityName": "CHECKOUT"})))
            .await,
    );

    assert_eq!(value["success"], false);
    assert_eq!(value["matchingActivities"].as_array().unwrap().len(), 2);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn no_match_carries_a_suggestion() {
    let transport = FakeTransport::new();
    transport.respond_json(200, activities());
    let dispatcher = dispatcher_with(test_config(), transport);

    let value = payload(
        &dispatcher
            .call_tool("getActivityInsights", Some(json!({"activityName": "pricing"})))
            .await,
    );

    assert_eq!(value["success"], false);
    assert!(value["suggestion"].is_string());
}

#[tokio::test]
async fn unsupported_type_lists_supported_ones() {
    let transport = FakeTransport::new();
    transport.respond_json(200, activities());
    let dispatcher = dispatcher_with(test_config(), transport);

    let value = payload(
        &dispatcher
            .call_tool("getActivityInsights", Some(json!({"activityName": "recs"})))
            .await,
    );

    assert_eq!(value["success"], false);
    assert_eq!(value["supportedTypes"], json!(["ab", "xt", "abt"]));
}

#[tokio::test]
async fn qa_link_failure_is_ignored() {
    let transport = FakeTransport::new();
    transport.respond_json(200, activities());
    transport.respond_json(200, report());
    transport.respond(500, "boom");
    let dispatcher = dispatcher_with(test_config(), transport.clone());

    let value = payload(
        &dispatcher
            .call_tool(
                "getActivityInsights",
                Some(json!({"activityName": "hero", "qaUrl": "https://www.example.com"})),
            )
            .await,
    );

    assert_eq!(value["success"], true);
    let qa = transport.request(2);
    assert!(qa.url.ends_with("/target/activities/ab/101/qamode"));
    assert_eq!(transport.body_json(2)["currentActivityOnly"], false);
}

#[tokio::test]
async fn qa_links_attach_by_experience_id() {
    let transport = FakeTransport::new();
    transport.respond_json(200, activities());
    transport.respond_json(200, report());
    transport.respond_json(
        200,
        json!({"qaModeExperiences": [{"experienceLocalId": 1, "url": "https://www.example.com/?at_preview=1"}]}),
    );
    let dispatcher = dispatcher_with(test_config(), transport);

    let value = payload(
        &dispatcher
            .call_tool(
                "getActivityInsights",
                Some(json!({"activityName": "hero", "qaUrl": "https://www.example.com"})),
            )
            .await,
    );

    let comparisons = value["experienceComparisons"].as_array().unwrap();
    assert!(comparisons[0].get("qaUrl").is_none());
    assert_eq!(comparisons[1]["qaUrl"], "https://www.example.com/?at_preview=1");
}

#[tokio::test]
async fn gateway_failure_is_returned_in_the_payload() {
    let transport = FakeTransport::new();
    transport.respond(401, r#"{"error":"expired"}"#);
    let dispatcher = dispatcher_with(test_config(), transport);

    let result = dispatcher
        .call_tool("getActivityInsights", Some(json!({"activityName": "hero"})))
        .await;

    let value = payload(&result);
    assert_eq!(value["success"], false);
    assert!(value["error"].as_str().unwrap().starts_with("API Error (401)"));
}

#[tokio::test]
async fn empty_account_reports_no_activities() {
    let transport = FakeTransport::new();
    transport.respond_json(200, json!({"activities": []}));
    let dispatcher = dispatcher_with(test_config(), transport);

    let value = payload(
        &dispatcher
            .call_tool("getActivityInsights", Some(json!({"activityName": "hero"})))
            .await,
    );

    assert_eq!(value["error"], "No activities found in your Target account.");
}

#[tokio::test]
async fn null_names_in_the_listing_are_skipped() {
    let transport = FakeTransport::new();
    transport.respond_json(
        200,
        json!({
            "activities": [
                { "id": 99, "name": null, "type": null, "state": "saved" },
                { "id": 101, "name": "Homepage Hero Test", "type": "ab", "state": "approved" },
            ]
        }),
    );
    transport.respond_json(200, report());
    let dispatcher = dispatcher_with(test_config(), transport.clone());

    let value = payload(
        &dispatcher
            .call_tool("getActivityInsights", Some(json!({"activityName": "hero"})))
            .await,
    );

    assert_eq!(value["success"], true);
    assert_eq!(value["activity"]["id"], 101);
    assert_eq!(transport.requests().len(), 2);
}
