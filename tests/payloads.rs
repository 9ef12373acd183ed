use dashcharts::normalize::payload_rows;
use dashcharts::{Endpoint, RawPayload};
use serde_json::json;

#[test]
fn brand_listing_bare_or_wrapped() {
    let bare = Endpoint::TopCoffeeBrands
        .parse(json!([{"brand": "Starbucks", "popularity": 40}]));
    let wrapped = Endpoint::PopularSnackBrands
        .parse(json!({"data": [{"name": "Pocky", "share": 12}]}));

    let RawPayload::Brands(b) = &bare else {
        panic!("expected brands, got {bare:?}");
    };
    assert_eq!(b[0].display_name(), "Starbucks");
    let rows = payload_rows(&wrapped);
    assert_eq!(rows[0]["name"], json!("Pocky"));
    assert_eq!(rows[0]["value"].as_f64(), Some(12.0));
}

#[test]
fn weekly_rows_keep_field_order() {
    let p = Endpoint::WeeklyMoodTrend
        .parse(json!({"data": [{"week": "2024-W01", "happy": 3, "tired": 2, "stressed": 1}]}));
    let rows = payload_rows(&p);
    let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(keys, ["week", "happy", "tired", "stressed"]);
}

#[test]
fn team_and_department_payloads() {
    let teams = Endpoint::CoffeeConsumption
        .parse(json!({"teams": [{"team": "Frontend", "series": [{"cups": 1, "bugs": 2, "productivity": 50}]}]}));
    assert!(matches!(teams, RawPayload::Teams(_)));
    assert_eq!(payload_rows(&teams).len(), 1);

    let depts = Endpoint::SnackImpact
        .parse(json!({"departments": [{"name": "HR", "metrics": [{"snacks": 1, "meetingsMissed": 0, "morale": 80}]}]}));
    assert!(matches!(depts, RawPayload::Departments(_)));
    assert_eq!(payload_rows(&depts)[0]["team"], json!("HR"));
}

#[test]
fn missing_top_level_arrays_are_empty_not_errors() {
    let teams = Endpoint::CoffeeConsumption.parse(json!({}));
    assert!(payload_rows(&teams).is_empty());
    let depts = Endpoint::SnackImpact.parse(json!({"departments": []}));
    assert!(payload_rows(&depts).is_empty());
}

#[test]
fn wrong_shapes_decode_to_empty_payloads() {
    assert!(payload_rows(&Endpoint::WeeklyWorkoutTrend.parse(json!("nope"))).is_empty());
    assert!(payload_rows(&Endpoint::TopCoffeeBrands.parse(json!(42))).is_empty());
    assert!(payload_rows(&Endpoint::TopCoffeeBrands.parse(json!(null))).is_empty());
    assert!(payload_rows(&Endpoint::CoffeeConsumption.parse(json!([1, 2]))).is_empty());
}

#[test]
fn null_top_level_arrays_are_empty() {
    let teams = Endpoint::CoffeeConsumption.parse(json!({"teams": null}));
    assert!(payload_rows(&teams).is_empty());
    let depts = Endpoint::SnackImpact.parse(json!({"departments": null}));
    assert!(payload_rows(&depts).is_empty());
    let brands = Endpoint::PopularSnackBrands.parse(json!({"data": null}));
    assert!(payload_rows(&brands).is_empty());
}

#[test]
fn numeric_strings_are_read_as_numbers() {
    let brands = Endpoint::TopCoffeeBrands
        .parse(json!([{"brand": "Starbucks", "popularity": "42"}, {"brand": "Mega", "popularity": "lots"}]));
    let rows = payload_rows(&brands);
    assert_eq!(rows[0]["value"].as_f64(), Some(42.0));
    assert_eq!(rows[1]["value"].as_f64(), Some(0.0));

    let teams = Endpoint::CoffeeConsumption
        .parse(json!({"teams": [{"team": "A", "series": [{"cups": "3", "bugs": 1, "productivity": " 70 "}]}]}));
    let rows = payload_rows(&teams);
    assert_eq!(rows[0]["cupsPerDay"].as_f64(), Some(3.0));
    assert_eq!(rows[0]["productivity"].as_f64(), Some(70.0));
}

#[test]
fn non_array_series_skip_only_their_owner() {
    let teams = Endpoint::CoffeeConsumption.parse(json!({"teams": [
        {"team": "A", "series": {"cups": 1}},
        {"team": "B", "series": [{"cups": 1, "bugs": 2, "productivity": 3}]},
        "not a team"
    ]}));
    let rows = payload_rows(&teams);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["team"], json!("B"));

    let depts = Endpoint::SnackImpact.parse(json!({"departments": [
        {"name": "HR", "metrics": "n/a"},
        {"name": "Ops", "metrics": [null, {"snacks": 2, "meetingsMissed": 1, "morale": 60}]}
    ]}));
    let rows = payload_rows(&depts);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["team"], json!("Ops"));
}

#[test]
fn numeric_owner_names_become_text() {
    let teams = Endpoint::CoffeeConsumption
        .parse(json!({"teams": [{"team": 7, "series": [{"cups": 1, "bugs": 0, "productivity": 50}]}]}));
    assert_eq!(payload_rows(&teams)[0]["team"], json!("7"));

    let brands = Endpoint::TopCoffeeBrands.parse(json!([{"brand": 1984, "value": 5}]));
    assert_eq!(payload_rows(&brands)[0]["name"], json!("1984"));
}

#[test]
fn weekly_rows_drop_non_object_elements() {
    let p = Endpoint::WeeklyMoodTrend.parse(json!([
        {"week": "W1", "happy": 3},
        null,
        "W2",
        {"week": "W3", "happy": 1}
    ]));
    let rows = payload_rows(&p);
    let weeks: Vec<&str> = rows.iter().filter_map(|r| r["week"].as_str()).collect();
    assert_eq!(weeks, ["W1", "W3"]);
}

#[test]
fn endpoint_paths() {
    let paths: Vec<&str> = Endpoint::ALL.iter().map(|e| e.path()).collect();
    assert_eq!(
        paths,
        [
            "/mock/top-coffee-brands",
            "/mock/popular-snack-brands",
            "/mock/weekly-mood-trend",
            "/mock/weekly-workout-trend",
            "/mock/coffee-consumption",
            "/mock/snack-impact",
        ]
    );
}
