use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Days, NaiveDate};
use configuration::Config;
use std::fmt::Write as _;
use std::sync::Arc;
use web_server::handlers::{self, DateRange};
use web_server::AppState;

/// Writes `n` days of exports into `dir` and returns a config pointing at them.
fn config_with_exports(dir: &std::path::Path, n: usize) -> Config {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    let mut prices = String::from("Date,Gold_Price,Silver_Price,Gold_Returns,Silver_Returns\n");
    let mut macros = String::from("Date,India_CPI,DXY,US10Y_Yield,GoogleTrends_Gold\n");
    for i in 0..n {
        let t = i as f64;
        let date = (start + Days::new(i as u64)).format("%d/%m/%Y");
        writeln!(
            prices,
            "{date},{:.3},{:.3},{:.5},{:.5}",
            1700.0 + t,
            24.0 + (0.1 * t).sin(),
            0.2 * (0.31 * t).sin(),
            0.4 * (0.17 * t).cos()
        )
        .unwrap();
        writeln!(
            macros,
            "{date},{:.4},{:.4},{:.4},{:.2}",
            5.0 + 0.01 * t + (0.05 * t).sin(),
            95.0 + (0.11 * t).cos(),
            3.0 + (0.23 * t).sin(),
            40.0 + 5.0 * (0.37 * t).sin()
        )
        .unwrap();
    }

    let price_path = dir.join("prices.csv");
    let macro_path = dir.join("macro.csv");
    std::fs::write(&price_path, prices).unwrap();
    std::fs::write(&macro_path, macros).unwrap();

    let mut config = Config::default();
    config.data.prices_path = Some(price_path);
    config.data.macro_path = Some(macro_path);
    config
}

#[tokio::test]
async fn endpoints_return_404_before_any_load() {
    let state = Arc::new(AppState::new(Config::default()));

    let health = handlers::health(State(Arc::clone(&state))).await;
    assert!(!health.0.loaded);

    let err = handlers::get_summary(State(Arc::clone(&state))).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

    let err = handlers::get_correlations(State(state)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reload_without_configured_paths_is_a_bad_request() {
    let state = Arc::new(AppState::new(Config::default()));

    let err = handlers::reload(State(state)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reload_then_query() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(config_with_exports(dir.path(), 200)));

    let summary = handlers::reload(State(Arc::clone(&state))).await.unwrap().0;
    assert_eq!(summary.summary.rows, 200);
    assert_eq!(summary.summary.regression_points, 20);
    assert_eq!(summary.joined_rows, 200);

    let series = handlers::get_series(State(Arc::clone(&state)), Query(DateRange::default()))
        .await
        .unwrap()
        .0;
    assert_eq!(series.len(), 200);

    let range = DateRange {
        from: NaiveDate::from_ymd_opt(2021, 3, 10),
        to: NaiveDate::from_ymd_opt(2021, 3, 19),
    };
    let window = handlers::get_series(State(Arc::clone(&state)), Query(range)).await.unwrap().0;
    assert_eq!(window.len(), 10);

    let betas = handlers::get_betas(State(Arc::clone(&state)), Query(DateRange::default()))
        .await
        .unwrap()
        .0;
    assert_eq!(betas.len(), 20);

    let dxy = handlers::get_beta_series(
        Path("dxy_beta".to_string()),
        State(Arc::clone(&state)),
        Query(DateRange::default()),
    )
    .await
    .unwrap()
    .0;
    assert_eq!(dxy.len(), 20);
    assert_eq!(dxy[0].value, betas[0].dxy_beta);

    let correlations = handlers::get_correlations(State(Arc::clone(&state))).await.unwrap().0;
    assert_eq!(correlations.labels.len(), 6);

    let health = handlers::health(State(state)).await.0;
    assert!(health.loaded);
    assert_eq!(health.cache.misses, 1);
}

#[tokio::test]
async fn repeated_reload_hits_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(config_with_exports(dir.path(), 50)));

    handlers::reload(State(Arc::clone(&state))).await.unwrap();
    let first = state.current().unwrap();
    handlers::reload(State(Arc::clone(&state))).await.unwrap();
    let second = state.current().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    let stats = state.cache_stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[tokio::test]
async fn unknown_coefficient_and_inverted_range_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(config_with_exports(dir.path(), 30)));
    handlers::reload(State(Arc::clone(&state))).await.unwrap();

    let err = handlers::get_beta_series(
        Path("gold_beta".to_string()),
        State(Arc::clone(&state)),
        Query(DateRange::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

    let inverted = DateRange {
        from: NaiveDate::from_ymd_opt(2021, 4, 1),
        to: NaiveDate::from_ymd_opt(2021, 3, 1),
    };
    let err = handlers::get_series(State(state), Query(inverted)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}
