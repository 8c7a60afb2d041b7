use super::*;

fn view(status: &str) -> TrackingView {
    TrackingView {
        order_id: "ord-1".into(),
        tracking: true,
        status_label: status.into(),
        status_color: "#2196F3",
        distance_left: Some("850m".into()),
        eta: Some("3 min".into()),
        last_update_utc: Some("16:26:40".into()),
        markers: Vec::new(),
        route: Vec::new(),
        agent: None,
        restaurant_name: None,
        banner: None,
        show_recenter: false,
        external_maps_url: None,
    }
}

#[test]
fn parses_order_and_overrides() {
    let cli = Cli::try_parse_from([
        "track",
        "ord-1",
        "--api-base-url",
        "http://localhost:8080/",
        "--config-path",
        "cfg/live",
        "--replay",
        "trip.jsonl",
        "--replay-cadence-secs",
        "1",
    ])
    .unwrap();
    assert_eq!(cli.order_id, "ord-1");
    assert_eq!(cli.replay, Some(PathBuf::from("trip.jsonl")));
    assert_eq!(cli.replay_cadence_secs, 1);

    let mut config = TrackerConfig::default();
    cli.apply_overrides(&mut config);
    assert_eq!(config.api_base_url, "http://localhost:8080");
    assert_eq!(config.config_path, "/cfg/live");
    assert_eq!(config.routing_base_url, TrackerConfig::default().routing_base_url);
}

#[test]
fn order_id_is_required() {
    assert!(Cli::try_parse_from(["track"]).is_err());
}

#[test]
fn status_line_shows_distance_and_eta() {
    assert_eq!(status_line(&view("Delivering")), "[16:26:40 UTC] Delivering | 850m away | ETA 3 min");
}

#[test]
fn status_line_prefers_banner() {
    let mut v = view("Delivering");
    v.tracking = false;
    v.distance_left = None;
    v.eta = None;
    v.last_update_utc = None;
    v.banner = Some("Unable to track delivery. Please check your connection.".into());
    assert_eq!(status_line(&v), "Delivering | Unable to track delivery. Please check your connection.");
}

#[test]
fn status_line_while_loading() {
    let mut v = view("Loading...");
    v.tracking = false;
    v.distance_left = None;
    v.eta = None;
    v.last_update_utc = None;
    assert_eq!(status_line(&v), "Loading... | Loading tracking data...");
}
