mod common;

use common::*;
use nhl_common::{DataSource, GameId, NhlError};
use nhl_scraper::{EventSource, ScrapeError};
use serde_json::json;
use wiremock::MockServer;

const PBP_PATH: &str = "/v1/gamecenter/2023020204/play-by-play";
const SHIFTS_PATH: &str = "/stats/rest/en/shiftcharts";
const PL_PATH: &str = "/scores/htmlreports/20232024/PL020204.HTM";
const TH_PATH: &str = "/scores/htmlreports/20232024/TH020204.HTM";
const TV_PATH: &str = "/scores/htmlreports/20232024/TV020204.HTM";

fn game() -> GameId {
    GameId::parse("2023020204").unwrap()
}

async fn mount_game(server: &MockServer) {
    mount_raw_json(server, PBP_PATH, PBP_JSON).await;
    mount_raw_json(server, SHIFTS_PATH, SHIFTS_JSON).await;
    mount_html(server, PL_PATH, PL_HTML).await;
    mount_html(server, TH_PATH, TH_HTML).await;
    mount_html(server, TV_PATH, TV_HTML).await;
}

#[tokio::test]
async fn api_play_by_play_resolves_players_and_totals() {
    let server = MockServer::start().await;
    mount_game(&server).await;

    let pbp = scraper_for(&server)
        .scrape_game_play_by_play(game())
        .await
        .expect("play by play");
    assert_eq!(pbp.game.home_team.abbrev, "MTL");
    assert_eq!(pbp.game.away_team.name.as_deref(), Some("Toronto Maple Leafs"));
    assert_eq!(pbp.events.len(), 7);
    assert!(pbp.events.records.iter().all(|e| e.source == EventSource::Api));

    let faceoff = &pbp.events.records[1];
    assert_eq!(faceoff.event_type, "faceoff");
    assert_eq!(faceoff.player_name_1.as_deref(), Some("Nick Suzuki"));
    assert_eq!(faceoff.player_name_2.as_deref(), Some("Auston Matthews"));
    assert_eq!(faceoff.skater_state.as_deref(), Some("5v5"));

    let goal = pbp
        .events
        .records
        .iter()
        .find(|e| e.event_type == "goal")
        .unwrap();
    assert_eq!((goal.x_fixed, goal.y_fixed), (Some(80), Some(-10)));
    assert_eq!(goal.skater_state.as_deref(), Some("5v4"));

    let giveaway = &pbp.events.records[3];
    assert_eq!(giveaway.player_name_1.as_deref(), Some("Mike Matheson"));
    assert_eq!(giveaway.away_sog, Some(1));
    assert_eq!(giveaway.home_score, Some(0));

    let end = pbp.events.records.last().unwrap();
    assert_eq!(end.home_score, Some(1));
    assert_eq!(end.home_sog, Some(1));
}

#[tokio::test]
async fn merged_play_by_play_combines_both_feeds() {
    let server = MockServer::start().await;
    mount_game(&server).await;

    let pbp = scraper_for(&server).scrape_pbp(game()).await.expect("merged pbp");
    let events = &pbp.events.records;

    let timeline: Vec<(&str, EventSource)> = events
        .iter()
        .map(|e| (e.event_type.as_str(), e.source))
        .collect();
    assert_eq!(
        timeline,
        vec![
            ("period-start", EventSource::Both),
            ("faceoff", EventSource::Both),
            ("shot-on-goal", EventSource::Both),
            ("hit", EventSource::Report),
            ("giveaway", EventSource::Api),
            ("goal", EventSource::Both),
            ("period-end", EventSource::Both),
            ("game-end", EventSource::Both),
        ]
    );
    assert!(
        events
            .windows(2)
            .all(|w| (w[0].period, w[0].period_seconds) <= (w[1].period, w[1].period_seconds))
    );

    let shot = &events[2];
    assert_eq!(shot.event_id, Some(60));
    assert_eq!(shot.report_number, Some(4));
    assert_eq!(shot.period_seconds, 74);
    assert!(shot.description.as_deref().unwrap().starts_with("TOR ONGOAL"));
    assert_eq!(shot.away_on_ice.len(), 2);

    let hit = &events[3];
    assert_eq!(hit.event_team.as_deref(), Some("MTL"));
    assert_eq!(hit.event_team_type, Some("home"));
    assert_eq!(hit.time_in_period, "05:30");
    assert_eq!(hit.home_skaters, None);
    assert_eq!(hit.away_sog, Some(1));
    assert_eq!(hit.player_id_1, Some(8476875));
    assert_eq!(hit.player_name_2.as_deref(), Some("Auston Matthews"));

    let goal = &events[5];
    assert_eq!(goal.strength.as_deref(), Some("PP"));
    assert_eq!(goal.home_on_ice.len(), 3);
    assert_eq!(goal.home_skaters, Some(5));
    assert_eq!(goal.player_name_2.as_deref(), Some("Cole Caufield"));
}

#[tokio::test]
async fn merged_events_normalise_to_a_table() {
    let server = MockServer::start().await;
    mount_game(&server).await;

    let pbp = scraper_for(&server).scrape_pbp(game()).await.expect("merged pbp");
    let table = pbp.events.to_table().unwrap();
    assert_eq!(table.len(), 8);
    assert_eq!(table.get(3, "source"), Some(&json!("report")));
    assert_eq!(table.get(3, "event_id"), Some(&serde_json::Value::Null));
    assert_eq!(table.columns.last().map(String::as_str), Some("meta_source"));

    let csv = table.to_delimited(',');
    let header = csv.lines().next().unwrap();
    assert!(header.starts_with("game_id,event_id,report_number"));
    assert!(csv.contains("\"MTL #8 MATHESON HIT TOR #34 MATTHEWS, Def. Zone\""));
}

#[tokio::test]
async fn missing_report_falls_back_to_api_events() {
    let server = MockServer::start().await;
    mount_raw_json(&server, PBP_PATH, PBP_JSON).await;
    mount_status(&server, PL_PATH, 404).await;

    let pbp = scraper_for(&server).scrape_pbp(game()).await.expect("api-only pbp");
    assert_eq!(pbp.events.len(), 7);
    assert!(pbp.events.records.iter().all(|e| e.source == EventSource::Api));
}

#[tokio::test]
async fn missing_game_is_not_found() {
    let server = MockServer::start().await;
    mount_status(&server, PBP_PATH, 404).await;

    let err = scraper_for(&server).scrape_pbp(game()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn api_shifts_join_the_roster() {
    let server = MockServer::start().await;
    mount_game(&server).await;

    let shifts = scraper_for(&server)
        .scrape_game_shifts(game())
        .await
        .expect("shifts");
    assert_eq!(shifts.source, DataSource::NhlStatsApi);
    let rows: Vec<(&str, u8, &str)> = shifts
        .records
        .iter()
        .map(|s| (s.team_abbrev.as_deref().unwrap(), s.period, s.last_name.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("MTL", 1, "Matheson"),
            ("MTL", 1, "Suzuki"),
            ("MTL", 2, "Suzuki"),
            ("TOR", 1, "Matthews"),
        ]
    );
    let suzuki = &shifts.records[2];
    assert_eq!(suzuki.sweater_number, Some(14));
    assert_eq!(suzuki.position.as_deref(), Some("F"));
    assert_eq!(suzuki.is_home, Some(true));
    assert_eq!(suzuki.game_start_seconds, 1420);
    assert_eq!(suzuki.duration_seconds, 50);
    assert_eq!(shifts.records[3].is_home, Some(false));
}

#[tokio::test]
async fn empty_shift_charts_report_no_data() {
    let server = MockServer::start().await;
    mount_raw_json(&server, PBP_PATH, PBP_JSON).await;
    mount_json(&server, SHIFTS_PATH, json!({ "data": [], "total": 0 })).await;

    let err = scraper_for(&server)
        .scrape_game_shifts(game())
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Nhl(NhlError::NoData(_))));
}

#[tokio::test]
async fn time_on_ice_reads_both_reports() {
    let server = MockServer::start().await;
    mount_game(&server).await;

    let toi = scraper_for(&server).scrape_toi(game()).await.expect("toi");
    let order: Vec<(u8, Option<u32>)> = toi
        .shifts
        .records
        .iter()
        .map(|s| (s.period, s.sweater_number))
        .collect();
    assert_eq!(
        order,
        vec![(1, Some(8)), (1, Some(14)), (1, Some(34)), (2, Some(14)), (4, Some(34))]
    );
    let overtime = &toi.shifts.records[4];
    assert_eq!(overtime.is_home, Some(false));
    assert_eq!(overtime.game_start_seconds, 3600);
    assert_eq!(overtime.end_remaining_seconds, Some(255));
    assert_eq!(overtime.team_abbrev, None);
    assert_eq!(toi.shifts.records[3].event.as_deref(), Some("G"));

    assert_eq!(toi.summaries.len(), 5);
    let total = toi
        .summaries
        .records
        .iter()
        .find(|s| s.full_name == "NICK SUZUKI" && s.period.is_none())
        .unwrap();
    assert_eq!(total.toi_seconds, 96);
    assert!(total.is_home);
    assert_eq!(total.team_name.as_deref(), Some("MONTREAL CANADIENS"));
}

#[tokio::test]
async fn legacy_shifts_need_both_reports() {
    let server = MockServer::start().await;
    mount_html(&server, TH_PATH, TH_HTML).await;
    mount_status(&server, TV_PATH, 404).await;

    let err = scraper_for(&server)
        .scrape_game_shifts_legacy(game())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn game_rosters_are_sorted() {
    let server = MockServer::start().await;
    mount_raw_json(&server, PBP_PATH, PBP_JSON).await;

    let rosters = scraper_for(&server)
        .scrape_game_rosters(game())
        .await
        .expect("rosters");
    let order: Vec<(&str, &str, Option<u32>)> = rosters
        .records
        .iter()
        .map(|r| (r.team_abbrev.as_str(), r.position_code.as_str(), r.sweater_number))
        .collect();
    assert_eq!(
        order,
        vec![
            ("MTL", "C", Some(14)),
            ("MTL", "D", Some(8)),
            ("MTL", "G", Some(35)),
            ("MTL", "R", Some(22)),
            ("TOR", "C", Some(34)),
            ("TOR", "D", Some(44)),
            ("TOR", "G", Some(60)),
        ]
    );
    assert!(rosters.records[..4].iter().all(|r| r.is_home));
}

#[tokio::test]
async fn complete_game_uses_shift_charts() {
    let server = MockServer::start().await;
    mount_game(&server).await;

    let complete = scraper_for(&server)
        .scrape_game_complete(game())
        .await
        .expect("complete game");
    assert_eq!(complete.play_by_play.events.len(), 8);
    assert_eq!(complete.rosters.len(), 7);
    assert_eq!(complete.shifts.source, DataSource::NhlStatsApi);
    assert_eq!(complete.shifts.len(), 4);
}

#[tokio::test]
async fn complete_game_falls_back_to_report_shifts() {
    let server = MockServer::start().await;
    mount_raw_json(&server, PBP_PATH, PBP_JSON).await;
    mount_json(&server, SHIFTS_PATH, json!({ "data": [] })).await;
    mount_html(&server, PL_PATH, PL_HTML).await;
    mount_html(&server, TH_PATH, TH_HTML).await;
    mount_html(&server, TV_PATH, TV_HTML).await;

    let complete = scraper_for(&server)
        .scrape_game_complete(game())
        .await
        .expect("complete game");
    assert_eq!(complete.shifts.source, DataSource::NhlHtmlReports);
    assert_eq!(complete.shifts.len(), 5);
    let teams: Vec<Option<&str>> = complete
        .shifts
        .records
        .iter()
        .map(|s| s.team_abbrev.as_deref())
        .collect();
    assert_eq!(
        teams,
        vec![Some("MTL"), Some("MTL"), Some("TOR"), Some("MTL"), Some("TOR")]
    );
}

#[tokio::test]
async fn game_batch_keeps_going_past_failures() {
    let server = MockServer::start().await;
    mount_game(&server).await;
    mount_status(&server, "/v1/gamecenter/2023020205/play-by-play", 404).await;

    let games = vec![game(), GameId::parse("2023020205").unwrap()];
    let outcome = scraper_for(&server).scrape_games_pbp(games).await;

    assert_eq!(outcome.ok.len(), 1);
    assert_eq!(outcome.ok[0].0, game());
    assert_eq!(outcome.ok[0].1.events.len(), 8);
    assert_eq!(outcome.failed.len(), 1);
    assert!(outcome.failed[0].1.is_not_found());
}
