//! Integration tests for QueryService with the sample player records

use chrono::NaiveDate;
use filterbox::config::Config;
use filterbox::core::{Combinator, ParameterTree, RowId};
use filterbox::services::{QueryService, Record};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;

fn players() -> QueryService {
    let cfg = Config::embedded().unwrap();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("sample-data/players.json");
    QueryService::from_json_file(cfg.model("player").unwrap(), &path)
        .unwrap()
        .with_columns(cfg.list_columns("player"))
        .with_today(NaiveDate::from_ymd_opt(2015, 10, 8).unwrap())
}

fn names(query: &str) -> Vec<String> {
    players().refresh_query(query).column_values("name")
}

fn string_service() -> QueryService {
    let cfg = Config::embedded().unwrap();
    let records: Vec<Record> = ["aaa", "aab", "bbb"]
        .iter()
        .map(|name| json!({ "name": name }).as_object().cloned().unwrap())
        .collect();
    QueryService::new(cfg.model("player").unwrap(), records)
}

#[test]
fn combinators_fold_rows_of_one_field() {
    let service = string_service();
    let or = "f[name][1][o]=like&f[name][1][v]=aa&f[name][2][o]=like&f[name][2][v]=ab&f[name][2][s]=or";
    let and = "f[name][1][o]=like&f[name][1][v]=aa&f[name][2][o]=like&f[name][2][v]=ab&f[name][2][s]=and";

    assert_eq!(service.refresh_query(or).column_values("name"), vec!["aaa", "aab"]);

    let page = service.refresh_query(and);
    assert_eq!(page.column_values("name"), vec!["aab"]);
    // The refreshed box shows the submitted combinator again
    let row = page.filter_box.row(&RowId::new("name", 2)).unwrap();
    assert_eq!(row.combinator, Some(Combinator::And));
    assert!(page.render().contains("<option value=\"and\" selected>and</option>"));
}

#[test]
fn filters_strings_and_associations() {
    assert_eq!(names("f[name][1][o]=starts_with&f[name][1][v]=aaron"), vec!["Aaron Judge"]);
    assert_eq!(names("f[name][1][o]=ends_with&f[name][1][v]=aaron"), vec!["Hank Aaron"]);
    assert_eq!(
        names("f[team][1][o]=is&f[team][1][v]=yankees"),
        vec!["Babe Ruth", "Aaron Judge"]
    );
    assert_eq!(names("f[team][1][o]=_blank"), vec!["Freddie Freeman"]);
    assert_eq!(
        names("f[notes][1][o]=_present&f[position][2][o]=not_like&f[position][2][v]=fielder"),
        vec!["Shohei Ohtani"]
    );
}

#[test]
fn filters_numbers_booleans_and_dates() {
    assert_eq!(
        names("f[number][1][o]=between&f[number][1][v][]=&f[number][1][v][]=40&f[number][1][v][]=60"),
        vec!["Hank Aaron", "Mookie Betts"]
    );
    assert_eq!(names("f[number][1][v][]=3&f[number][1][v][]=&f[number][1][v][]="), vec!["Babe Ruth"]);
    assert_eq!(names("f[retired][1][v]=true"), vec!["Hank Aaron", "Babe Ruth"]);
    assert_eq!(
        names("f[born_on][1][o]=between&f[born_on][1][v][]=&f[born_on][1][v][]=1990-01-01T00:00:00&f[born_on][1][v][]="),
        vec!["Mookie Betts", "Aaron Judge", "Shohei Ohtani"]
    );
    assert_eq!(names("f[born_on][1][v][]=1992-10-07T00:00:00"), vec!["Mookie Betts"]);
}

#[test]
fn relative_dates_use_the_reference_day() {
    let service = QueryService::new(
        Config::embedded().unwrap().model("player").unwrap(),
        ["2015-10-08", "2015-10-07", "2015-10-05", "2015-09-30"]
            .iter()
            .map(|d| json!({ "name": d, "born_on": d }).as_object().cloned().unwrap())
            .collect(),
    )
    .with_today(NaiveDate::from_ymd_opt(2015, 10, 8).unwrap());
    let run = |op: &str| service.refresh_query(&format!("f[born_on][1][o]={op}")).column_values("name");
    assert_eq!(run("today"), vec!["2015-10-08"]);
    assert_eq!(run("yesterday"), vec!["2015-10-07"]);
    assert_eq!(run("this_week"), vec!["2015-10-08", "2015-10-07", "2015-10-05"]);
    assert_eq!(run("last_week"), vec!["2015-09-30"]);
}

#[test]
fn ignores_what_it_cannot_use() {
    let all = players().records().len();
    assert_eq!(names("f[salary][1][v]=10").len(), all);
    assert_eq!(names("f[name][1][o]=like&f[name][1][v]=").len(), all);
    assert_eq!(names("f[born_on][1][v][]=someday&f[born_on][1][v][]=&f[born_on][1][v][]=").len(), all);
    assert_eq!(names("page=2&sort=name").len(), all);
}

#[test]
fn refreshed_page_restores_every_row() {
    let query = "f[name][3][o]=like&f[name][3][v]=e&f[name][7][o]=not_like&f[name][7][v]=judge&f[name][7][s]=and\
                 &f[born_on][1][o]=between&f[born_on][1][v][]=&f[born_on][1][v][]=1990-01-01T00:00:00&f[born_on][1][v][]=";
    let page = players().refresh_query(query);
    assert_eq!(page.filter_box.len(), 3);
    assert_eq!(page.column_values("name"), vec!["Mookie Betts", "Shohei Ohtani"]);

    let html = page.render();
    assert!(html.contains("name=\"f[name][7][s]\""));
    assert!(html.contains("value=\"1990-01-01T00:00:00\""));
    assert!(html.contains("<th class=\"team_field\">team</th>"));
    assert!(html.contains("<td class=\"team_field\">Dodgers</td>"));

    // Resubmitting the rebuilt box gives the same parameters back
    let resubmitted = ParameterTree::from_query(&page.filter_box.build_query_params().to_query());
    assert_eq!(resubmitted, ParameterTree::from_query(query));
}

#[test]
fn boolean_presence_filters_survive_a_refresh() {
    let records: Vec<Record> = [json!({ "name": "a", "retired": true }), json!({ "name": "b", "retired": null })]
        .iter()
        .map(|r| r.as_object().cloned().unwrap())
        .collect();
    let service = QueryService::new(Config::embedded().unwrap().model("player").unwrap(), records);

    let first = service.refresh_query("f[retired][1][o]=_blank");
    assert_eq!(first.column_values("name"), vec!["b"]);
    let echoed = first.filter_box.build_query_params();
    assert_eq!(echoed.row("retired", "1").unwrap().o.as_deref(), Some("_blank"));

    let second = service.refresh(&ParameterTree::from_query(&echoed.to_query()));
    assert_eq!(second.column_values("name"), vec!["b"]);

    // The boolean dropdown submits presence checks as its value
    assert_eq!(service.refresh_query("f[retired][1][v]=_present").column_values("name"), vec!["a"]);
}
