//! HTML fixtures and dataset builders.

use crate::extract::Dataset;

/// One table, header plus two rows.
pub const SIMPLE_TABLE: &str = "<table>\
    <tr><th>Name</th><th>Value</th></tr>\
    <tr><td>alpha</td><td>1</td></tr>\
    <tr><td>beta</td><td>2</td></tr>\
    </table>";

/// A full page with a leaderboard table, a stylesheet and a logo.
pub const LEADERBOARD_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Hiscores</title>
  <link rel="stylesheet" href="/css/site.css">
</head>
<body>
  <img src="img/logo.png" alt="logo">
  <table id="hiscores">
    <thead>
      <tr><th>Rank</th><th>Player</th><th>Level</th></tr>
    </thead>
    <tbody>
      <tr><td>1</td><td>Alice</td><td>99</td></tr>
      <tr><td>2</td><td>Bob</td><td>87</td></tr>
      <tr><td>3</td><td>Carol</td><td>85</td></tr>
    </tbody>
  </table>
</body>
</html>"#;

/// A page without any table.
pub const NO_TABLES_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Empty</title></head>
<body><p>Nothing to see here.</p><script src="/js/app.js"></script></body>
</html>"#;

/// Rows of uneven length under a three-column header.
pub const RAGGED_TABLE: &str = "<table>\
    <tr><th>a</th><th>b</th><th>c</th></tr>\
    <tr><td>1</td></tr>\
    <tr><td>1</td><td>2</td><td>3</td><td>4</td></tr>\
    <tr><td>x</td><td>y</td><td>z</td></tr>\
    </table>";

/// An outer table with another table inside one of its cells.
pub const NESTED_TABLES: &str = "<table>\
    <tr><th>Region</th><th>Servers</th></tr>\
    <tr><td>EU</td><td>\
      <table><tr><th>Name</th></tr><tr><td>eu-1</td></tr><tr><td>eu-2</td></tr></table>\
    </td></tr>\
    <tr><td>US</td><td>none</td></tr>\
    </table>";

/// Two tables with overlapping columns.
pub const MULTI_TABLE_PAGE: &str = "<html><body>\
    <table><tr><th>Rank</th><th>Player</th></tr><tr><td>1</td><td>Alice</td></tr></table>\
    <table><tr><th>Player</th><th>Level</th></tr><tr><td>Bob</td><td>40</td></tr></table>\
    </body></html>";

/// Builds a dataset from literal names and rows.
#[must_use]
pub fn dataset(column_names: &[&str], rows: &[&[&str]]) -> Dataset {
    let mut dataset = Dataset::new(column_names.iter().map(|s| (*s).to_string()).collect());
    for row in rows {
        dataset.push_row(row.iter().map(|s| (*s).to_string()).collect());
    }
    dataset
}
